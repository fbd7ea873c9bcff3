use crate::handlers::failures::{RelayRejection, assistant_failure, relay_rejection};
use crate::schemas::AppState;
use axum::{extract::State, http::StatusCode, response::Json};
use axum_valid::Valid;
use common::{ExplainRequest, ExplanationReply, RelayFailure};
use tracing::{info, instrument, trace, warn};

/// Explain how a market event affects the portfolio
#[utoipa::path(
    post,
    path = "/api/explain",
    tag = "analysis",
    request_body = ExplainRequest,
    responses(
        (status = 200, description = "Explanation produced", body = ExplanationReply),
        (status = 400, description = "Empty event"),
        (status = 502, description = "Assistant API failed", body = RelayFailure),
        (status = 503, description = "No assistant API key configured", body = RelayFailure)
    )
)]
#[instrument(skip(state, request), fields(event = %request.event))]
pub async fn explain_event(
    State(state): State<AppState>,
    Valid(Json(request)): Valid<Json<ExplainRequest>>,
) -> Result<Json<ExplanationReply>, RelayRejection> {
    trace!("Entering explain_event function");

    let Some(assistant) = &state.assistant else {
        warn!("Explanation requested but no assistant API key is configured");
        return Err(relay_rejection(
            StatusCode::SERVICE_UNAVAILABLE,
            "Explanation service is not configured",
            None,
        ));
    };

    let explanation = assistant
        .explain(&request)
        .await
        .map_err(|e| assistant_failure(e, "Failed to fetch explanation"))?;

    info!("Explanation produced");
    Ok(Json(ExplanationReply {
        success: true,
        explanation,
    }))
}
