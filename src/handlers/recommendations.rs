use crate::handlers::failures::{RelayRejection, assistant_failure, relay_rejection};
use crate::schemas::AppState;
use axum::{extract::State, http::StatusCode, response::Json};
use axum_valid::Valid;
use common::{RecommendationReply, RecommendationRequest, RelayFailure};
use tracing::{debug, info, instrument, trace, warn};

/// Suggest investment changes for an analysed portfolio
#[utoipa::path(
    post,
    path = "/api/recommendations",
    tag = "analysis",
    request_body = RecommendationRequest,
    responses(
        (status = 200, description = "Recommendations produced", body = RecommendationReply),
        (status = 400, description = "Empty portfolio"),
        (status = 502, description = "Assistant API failed", body = RelayFailure),
        (status = 503, description = "No assistant API key configured", body = RelayFailure)
    )
)]
#[instrument(skip(state, request), fields(entries = request.portfolio.len()))]
pub async fn recommend_changes(
    State(state): State<AppState>,
    Valid(Json(request)): Valid<Json<RecommendationRequest>>,
) -> Result<Json<RecommendationReply>, RelayRejection> {
    trace!("Entering recommend_changes function");
    debug!(
        "Recommending for {} sectors and {} events",
        request.sector_predictions.len(),
        request.events.len()
    );

    let Some(assistant) = &state.assistant else {
        warn!("Recommendations requested but no assistant API key is configured");
        return Err(relay_rejection(
            StatusCode::SERVICE_UNAVAILABLE,
            "Recommendation service is not configured",
            None,
        ));
    };

    let recommendations = assistant
        .recommend(&request)
        .await
        .map_err(|e| assistant_failure(e, "Failed to fetch recommendations"))?;

    info!("Recommendations produced");
    Ok(Json(RecommendationReply {
        success: true,
        recommendations,
    }))
}
