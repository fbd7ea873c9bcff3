use crate::handlers::failures::{PredictionRejection, prediction_failure};
use crate::jobs;
use crate::schemas::AppState;
use axum::{body::Bytes, extract::State, http::StatusCode, response::Json};
use common::{AnalysisResult, PortfolioEntry, PredictionFailure};
use serde_json::Value;
use tracing::{debug, info, instrument, trace, warn};

/// Analyse a portfolio
///
/// The body must be a list of portfolio entries; once it is, it reaches the
/// prediction script byte for byte, extra fields included. Returns the
/// analysis produced by the script as is, without a `{success, ...}`
/// envelope; failures are reported as `{error}`.
#[utoipa::path(
    post,
    path = "/api/portfolio/process",
    tag = "analysis",
    request_body = Vec<PortfolioEntry>,
    responses(
        (status = 200, description = "Analysis result", body = AnalysisResult),
        (status = 422, description = "Body is not a list of portfolio entries", body = PredictionFailure),
        (status = 500, description = "Prediction failed", body = PredictionFailure)
    )
)]
#[instrument(skip(state, body), fields(bytes = body.len()))]
pub async fn process_portfolio(
    State(state): State<AppState>,
    body: Bytes,
) -> Result<Json<Value>, PredictionRejection> {
    trace!("Entering process_portfolio function");

    let entries: Vec<PortfolioEntry> = serde_json::from_slice(&body).map_err(|e| {
        warn!("Rejecting portfolio body: {}", e);
        (
            StatusCode::UNPROCESSABLE_ENTITY,
            Json(PredictionFailure::new(format!("Invalid portfolio: {}", e))),
        )
    })?;
    debug!("Processing portfolio with {} entries", entries.len());

    let job = jobs::PREDICTION.job_with_input(&state.settings, body.to_vec());
    let outcome = state.runner.run(&job).await.map_err(prediction_failure)?;
    let result: Value = outcome.json().map_err(prediction_failure)?;

    *state.latest_result.write().await = Some(result.clone());

    info!("Portfolio analysed in {:?}", outcome.elapsed);
    Ok(Json(result))
}
