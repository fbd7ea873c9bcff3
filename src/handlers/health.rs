use crate::jobs;
use crate::schemas::{AppState, HealthResponse};
use axum::{extract::State, response::Json};
use chrono::Utc;
use tracing::{instrument, warn};

/// Health check endpoint
#[utoipa::path(
    get,
    path = "/health",
    tag = "health",
    responses(
        (status = 200, description = "Service is running", body = HealthResponse)
    )
)]
#[instrument(skip(state))]
pub async fn health_check(State(state): State<AppState>) -> Json<HealthResponse> {
    let scripts = jobs::ALL
        .iter()
        .map(|endpoint| {
            let present = endpoint.script_exists(&state.settings);
            if !present {
                warn!("Script missing: {}", endpoint.script);
            }
            (endpoint.script.to_string(), present)
        })
        .collect();

    Json(HealthResponse {
        status: "healthy".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        scripts,
        assistant_configured: state.assistant.is_some(),
        checked_at: Utc::now(),
    })
}
