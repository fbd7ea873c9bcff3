use crate::handlers::failures::{
    HISTOGRAM_FAILED, INTERNAL_ERROR, RelayRejection, relay_failure, relay_rejection,
};
use crate::jobs;
use crate::schemas::AppState;
use axum::{extract::State, http::StatusCode, response::Json};
use common::{HistogramReply, RelayFailure};
use tracing::{debug, error, info, instrument, trace, warn};

/// Render the sector histogram of the latest analysis
///
/// The image is published as `/assets/sector_histogram.png`.
#[utoipa::path(
    get,
    path = "/api/generate-histogram",
    tag = "analysis",
    responses(
        (status = 200, description = "Histogram generated", body = HistogramReply),
        (status = 500, description = "Script failed", body = RelayFailure)
    )
)]
#[instrument(skip(state))]
pub async fn generate_histogram(
    State(state): State<AppState>,
) -> Result<Json<HistogramReply>, RelayRejection> {
    trace!("Entering generate_histogram function");

    let latest = state.latest_result.read().await.clone();
    let job = match latest {
        Some(result) => {
            debug!("Using latest analysis result as histogram input");
            let contents = serde_json::to_vec(&result).map_err(|e| {
                error!("Failed to serialize analysis result: {}", e);
                relay_rejection(
                    StatusCode::INTERNAL_SERVER_ERROR,
                    INTERNAL_ERROR,
                    Some(e.to_string()),
                )
            })?;
            jobs::HISTOGRAM.job_with_input(&state.settings, contents)
        }
        None => {
            warn!("No analysis result yet; running histogram job without input");
            jobs::HISTOGRAM.job(&state.settings)
        }
    };

    let outcome = state
        .runner
        .run(&job)
        .await
        .map_err(|e| relay_failure(e, HISTOGRAM_FAILED))?;

    let assets_dir = &state.settings.assets_dir;
    let target = assets_dir.join(jobs::HISTOGRAM.output_file);
    // Readers of /assets only ever see a complete image.
    let staged = assets_dir.join(format!(
        ".{}.{}.tmp",
        jobs::HISTOGRAM.output_file,
        outcome.job_id
    ));
    let published = async {
        tokio::fs::create_dir_all(assets_dir).await?;
        tokio::fs::write(&staged, &outcome.contents).await?;
        tokio::fs::rename(&staged, &target).await
    };
    if let Err(e) = published.await {
        error!("Failed to publish histogram to {}: {}", target.display(), e);
        if let Err(cleanup) = tokio::fs::remove_file(&staged).await {
            debug!("No staged histogram to remove at {}: {}", staged.display(), cleanup);
        }
        return Err(relay_rejection(
            StatusCode::INTERNAL_SERVER_ERROR,
            INTERNAL_ERROR,
            Some(e.to_string()),
        ));
    }

    info!("Histogram published to {}", target.display());
    Ok(Json(HistogramReply {
        success: true,
        message: "Histogram generated successfully".to_string(),
    }))
}
