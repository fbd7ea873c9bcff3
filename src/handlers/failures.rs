use crate::assistant::AssistantError;
use axum::{http::StatusCode, response::Json};
use common::{PredictionFailure, RelayFailure};
use relay::RelayError;
use tracing::error;

/// Rejection of the `{success, ...}` enveloped endpoints
pub type RelayRejection = (StatusCode, Json<RelayFailure>);

/// Rejection of the portfolio processing endpoint
pub type PredictionRejection = (StatusCode, Json<PredictionFailure>);

pub const EXECUTION_FAILED: &str = "Failed to execute Python script";
pub const HISTOGRAM_FAILED: &str = "Failed to generate histogram";
pub const INVALID_RESULT: &str = "Invalid result format";
pub const INTERNAL_ERROR: &str = "Internal server error";
pub const JOB_TIMED_OUT: &str = "Job timed out";

pub fn relay_rejection(
    status: StatusCode,
    error: impl Into<String>,
    details: Option<String>,
) -> RelayRejection {
    (status, Json(RelayFailure::new(error, details)))
}

/// Map an assistant error to a 502 envelope; `message` names what failed.
pub fn assistant_failure(err: AssistantError, message: &str) -> RelayRejection {
    error!("{}: {}", message, err);
    let details = match &err {
        AssistantError::Upstream { status } => format!("Upstream status {}", status),
        AssistantError::Http(_) => err.to_string(),
    };
    relay_rejection(StatusCode::BAD_GATEWAY, message, Some(details))
}

/// Map a job error to the enveloped failure body.
///
/// `execution_failed` is the message used when the script could not run or
/// exited with an error; the script's stderr becomes `details`.
pub fn relay_failure(err: RelayError, execution_failed: &str) -> RelayRejection {
    error!("Job failed: {}", err);
    let (message, details) = match &err {
        RelayError::Failed { stderr, .. } => (execution_failed.to_string(), Some(stderr.clone())),
        RelayError::ScriptNotFound(_) | RelayError::Spawn { .. } => {
            (execution_failed.to_string(), Some(err.to_string()))
        }
        RelayError::TimedOut { .. } => (JOB_TIMED_OUT.to_string(), Some(err.to_string())),
        RelayError::MissingOutput { file } => (format!("{} not found", file), None),
        RelayError::MalformedOutput { .. } | RelayError::InvalidUtf8 { .. } => {
            (INVALID_RESULT.to_string(), Some(err.to_string()))
        }
        RelayError::Io { .. } => (INTERNAL_ERROR.to_string(), Some(err.to_string())),
    };
    relay_rejection(StatusCode::INTERNAL_SERVER_ERROR, message, details)
}

/// Map a job error to the bare `{error}` body of portfolio processing.
pub fn prediction_failure(err: RelayError) -> PredictionRejection {
    error!("Prediction job failed: {}", err);
    let message = match &err {
        RelayError::ScriptNotFound(_) => "Python script not found",
        RelayError::Spawn { .. } | RelayError::Failed { .. } => "Python script failed",
        RelayError::TimedOut { .. } => "Python script timed out",
        RelayError::MissingOutput { .. } => "Result file not generated",
        RelayError::MalformedOutput { .. } | RelayError::InvalidUtf8 { .. } => INVALID_RESULT,
        RelayError::Io { .. } => INTERNAL_ERROR,
    };
    (
        StatusCode::INTERNAL_SERVER_ERROR,
        Json(PredictionFailure::new(message)),
    )
}
