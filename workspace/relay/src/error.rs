use std::path::PathBuf;
use std::time::Duration;
use thiserror::Error;

/// Error types for the relay module
#[derive(Error, Debug)]
pub enum RelayError {
    /// The job script does not exist
    #[error("Script not found: {}", .0.display())]
    ScriptNotFound(PathBuf),

    /// Filesystem error while preparing or collecting a job
    #[error("Failed to {action} {}: {source}", path.display())]
    Io {
        action: &'static str,
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The process could not be started
    #[error("Failed to start {}: {source}", script.display())]
    Spawn {
        script: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The process exited with a non-zero status or was killed by a signal
    #[error("Job exited with status {code:?}")]
    Failed { code: Option<i32>, stderr: String },

    /// The job found no free slot, or its process outlived the timeout and was killed
    #[error("Job did not finish within {}s", after.as_secs_f64())]
    TimedOut { after: Duration },

    /// The process exited successfully without producing its output file
    #[error("Expected output file {file} was not produced")]
    MissingOutput { file: String },

    /// The output file is not valid JSON
    #[error("Output file {file} is not valid JSON: {source}")]
    MalformedOutput {
        file: String,
        #[source]
        source: serde_json::Error,
    },

    /// The output file is not valid UTF-8 text
    #[error("Output file {file} is not valid UTF-8")]
    InvalidUtf8 { file: String },
}

impl RelayError {
    /// Captured stderr of the job, when the error carries it.
    pub fn stderr(&self) -> Option<&str> {
        match self {
            RelayError::Failed { stderr, .. } => Some(stderr.as_str()),
            _ => None,
        }
    }
}

/// Type alias for Result with RelayError
pub type Result<T> = std::result::Result<T, RelayError>;
