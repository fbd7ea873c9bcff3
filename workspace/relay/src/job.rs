use crate::error::{RelayError, Result};
use serde::de::DeserializeOwned;
use std::path::PathBuf;
use std::time::Duration;
use uuid::Uuid;

/// Input file handed to a job. Written verbatim, never validated.
#[derive(Debug, Clone)]
pub struct JobInput {
    pub file_name: String,
    pub contents: Vec<u8>,
}

impl JobInput {
    pub fn new(file_name: impl Into<String>, contents: impl Into<Vec<u8>>) -> Self {
        Self {
            file_name: file_name.into(),
            contents: contents.into(),
        }
    }
}

/// Description of one job execution.
#[derive(Debug, Clone)]
pub struct JobSpec {
    /// Short name, used as the job directory prefix and in logs
    pub name: String,
    /// Script to execute
    pub script: PathBuf,
    pub input: Option<JobInput>,
    /// Name of the file the job must leave in its working directory
    pub output_file: String,
    /// Overrides the runner's default timeout
    pub timeout: Option<Duration>,
}

impl JobSpec {
    pub fn new(
        name: impl Into<String>,
        script: impl Into<PathBuf>,
        output_file: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            script: script.into(),
            input: None,
            output_file: output_file.into(),
            timeout: None,
        }
    }

    pub fn with_input(mut self, input: JobInput) -> Self {
        self.input = Some(input);
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }
}

/// Result of a job that exited successfully and produced its output file.
#[derive(Debug, Clone)]
pub struct JobOutcome {
    pub job_id: Uuid,
    pub output_file: String,
    pub contents: Vec<u8>,
    pub stdout: String,
    pub stderr: String,
    pub elapsed: Duration,
}

impl JobOutcome {
    /// Output file as UTF-8 text.
    pub fn text(&self) -> Result<&str> {
        std::str::from_utf8(&self.contents).map_err(|_| RelayError::InvalidUtf8 {
            file: self.output_file.clone(),
        })
    }

    /// Output file parsed as JSON.
    pub fn json<T: DeserializeOwned>(&self) -> Result<T> {
        serde_json::from_slice(&self.contents).map_err(|source| RelayError::MalformedOutput {
            file: self.output_file.clone(),
            source,
        })
    }

    pub fn into_contents(self) -> Vec<u8> {
        self.contents
    }
}
