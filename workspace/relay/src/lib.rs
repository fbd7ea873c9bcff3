//! Runs an external job in an isolated working directory and relays the file
//! it produces.
//!
//! A job is one process execution: its input (if any) is written into a fresh
//! per-job directory, the process runs with that directory as its cwd under a
//! timeout, and the expected output file is read back once it exits
//! successfully. Concurrent jobs never share input or output paths.

pub mod error;
pub mod job;
pub mod runner;

pub use error::{RelayError, Result};
pub use job::{JobInput, JobOutcome, JobSpec};
pub use runner::{JobRunner, RunnerConfig};

/// Environment variables exposed to every job process.
pub mod env {
    pub const JOB_ID: &str = "SECTORLENS_JOB_ID";
    pub const JOB_DIR: &str = "SECTORLENS_JOB_DIR";
    pub const JOB_INPUT: &str = "SECTORLENS_JOB_INPUT";
    pub const JOB_OUTPUT: &str = "SECTORLENS_JOB_OUTPUT";
}
