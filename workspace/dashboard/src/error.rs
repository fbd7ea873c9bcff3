use thiserror::Error;

/// Errors raised when a view needs state that is not there yet
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DashboardError {
    #[error("No result available yet. Please submit your portfolio first.")]
    NoResult,

    #[error("No explanation card for event: {0}")]
    UnknownEvent(String),
}

/// Errors from the portfolio form
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum FormError {
    #[error("Please add at least one valid portfolio entry")]
    NoValidEntries,
}
