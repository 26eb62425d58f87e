//! Error type shared by every view in the crate.

use thiserror::Error;

use crate::records::RecordCategory;
use crate::tracker::JobStatus;

/// Errors raised by view operations.
///
/// Validation failures never mutate state: the caller gets the error and the
/// view is left exactly as it was.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum FlowError {
    #[error("description must not be empty")]
    EmptyDescription,

    #[error("amount must be a positive number, got {0}")]
    InvalidAmount(f64),

    #[error("a reason is required to report an issue")]
    EmptyReason,

    #[error("extra cost not found: {0}")]
    CostNotFound(String),

    #[error("no {category} record with id {id}")]
    RecordNotFound { category: RecordCategory, id: String },

    #[error("cannot move from {from} to {to}")]
    InvalidTransition { from: JobStatus, to: JobStatus },

    #[error("job can only be submitted once completed (current status: {0})")]
    NotCompleted(JobStatus),

    #[error("job session already submitted")]
    SessionClosed,

    #[error("approval must be confirmed before it is released")]
    ConfirmationRequired,

    #[error("job has already been approved or reported")]
    AlreadyDecided,

    #[error("fixture error: {0}")]
    Fixture(String),

    #[error("config error: {0}")]
    Config(String),
}

pub type Result<T> = std::result::Result<T, FlowError>;

impl From<serde_json::Error> for FlowError {
    fn from(err: serde_json::Error) -> Self {
        FlowError::Fixture(err.to_string())
    }
}

impl From<std::io::Error> for FlowError {
    fn from(err: std::io::Error) -> Self {
        FlowError::Fixture(err.to_string())
    }
}
