use thiserror::Error;

use zerowaste_core_types::CoreError;

#[derive(Debug, Error)]
pub enum SchedulerError {
    #[error("malformed request: {0}")]
    MalformedRequest(String),
    #[error("handshake failed: {0}")]
    Handshake(String),
    #[error("connection fault: {0}")]
    Connection(String),
    #[error("computation fault: {0}")]
    Computation(String),
    #[error("internal error: {0}")]
    Internal(String),
}

impl SchedulerError {
    /// Short label used for the `reason` metric dimension.
    pub fn reason(&self) -> &'static str {
        match self {
            SchedulerError::MalformedRequest(_) => "malformed",
            SchedulerError::Handshake(_) => "handshake",
            SchedulerError::Connection(_) => "connection",
            SchedulerError::Computation(_) => "computation",
            SchedulerError::Internal(_) => "internal",
        }
    }
}

impl From<serde_json::Error> for SchedulerError {
    fn from(value: serde_json::Error) -> Self {
        SchedulerError::MalformedRequest(value.to_string())
    }
}

impl From<SchedulerError> for CoreError {
    fn from(value: SchedulerError) -> Self {
        CoreError::new(value.to_string())
    }
}
