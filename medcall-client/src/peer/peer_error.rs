use thiserror::Error;

#[derive(Debug, Error)]
pub enum PeerError {
    #[error("failed to set up peer connection: {0}")]
    Setup(String),

    #[error("{operation} failed: {reason}")]
    Operation {
        operation: &'static str,
        reason: String,
    },

    #[error("peer connection is closed")]
    Closed,
}

impl PeerError {
    pub fn operation(operation: &'static str, reason: impl ToString) -> Self {
        PeerError::Operation {
            operation,
            reason: reason.to_string(),
        }
    }
}
