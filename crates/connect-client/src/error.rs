//! Error types for the Kafka Connect client.

use std::time::Duration;

use thiserror::Error;

/// Result type alias for Connect API operations.
pub type ConnectResult<T> = Result<T, ConnectError>;

/// Errors that can occur while talking to a Connect cluster.
#[derive(Debug, Error)]
pub enum ConnectError {
    #[error("transport error: {0}")]
    Transport(String),

    #[error("protocol error: {0}")]
    Protocol(String),

    #[error("not found: {0}")]
    NotFound(String),

    #[error("Kafka Connect API error: {status} - {message}")]
    Api { status: u16, message: String },

    #[error("deadline exceeded after {0:?}")]
    DeadlineExceeded(Duration),
}

impl ConnectError {
    /// Whether the failure happened before any response was received.
    pub fn is_transport(&self) -> bool {
        matches!(self, Self::Transport(_) | Self::DeadlineExceeded(_))
    }
}
