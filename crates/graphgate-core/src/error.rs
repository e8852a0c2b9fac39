//! # Error Types
//!
//! Every failure the core can report to the HTTP layer.

use thiserror::Error;

/// Errors raised while talking to the embedded engine.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum GatewayError {
    /// Opening the engine or acquiring a connection failed.
    #[error("Connection error: {0}")]
    Connection(String),

    /// The engine rejected or failed to run a statement.
    #[error("{0}")]
    Query(String),

    /// A bound parameter could not be handed to the engine.
    #[error("Invalid parameter '{name}': {reason}")]
    InvalidParameter { name: String, reason: String },

    /// The engine answered, but not in the shape we expected.
    #[error("Unexpected result: {0}")]
    UnexpectedResult(String),

    /// An I/O error occurred.
    #[error("I/O error: {0}")]
    Io(String),
}

impl GatewayError {
    /// True when the failure was caused by the statement or its parameters
    /// rather than by the engine being unavailable.
    pub fn is_client_error(&self) -> bool {
        matches!(self, Self::Query(_) | Self::InvalidParameter { .. })
    }
}
