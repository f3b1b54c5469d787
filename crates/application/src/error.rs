//! Application-level errors

use domain::DomainError;
use thiserror::Error;

/// Errors that can occur in the application layer
#[derive(Debug, Error)]
pub enum ApplicationError {
    /// Domain-level error
    #[error(transparent)]
    Domain(#[from] DomainError),

    /// Input rejected before any I/O
    #[error("Validation error: {0}")]
    Validation(String),

    /// Connection refused, timeout or other transport failure
    #[error("Transport error: {0}")]
    Transport(String),

    /// Peer answered with something we could not interpret
    #[error("Protocol error: {0}")]
    Protocol(String),

    /// Operation requires `startup()` first
    #[error("Not started: {0}")]
    NotStarted(String),

    /// A recovery action could not be executed
    #[error("Recovery action failed: {0}")]
    RecoveryAction(String),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// Internal error
    #[error("Internal error: {0}")]
    Internal(String),
}

impl ApplicationError {
    /// Check if this error is retryable
    pub const fn is_retryable(&self) -> bool {
        matches!(self, Self::Transport(_))
    }
}
