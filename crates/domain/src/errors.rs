//! Domain-level errors

use thiserror::Error;

/// Errors that can occur in the domain layer
#[derive(Debug, Error, PartialEq, Eq)]
pub enum DomainError {
    /// Fault type string is not one of the supported injections
    #[error("Unknown fault type: {0}")]
    UnknownFaultType(String),

    /// Cluster instance identifier is malformed
    #[error("Invalid instance id: {0}")]
    InvalidInstanceId(String),

    /// Unrecognised state literal in a health document
    #[error("Unknown {kind} state: {value}")]
    UnknownState { kind: &'static str, value: String },

    /// Validation failed
    #[error("Validation failed: {0}")]
    ValidationError(String),
}

impl DomainError {
    /// Create an unknown state error
    pub fn unknown_state(kind: &'static str, value: impl Into<String>) -> Self {
        Self::UnknownState {
            kind,
            value: value.into(),
        }
    }
}
