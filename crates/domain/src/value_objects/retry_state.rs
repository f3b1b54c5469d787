//! Retry escalation state value object

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::errors::DomainError;

/// Escalation level of a retry policy
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum RetryState {
    /// Transient failures are within tolerance
    #[default]
    Normal,
    /// Too many recent failures, callers should back off harder
    Elevated,
}

impl RetryState {
    /// Wire literal for this state
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Normal => "NORMAL",
            Self::Elevated => "ELEVATED",
        }
    }
}

impl fmt::Display for RetryState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for RetryState {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_uppercase().as_str() {
            "NORMAL" => Ok(Self::Normal),
            "ELEVATED" => Ok(Self::Elevated),
            _ => Err(DomainError::unknown_state("retry", s)),
        }
    }
}
