//! Circuit breaker state value object

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::errors::DomainError;

/// State of a circuit breaker guarding one dependency
///
/// Serialized as the upper-case literals used by the health surface
/// (`CLOSED`, `OPEN`, `HALF_OPEN`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum CircuitState {
    /// Normal operation, requests pass through
    #[default]
    Closed,
    /// Dependency is failing, requests short-circuit
    Open,
    /// Cooldown elapsed, a single probe call is allowed
    HalfOpen,
}

impl CircuitState {
    /// Wire literal for this state
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Closed => "CLOSED",
            Self::Open => "OPEN",
            Self::HalfOpen => "HALF_OPEN",
        }
    }

    /// Whether calls may pass without restriction
    #[must_use]
    pub const fn is_closed(&self) -> bool {
        matches!(self, Self::Closed)
    }
}

impl fmt::Display for CircuitState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for CircuitState {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_uppercase().replace('-', "_").as_str() {
            "CLOSED" => Ok(Self::Closed),
            "OPEN" => Ok(Self::Open),
            "HALF_OPEN" => Ok(Self::HalfOpen),
            _ => Err(DomainError::unknown_state("circuit", s)),
        }
    }
}
