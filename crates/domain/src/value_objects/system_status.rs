//! Aggregate system status value object

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::errors::DomainError;

/// Externally observable health of the whole service
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum SystemStatus {
    /// Breaker closed, retries normal and quorum met
    Healthy,
    /// Anything else
    Degraded,
}

impl SystemStatus {
    /// Wire literal for this status
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Healthy => "HEALTHY",
            Self::Degraded => "DEGRADED",
        }
    }

    /// Check if the status is healthy
    #[must_use]
    pub const fn is_healthy(&self) -> bool {
        matches!(self, Self::Healthy)
    }
}

impl fmt::Display for SystemStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for SystemStatus {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_uppercase().as_str() {
            "HEALTHY" => Ok(Self::Healthy),
            "DEGRADED" => Ok(Self::Degraded),
            _ => Err(DomainError::unknown_state("system", s)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_and_display_agree() {
        for status in [SystemStatus::Healthy, SystemStatus::Degraded] {
            assert_eq!(status.to_string().parse::<SystemStatus>().unwrap(), status);
        }
    }

    #[test]
    fn rejects_unknown() {
        assert!("ON_FIRE".parse::<SystemStatus>().is_err());
    }
}
