//! Host resource status value object

use std::fmt;

use serde::{Deserialize, Serialize};

/// Severity of a resource reading against its thresholds
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ResourceStatus {
    /// Below the warning threshold
    #[default]
    Healthy,
    /// At or above the warning threshold
    Warning,
    /// At or above the critical threshold
    Critical,
}

impl ResourceStatus {
    /// Classify a percentage reading
    #[must_use]
    pub fn classify(value: f64, warning: f64, critical: f64) -> Self {
        if value >= critical {
            Self::Critical
        } else if value >= warning {
            Self::Warning
        } else {
            Self::Healthy
        }
    }
}

impl fmt::Display for ResourceStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Healthy => write!(f, "HEALTHY"),
            Self::Warning => write!(f, "WARNING"),
            Self::Critical => write!(f, "CRITICAL"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn classify_boundaries() {
        assert_eq!(ResourceStatus::classify(69.9, 70.0, 90.0), ResourceStatus::Healthy);
        assert_eq!(ResourceStatus::classify(70.0, 70.0, 90.0), ResourceStatus::Warning);
        assert_eq!(ResourceStatus::classify(90.0, 70.0, 90.0), ResourceStatus::Critical);
    }

    #[test]
    fn critical_wins_when_thresholds_are_inverted() {
        assert_eq!(ResourceStatus::classify(0.5, 0.1, 0.05), ResourceStatus::Critical);
    }
}
