//! Recovery action entity - One remediation step taken by the orchestrator

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Kind of remediation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RecoveryActionKind {
    /// Force an open circuit breaker into a half-open probe
    CircuitRestart,
    /// Clear the downstream telemetry cache
    CachePurge,
}

impl RecoveryActionKind {
    /// Wire name of the action
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::CircuitRestart => "circuit_restart",
            Self::CachePurge => "cache_purge",
        }
    }
}

impl fmt::Display for RecoveryActionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for RecoveryActionKind {
    type Err = crate::DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "circuit_restart" => Ok(Self::CircuitRestart),
            "cache_purge" => Ok(Self::CachePurge),
            other => Err(crate::DomainError::ValidationError(format!(
                "unknown recovery action: {other}"
            ))),
        }
    }
}

/// Result of executing a recovery action
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", content = "reason", rename_all = "snake_case")]
pub enum RecoveryOutcome {
    /// The action ran to completion
    Executed,
    /// The action could not be carried out
    Failed(String),
}

impl RecoveryOutcome {
    #[must_use]
    pub const fn is_executed(&self) -> bool {
        matches!(self, Self::Executed)
    }
}

/// An immutable entry in the recovery action log
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecoveryAction {
    pub kind: RecoveryActionKind,
    pub timestamp: DateTime<Utc>,
    /// Human-readable description of the degraded signal that caused it
    pub triggering_condition: String,
    pub outcome: RecoveryOutcome,
}

impl RecoveryAction {
    /// Record an action that executed successfully
    #[must_use]
    pub fn executed(kind: RecoveryActionKind, triggering_condition: impl Into<String>) -> Self {
        Self {
            kind,
            timestamp: Utc::now(),
            triggering_condition: triggering_condition.into(),
            outcome: RecoveryOutcome::Executed,
        }
    }

    /// Record an action that failed to execute
    #[must_use]
    pub fn failed(
        kind: RecoveryActionKind,
        triggering_condition: impl Into<String>,
        reason: impl Into<String>,
    ) -> Self {
        Self {
            kind,
            timestamp: Utc::now(),
            triggering_condition: triggering_condition.into(),
            outcome: RecoveryOutcome::Failed(reason.into()),
        }
    }

    #[must_use]
    pub const fn succeeded(&self) -> bool {
        self.outcome.is_executed()
    }
}
