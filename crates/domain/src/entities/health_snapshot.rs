//! Health snapshot - The aggregate document served at `/health`

use serde::{Deserialize, Serialize};

use super::{ConsensusRound, RecoveryActionKind};
use crate::value_objects::{CircuitState, RetryState, SystemStatus};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SystemSection {
    pub status: SystemStatus,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CircuitBreakerSection {
    pub state: CircuitState,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RetrySection {
    pub state: RetryState,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecoverySection {
    pub action_count: usize,
    /// Action kinds in the order they were recorded
    pub actions: Vec<RecoveryActionKind>,
}

/// Read-only aggregate health view
///
/// Always recomputed from the owning components; never mutated in place.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HealthSnapshot {
    pub system: SystemSection,
    pub circuit_breaker: CircuitBreakerSection,
    pub retry: RetrySection,
    pub recovery: RecoverySection,
    pub consensus: ConsensusRound,
}

impl HealthSnapshot {
    /// Compose a snapshot, deriving the system status
    #[must_use]
    pub fn compose(
        circuit: CircuitState,
        retry: RetryState,
        actions: Vec<RecoveryActionKind>,
        consensus: ConsensusRound,
    ) -> Self {
        let status = Self::derive_status(circuit, retry, &consensus);
        Self {
            system: SystemSection { status },
            circuit_breaker: CircuitBreakerSection { state: circuit },
            retry: RetrySection { state: retry },
            recovery: RecoverySection {
                action_count: actions.len(),
                actions,
            },
            consensus,
        }
    }

    /// HEALTHY only when the breaker is closed, retries are normal and
    /// quorum is met
    #[must_use]
    pub const fn derive_status(
        circuit: CircuitState,
        retry: RetryState,
        consensus: &ConsensusRound,
    ) -> SystemStatus {
        if matches!(circuit, CircuitState::Closed)
            && matches!(retry, RetryState::Normal)
            && consensus.quorum_met
        {
            SystemStatus::Healthy
        } else {
            SystemStatus::Degraded
        }
    }

    #[must_use]
    pub const fn status(&self) -> SystemStatus {
        self.system.status
    }
}
