//! Health aggregation service
//!
//! Composes breaker, retry, recovery and consensus state into the single
//! document the chaos harness polls. Holds no state of its own.

use std::sync::Arc;

use domain::{HealthSnapshot, SystemStatus};

use super::RecoveryOrchestrator;
use crate::ports::{CircuitBreakerPort, ConsensusPort, RetryPolicyPort};

pub struct HealthAggregator {
    breaker: Arc<dyn CircuitBreakerPort>,
    retry: Arc<dyn RetryPolicyPort>,
    recovery: Arc<RecoveryOrchestrator>,
    consensus: Arc<dyn ConsensusPort>,
}

impl std::fmt::Debug for HealthAggregator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HealthAggregator").finish_non_exhaustive()
    }
}

impl HealthAggregator {
    pub fn new(
        breaker: Arc<dyn CircuitBreakerPort>,
        retry: Arc<dyn RetryPolicyPort>,
        recovery: Arc<RecoveryOrchestrator>,
        consensus: Arc<dyn ConsensusPort>,
    ) -> Self {
        Self {
            breaker,
            retry,
            recovery,
            consensus,
        }
    }

    /// Recompute the aggregate health document
    pub fn snapshot(&self) -> HealthSnapshot {
        HealthSnapshot::compose(
            self.breaker.state(),
            self.retry.state(),
            self.recovery.action_kinds(),
            self.consensus.compute_round(),
        )
    }

    pub fn status(&self) -> SystemStatus {
        self.snapshot().status()
    }

    pub fn recovery(&self) -> &RecoveryOrchestrator {
        &self.recovery
    }

    pub fn consensus(&self) -> &dyn ConsensusPort {
        self.consensus.as_ref()
    }
}
