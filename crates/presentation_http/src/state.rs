//! Application state shared across handlers

use std::sync::Arc;

use application::{
    CircuitBreakerPort, ConsensusPort, FaultSwitchPort, HealthAggregator, RecoveryOrchestrator,
    ResourceMonitor, RetryPolicyPort,
};
use domain::InstanceId;
use infrastructure::{AppConfig, MetricsRegistry};

/// Label of the breaker guarding the model loader
pub const GUARDED_CIRCUIT: &str = "model_loader";

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    /// Aggregate health over breaker, retry, recovery and consensus
    pub health: Arc<HealthAggregator>,
    pub consensus: Arc<dyn ConsensusPort>,
    pub breaker: Arc<dyn CircuitBreakerPort>,
    pub retry: Arc<dyn RetryPolicyPort>,
    /// Faults currently engaged against this instance's dependencies
    pub switchboard: Arc<dyn FaultSwitchPort>,
    pub metrics: Arc<MetricsRegistry>,
    pub resources: Arc<ResourceMonitor>,
    pub config: Arc<AppConfig>,
    /// Identity this instance heartbeats under
    pub instance_id: InstanceId,
}

impl AppState {
    pub fn recovery(&self) -> &RecoveryOrchestrator {
        self.health.recovery()
    }

    /// Align the `chaos_active` gauge with the switchboard
    pub fn sync_chaos_gauge(&self) {
        use application::ChaosMetricsPort;
        self.metrics
            .set_chaos_active(!self.switchboard.engaged().is_empty());
    }
}

impl std::fmt::Debug for AppState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppState")
            .field("instance_id", &self.instance_id)
            .field("health", &self.health)
            .field("resources", &self.resources)
            .finish_non_exhaustive()
    }
}
