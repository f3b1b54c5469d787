//! Application services - Use case implementations

mod chaos;
mod dependency_monitor;
mod health_aggregator;
mod recovery_orchestrator;
mod resource_monitor;

pub use chaos::{
    ChaosConfig, ChaosOrchestrator, DEFAULT_BASE_URL, SCENARIO_CIRCUIT_BREAKER,
    SCENARIO_CLUSTER_CONSENSUS, SCENARIO_RECOVERY_ORCHESTRATOR, SCENARIO_RETRY_LOGIC, SCENARIOS,
};
pub use dependency_monitor::{DependencyMonitor, ProbeReport};
pub use health_aggregator::HealthAggregator;
pub use recovery_orchestrator::{
    DEFAULT_MAX_LOG_ENTRIES, RecoveryConfig, RecoveryInputs, RecoveryOrchestrator,
};
pub use resource_monitor::{DEFAULT_HISTORY_SIZE, ResourceHealth, ResourceMonitor};
