//! Chaos metrics port
//!
//! Sink for the injection counter, the "chaos active" gauge and recovery
//! time observations.

use std::time::Duration;

use domain::FaultType;

pub trait ChaosMetricsPort: Send + Sync + std::fmt::Debug {
    /// Count one injection attempt for `fault_type`
    fn record_injection(&self, fault_type: FaultType);

    /// Set the "chaos active" gauge
    fn set_chaos_active(&self, active: bool);

    /// Record how long a scenario took to observe recovery
    fn observe_recovery_time(&self, scenario: &str, elapsed: Duration);
}

/// Metrics sink that discards everything
#[derive(Debug, Default, Clone, Copy)]
pub struct NoopChaosMetrics;

impl ChaosMetricsPort for NoopChaosMetrics {
    fn record_injection(&self, _fault_type: FaultType) {}

    fn set_chaos_active(&self, _active: bool) {}

    fn observe_recovery_time(&self, _scenario: &str, _elapsed: Duration) {}
}
