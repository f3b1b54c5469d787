//! Port definitions for application layer
//!
//! Ports are interfaces that define how the application interacts with
//! external systems. Adapters in the infrastructure layer implement these ports.

mod cache_purge_port;
mod chaos_metrics_port;
mod consensus_port;
mod dependency_port;
mod fault_switch_port;
mod http_probe_port;
mod resilience_port;
mod resource_probe_port;

#[cfg(test)]
pub use cache_purge_port::MockCachePurgePort;
pub use cache_purge_port::CachePurgePort;
pub use chaos_metrics_port::{ChaosMetricsPort, NoopChaosMetrics};
#[cfg(test)]
pub use consensus_port::MockConsensusPort;
pub use consensus_port::ConsensusPort;
#[cfg(test)]
pub use dependency_port::MockDependencyPort;
pub use dependency_port::DependencyPort;
#[cfg(test)]
pub use fault_switch_port::MockFaultSwitchPort;
pub use fault_switch_port::{EngagedFault, FaultSwitchPort};
pub use http_probe_port::{HttpProbePort, HttpResponse, ProbeConnectorPort};
#[cfg(test)]
pub use resilience_port::{MockCircuitBreakerPort, MockRetryPolicyPort};
pub use resilience_port::{BreakerSnapshot, CircuitBreakerPort, RetryPolicyPort, RetrySnapshot};
#[cfg(test)]
pub use resource_probe_port::MockResourceProbePort;
pub use resource_probe_port::ResourceProbePort;
