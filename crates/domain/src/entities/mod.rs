//! Domain entities - Objects with identity and lifecycle

mod cluster_node;
mod consensus_round;
mod fault_injection;
mod health_snapshot;
mod recovery_action;
mod resource_metrics;

pub use cluster_node::ClusterNode;
pub use consensus_round::ConsensusRound;
pub use fault_injection::FaultInjectionRecord;
pub use health_snapshot::{
    CircuitBreakerSection, HealthSnapshot, RecoverySection, RetrySection, SystemSection,
};
pub use recovery_action::{RecoveryAction, RecoveryActionKind, RecoveryOutcome};
pub use resource_metrics::{ResourceMetrics, ResourceSummary, ResourceThresholds};
