//! Fault switchboard port
//!
//! Server-side control of injected faults. While a fault is engaged the
//! guarded dependency adapters observe it.

use std::time::Duration;

#[cfg(test)]
use mockall::automock;
use serde::Serialize;

use domain::FaultType;

/// A fault currently engaged on the switchboard
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct EngagedFault {
    pub fault_type: FaultType,
    /// Seconds until the fault expires on its own
    pub remaining_secs: u64,
}

#[cfg_attr(test, automock)]
pub trait FaultSwitchPort: Send + Sync {
    /// Engage `fault_type` for at most `duration`; re-engaging extends it
    fn engage(&self, fault_type: FaultType, duration: Duration);

    /// Withdraw `fault_type`; returns whether it was engaged
    fn withdraw(&self, fault_type: FaultType) -> bool;

    /// Whether `fault_type` is currently engaged
    fn is_engaged(&self, fault_type: FaultType) -> bool;

    /// All currently engaged faults
    fn engaged(&self) -> Vec<EngagedFault>;
}
