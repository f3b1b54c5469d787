//! Resilience primitive ports
//!
//! Read and drive the circuit breaker and retry policy guarding the service's
//! unstable dependencies. Each implementation serializes its transitions
//! under a single lock, so a snapshot is always internally consistent.

use std::time::Duration;

#[cfg(test)]
use mockall::automock;

use domain::{CircuitState, RetryState};

use crate::error::ApplicationError;

/// Consistent view of a circuit breaker
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BreakerSnapshot {
    pub state: CircuitState,
    /// Time spent in the current state
    pub in_state_for: Duration,
    /// Cooldown that applies to the next (or current) OPEN period
    pub open_duration: Duration,
    /// Incremented every time the breaker enters OPEN
    pub open_generation: u64,
}

/// Consistent view of a retry policy
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetrySnapshot {
    pub state: RetryState,
    pub in_state_for: Duration,
    pub failures_in_window: usize,
    /// Incremented every time the policy enters ELEVATED
    pub elevated_generation: u64,
}

#[cfg_attr(test, automock)]
pub trait CircuitBreakerPort: Send + Sync {
    fn state(&self) -> CircuitState;

    /// Whether a call may proceed right now
    ///
    /// In HALF_OPEN exactly one caller is admitted until it reports back.
    fn allow_request(&self) -> bool;

    fn record_success(&self);

    fn record_failure(&self);

    fn snapshot(&self) -> BreakerSnapshot;

    /// Move an OPEN breaker to HALF_OPEN ahead of its cooldown
    fn force_half_open(&self) -> Result<(), ApplicationError>;
}

#[cfg_attr(test, automock)]
pub trait RetryPolicyPort: Send + Sync {
    fn state(&self) -> RetryState;

    fn record_outcome(&self, success: bool);

    /// Delay to wait before the next retried call
    fn next_delay(&self) -> Duration;

    fn snapshot(&self) -> RetrySnapshot;
}
