//! Applies engaged faults to intercepted calls

use std::sync::Arc;
use std::time::Duration;

use application::ApplicationError;
use domain::FaultType;
use thiserror::Error;
use tracing::debug;

use super::{FaultPolicy, FaultSwitchboard};

/// Error returned in place of a faulted call
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum InjectedError {
    #[error("injected {fault_type} fault")]
    Fault { fault_type: FaultType },

    #[error("injected {fault_type} fault after {delay:?}")]
    AfterLatency {
        fault_type: FaultType,
        delay: Duration,
    },
}

impl From<InjectedError> for ApplicationError {
    fn from(err: InjectedError) -> Self {
        Self::Transport(err.to_string())
    }
}

/// Consults the switchboard before each guarded call
#[derive(Debug, Clone)]
pub struct FaultInjector {
    switchboard: Arc<FaultSwitchboard>,
}

impl FaultInjector {
    pub const fn new(switchboard: Arc<FaultSwitchboard>) -> Self {
        Self { switchboard }
    }

    pub fn switchboard(&self) -> &FaultSwitchboard {
        &self.switchboard
    }

    /// Apply `fault_type` if it is engaged
    ///
    /// Sleeps for the policy's latency, then fails with the policy's
    /// probability. Returns `Ok` when the call should proceed.
    pub async fn intercept(&self, fault_type: FaultType) -> Result<(), InjectedError> {
        if !self.switchboard.is_engaged_at(fault_type, tokio::time::Instant::now()) {
            return Ok(());
        }
        let policy = FaultPolicy::for_fault(fault_type);

        let delay = policy.latency.map(|dist| dist.sample());
        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }

        if policy.should_fail() {
            self.switchboard.record_failed();
            debug!(fault_type = %fault_type, "Guarded call failed by injected fault");
            return Err(match delay {
                Some(delay) => InjectedError::AfterLatency { fault_type, delay },
                None => InjectedError::Fault { fault_type },
            });
        }

        if delay.is_some() {
            self.switchboard.record_delayed();
        }
        Ok(())
    }
}
