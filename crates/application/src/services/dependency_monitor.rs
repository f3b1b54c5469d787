//! Dependency probing service
//!
//! Periodically exercises the service's unstable dependencies and feeds the
//! outcomes into the resilience primitives: the model loader is called
//! through the circuit breaker, the telemetry upstream and cache feed the
//! retry policy.

use std::sync::Arc;

use tracing::{debug, warn};

use crate::ports::{CircuitBreakerPort, DependencyPort, RetryPolicyPort};

/// Outcome of one probe pass
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProbeReport {
    /// `None` when the breaker refused the call
    pub breaker_guarded: Option<bool>,
    /// (dependency name, success) for each retry-tracked dependency
    pub retry_tracked: Vec<(&'static str, bool)>,
}

pub struct DependencyMonitor {
    breaker: Arc<dyn CircuitBreakerPort>,
    retry: Arc<dyn RetryPolicyPort>,
    guarded: Arc<dyn DependencyPort>,
    tracked: Vec<Arc<dyn DependencyPort>>,
}

impl std::fmt::Debug for DependencyMonitor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DependencyMonitor")
            .field("guarded", &self.guarded.name())
            .field(
                "tracked",
                &self.tracked.iter().map(|d| d.name()).collect::<Vec<_>>(),
            )
            .finish_non_exhaustive()
    }
}

impl DependencyMonitor {
    pub fn new(
        breaker: Arc<dyn CircuitBreakerPort>,
        retry: Arc<dyn RetryPolicyPort>,
        guarded: Arc<dyn DependencyPort>,
        tracked: Vec<Arc<dyn DependencyPort>>,
    ) -> Self {
        Self {
            breaker,
            retry,
            guarded,
            tracked,
        }
    }

    /// Run one probe against every dependency
    pub async fn probe_once(&self) -> ProbeReport {
        let mut report = ProbeReport::default();

        if self.breaker.allow_request() {
            let ok = match self.guarded.check().await {
                Ok(()) => {
                    self.breaker.record_success();
                    true
                },
                Err(e) => {
                    warn!(dependency = self.guarded.name(), error = %e, "Guarded dependency check failed");
                    self.breaker.record_failure();
                    false
                },
            };
            report.breaker_guarded = Some(ok);
        } else {
            debug!(dependency = self.guarded.name(), "Circuit open, skipping probe");
        }

        for dep in &self.tracked {
            let ok = match dep.check().await {
                Ok(()) => true,
                Err(e) => {
                    warn!(dependency = dep.name(), error = %e, "Dependency check failed");
                    false
                },
            };
            self.retry.record_outcome(ok);
            report.retry_tracked.push((dep.name(), ok));
        }

        report
    }
}
