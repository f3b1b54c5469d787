//! Recovery orchestration service
//!
//! Watches the circuit breaker and retry policy on a periodic tick and issues
//! bounded remediation when degradation persists past a grace period:
//!
//! - breaker OPEN longer than `breaker_grace` → `circuit_restart`
//! - retry ELEVATED longer than `retry_grace` → `cache_purge`
//!
//! Each action fires at most once per qualifying condition. The condition is
//! identified by the breaker's open generation or the policy's elevated
//! generation, so a fresh OPEN/ELEVATED episode re-arms it. Failed actions are
//! logged but not latched and will be retried on the next tick.

use std::collections::VecDeque;
use std::sync::Arc;
use std::time::Duration;

use domain::{RecoveryAction, RecoveryActionKind};
use parking_lot::Mutex;
use tracing::{debug, info, warn};

use crate::ports::{
    BreakerSnapshot, CachePurgePort, CircuitBreakerPort, RetryPolicyPort, RetrySnapshot,
};

/// Default number of log entries kept
pub const DEFAULT_MAX_LOG_ENTRIES: usize = 100;

/// Tuning for the recovery orchestrator
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecoveryConfig {
    /// How often the background task calls [`RecoveryOrchestrator::tick`]
    pub tick_interval: Duration,
    pub breaker_grace: Duration,
    pub retry_grace: Duration,
    pub max_log_entries: usize,
}

impl Default for RecoveryConfig {
    fn default() -> Self {
        Self {
            tick_interval: Duration::from_secs(1),
            breaker_grace: Duration::from_secs(10),
            retry_grace: Duration::from_secs(5),
            max_log_entries: DEFAULT_MAX_LOG_ENTRIES,
        }
    }
}

/// State read from the resilience primitives for one evaluation
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RecoveryInputs {
    pub breaker: BreakerSnapshot,
    pub retry: RetrySnapshot,
}

#[derive(Debug, Default)]
struct RecoveryLog {
    actions: VecDeque<RecoveryAction>,
    /// Open generation already remediated by a successful restart
    restart_latch: Option<u64>,
    /// Elevated generation already remediated by a successful purge
    purge_latch: Option<u64>,
}

/// Issues remediation for sustained breaker and retry degradation
pub struct RecoveryOrchestrator {
    breaker: Arc<dyn CircuitBreakerPort>,
    retry: Arc<dyn RetryPolicyPort>,
    cache: Arc<dyn CachePurgePort>,
    config: RecoveryConfig,
    log: Mutex<RecoveryLog>,
    /// Serializes evaluations so a slow purge cannot be issued twice
    evaluating: tokio::sync::Mutex<()>,
}

impl std::fmt::Debug for RecoveryOrchestrator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RecoveryOrchestrator")
            .field("config", &self.config)
            .field("action_count", &self.action_count())
            .finish_non_exhaustive()
    }
}

impl RecoveryOrchestrator {
    pub fn new(
        breaker: Arc<dyn CircuitBreakerPort>,
        retry: Arc<dyn RetryPolicyPort>,
        cache: Arc<dyn CachePurgePort>,
        config: RecoveryConfig,
    ) -> Self {
        Self {
            breaker,
            retry,
            cache,
            config,
            log: Mutex::new(RecoveryLog::default()),
            evaluating: tokio::sync::Mutex::new(()),
        }
    }

    #[must_use]
    pub const fn config(&self) -> &RecoveryConfig {
        &self.config
    }

    /// Read consistent snapshots and evaluate them
    pub async fn tick(&self) -> Vec<RecoveryAction> {
        let inputs = RecoveryInputs {
            breaker: self.breaker.snapshot(),
            retry: self.retry.snapshot(),
        };
        self.evaluate(inputs).await
    }

    /// Decide and execute remediation for `inputs`
    ///
    /// Returns the actions attempted during this evaluation, failed ones
    /// included. Never returns an error.
    pub async fn evaluate(&self, inputs: RecoveryInputs) -> Vec<RecoveryAction> {
        let _serial = self.evaluating.lock().await;
        let mut taken = Vec::new();

        if let Some(condition) = self.restart_condition(&inputs.breaker) {
            let action = match self.breaker.force_half_open() {
                Ok(()) => {
                    info!(
                        action = %RecoveryActionKind::CircuitRestart,
                        condition = %condition,
                        "Recovery action executed"
                    );
                    self.log.lock().restart_latch = Some(inputs.breaker.open_generation);
                    RecoveryAction::executed(RecoveryActionKind::CircuitRestart, condition)
                },
                Err(e) => {
                    warn!(
                        action = %RecoveryActionKind::CircuitRestart,
                        condition = %condition,
                        error = %e,
                        "Recovery action failed, will retry on next tick"
                    );
                    RecoveryAction::failed(
                        RecoveryActionKind::CircuitRestart,
                        condition,
                        e.to_string(),
                    )
                },
            };
            taken.push(action);
        }

        if let Some(condition) = self.purge_condition(&inputs.retry) {
            let action = match self.cache.purge().await {
                Ok(purged) => {
                    info!(
                        action = %RecoveryActionKind::CachePurge,
                        condition = %condition,
                        purged,
                        "Recovery action executed"
                    );
                    self.log.lock().purge_latch = Some(inputs.retry.elevated_generation);
                    RecoveryAction::executed(RecoveryActionKind::CachePurge, condition)
                },
                Err(e) => {
                    warn!(
                        action = %RecoveryActionKind::CachePurge,
                        condition = %condition,
                        error = %e,
                        "Recovery action failed, will retry on next tick"
                    );
                    RecoveryAction::failed(RecoveryActionKind::CachePurge, condition, e.to_string())
                },
            };
            taken.push(action);
        }

        if !taken.is_empty() {
            self.append(&taken);
        }
        taken
    }

    fn restart_condition(&self, breaker: &BreakerSnapshot) -> Option<String> {
        if !matches!(breaker.state, domain::CircuitState::Open)
            || breaker.in_state_for < self.config.breaker_grace
        {
            return None;
        }
        if self.log.lock().restart_latch == Some(breaker.open_generation) {
            debug!(generation = breaker.open_generation, "Circuit restart already issued");
            return None;
        }
        Some(format!(
            "circuit breaker OPEN for {}s (grace {}s)",
            breaker.in_state_for.as_secs(),
            self.config.breaker_grace.as_secs()
        ))
    }

    fn purge_condition(&self, retry: &RetrySnapshot) -> Option<String> {
        if !matches!(retry.state, domain::RetryState::Elevated)
            || retry.in_state_for < self.config.retry_grace
        {
            return None;
        }
        if self.log.lock().purge_latch == Some(retry.elevated_generation) {
            debug!(generation = retry.elevated_generation, "Cache purge already issued");
            return None;
        }
        Some(format!(
            "retry ELEVATED for {}s with {} failures in window (grace {}s)",
            retry.in_state_for.as_secs(),
            retry.failures_in_window,
            self.config.retry_grace.as_secs()
        ))
    }

    fn append(&self, actions: &[RecoveryAction]) {
        let max = self.config.max_log_entries.max(1);
        let mut log = self.log.lock();
        for action in actions {
            if log.actions.len() >= max {
                log.actions.pop_front();
            }
            log.actions.push_back(action.clone());
        }
    }

    /// Every logged action, oldest first
    pub fn action_log(&self) -> Vec<RecoveryAction> {
        self.log.lock().actions.iter().cloned().collect()
    }

    /// Kinds of the logged actions, oldest first
    pub fn action_kinds(&self) -> Vec<RecoveryActionKind> {
        self.log.lock().actions.iter().map(|a| a.kind).collect()
    }

    pub fn action_count(&self) -> usize {
        self.log.lock().actions.len()
    }
}
