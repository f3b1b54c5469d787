//! Retry escalation policy with exponential backoff
//!
//! [`RetryPolicy`] tracks a sliding window of recent call outcomes against an
//! unstable dependency. It escalates to ELEVATED when failures in the window
//! exceed `elevated_threshold` and returns to NORMAL only after
//! `recovery_streak` consecutive successes. The policy never performs calls
//! itself; it advises a backoff delay. [`with_retry`] is the helper that
//! performs retried calls, consulting the policy between attempts and
//! feeding every outcome back into it.
//!
//! # Example
//!
//! ```rust,ignore
//! use infrastructure::retry::{RetryConfig, RetryPolicy, with_retry};
//!
//! let policy = RetryPolicy::new("telemetry-upstream", RetryConfig::default());
//! let result = with_retry(&policy, || async {
//!     upstream.fetch().await
//! }).await;
//! ```

use std::collections::VecDeque;
use std::future::Future;
use std::time::{Duration, Instant};

use application::{RetryPolicyPort, RetrySnapshot};
use domain::RetryState;
use parking_lot::Mutex;
use rand::Rng;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

/// Configuration for retry behavior with exponential backoff
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RetryConfig {
    /// Initial delay before first retry in milliseconds (default: 100ms)
    #[serde(default = "default_initial_delay")]
    pub initial_delay_ms: u64,

    /// Maximum delay between retries in milliseconds (default: 10000ms = 10s)
    #[serde(default = "default_max_delay")]
    pub max_delay_ms: u64,

    /// Multiplier for exponential backoff (default: 2.0)
    #[serde(default = "default_multiplier")]
    pub multiplier: f64,

    /// Maximum number of retry attempts (default: 3)
    #[serde(default = "default_max_retries")]
    pub max_retries: u32,

    /// Whether to add jitter to prevent thundering herd (default: true)
    #[serde(default = "default_true")]
    pub jitter_enabled: bool,

    /// Maximum jitter factor (0.0 to 1.0, default: 0.1 = 10%)
    #[serde(default = "default_jitter_factor")]
    pub jitter_factor: f64,

    /// Number of recent outcomes considered (default: 10)
    #[serde(default = "default_window_size")]
    pub window_size: usize,

    /// Failures in the window above which the policy escalates (default: 3)
    #[serde(default = "default_elevated_threshold")]
    pub elevated_threshold: usize,

    /// Consecutive successes needed to de-escalate (default: 3)
    #[serde(default = "default_recovery_streak")]
    pub recovery_streak: u32,
}

const fn default_initial_delay() -> u64 {
    100
}

const fn default_max_delay() -> u64 {
    10_000
}

const fn default_multiplier() -> f64 {
    2.0
}

const fn default_max_retries() -> u32 {
    3
}

const fn default_true() -> bool {
    true
}

const fn default_jitter_factor() -> f64 {
    0.1
}

const fn default_window_size() -> usize {
    10
}

const fn default_elevated_threshold() -> usize {
    3
}

const fn default_recovery_streak() -> u32 {
    3
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            initial_delay_ms: default_initial_delay(),
            max_delay_ms: default_max_delay(),
            multiplier: default_multiplier(),
            max_retries: default_max_retries(),
            jitter_enabled: default_true(),
            jitter_factor: default_jitter_factor(),
            window_size: default_window_size(),
            elevated_threshold: default_elevated_threshold(),
            recovery_streak: default_recovery_streak(),
        }
    }
}

impl RetryConfig {
    /// Create a new retry configuration with custom backoff parameters
    #[must_use]
    pub const fn new(
        initial_delay_ms: u64,
        max_delay_ms: u64,
        multiplier: f64,
        max_retries: u32,
    ) -> Self {
        Self {
            initial_delay_ms,
            max_delay_ms,
            multiplier,
            max_retries,
            jitter_enabled: true,
            jitter_factor: 0.1,
            window_size: default_window_size(),
            elevated_threshold: default_elevated_threshold(),
            recovery_streak: default_recovery_streak(),
        }
    }

    /// Create a configuration optimized for fast retries (low latency operations)
    #[must_use]
    pub const fn fast() -> Self {
        Self::new(50, 1000, 2.0, 3)
    }

    /// Create a configuration for slow/expensive operations
    #[must_use]
    pub const fn slow() -> Self {
        let mut config = Self::new(500, 30_000, 2.0, 5);
        config.jitter_factor = 0.2;
        config
    }

    /// Override the escalation parameters
    #[must_use]
    pub const fn with_escalation(
        mut self,
        window_size: usize,
        elevated_threshold: usize,
        recovery_streak: u32,
    ) -> Self {
        self.window_size = window_size;
        self.elevated_threshold = elevated_threshold;
        self.recovery_streak = recovery_streak;
        self
    }

    /// Disable jitter (not recommended for production)
    #[must_use]
    pub const fn without_jitter(mut self) -> Self {
        self.jitter_enabled = false;
        self
    }

    /// Calculate the delay after `consecutive_failures` failures
    ///
    /// Uses exponential backoff: delay = initial_delay * multiplier^failures
    /// with optional jitter. The result never exceeds max_delay.
    #[must_use]
    #[allow(
        clippy::cast_precision_loss,
        clippy::cast_possible_wrap,
        clippy::cast_sign_loss,
        clippy::cast_possible_truncation
    )]
    pub fn delay_for_attempt(&self, consecutive_failures: u32) -> Duration {
        let exponent = consecutive_failures.min(i32::MAX as u32) as i32;
        let base_delay = (self.initial_delay_ms as f64) * self.multiplier.powi(exponent);
        let capped_delay = base_delay.min(self.max_delay_ms as f64);

        let final_delay = if self.jitter_enabled && self.jitter_factor > 0.0 {
            let jitter_range = capped_delay * self.jitter_factor;
            let jitter = rand::rng().random_range(-jitter_range..=jitter_range);
            (capped_delay + jitter).clamp(0.0, self.max_delay_ms as f64)
        } else {
            capped_delay
        };

        // Safe: final_delay is clamped to [0, max_delay]
        Duration::from_millis(final_delay as u64)
    }
}

struct PolicyState {
    state: RetryState,
    window: VecDeque<bool>,
    consecutive_failures: u32,
    success_streak: u32,
    entered_at: Instant,
    elevated_generation: u64,
}

impl PolicyState {
    fn failures_in_window(&self) -> usize {
        self.window.iter().filter(|ok| !**ok).count()
    }
}

/// Sliding-window retry escalation for one dependency
pub struct RetryPolicy {
    name: String,
    config: RetryConfig,
    state: Mutex<PolicyState>,
}

impl std::fmt::Debug for RetryPolicy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RetryPolicy")
            .field("name", &self.name)
            .field("state", &self.state())
            .finish_non_exhaustive()
    }
}

impl RetryPolicy {
    #[must_use]
    pub fn new(name: impl Into<String>, config: RetryConfig) -> Self {
        Self {
            name: name.into(),
            state: Mutex::new(PolicyState {
                state: RetryState::Normal,
                window: VecDeque::with_capacity(config.window_size.max(1)),
                consecutive_failures: 0,
                success_streak: 0,
                entered_at: Instant::now(),
                elevated_generation: 0,
            }),
            config,
        }
    }

    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    #[must_use]
    pub const fn config(&self) -> &RetryConfig {
        &self.config
    }

    #[must_use]
    pub fn state(&self) -> RetryState {
        self.state.lock().state
    }

    pub fn record_outcome(&self, success: bool) {
        self.record_outcome_at(success, Instant::now());
    }

    pub fn record_outcome_at(&self, success: bool, now: Instant) {
        let mut st = self.state.lock();
        if st.window.len() >= self.config.window_size.max(1) {
            st.window.pop_front();
        }
        st.window.push_back(success);
        if success {
            st.consecutive_failures = 0;
            st.success_streak = st.success_streak.saturating_add(1);
        } else {
            st.consecutive_failures = st.consecutive_failures.saturating_add(1);
            st.success_streak = 0;
        }

        let failures = st.failures_in_window();
        match st.state {
            RetryState::Normal if failures > self.config.elevated_threshold => {
                warn!(
                    policy = %self.name,
                    failures,
                    threshold = self.config.elevated_threshold,
                    "Retry policy escalating to Elevated"
                );
                st.state = RetryState::Elevated;
                st.entered_at = now;
                st.elevated_generation += 1;
            },
            RetryState::Elevated if st.success_streak >= self.config.recovery_streak.max(1) => {
                info!(
                    policy = %self.name,
                    streak = st.success_streak,
                    "Retry policy returning to Normal"
                );
                st.state = RetryState::Normal;
                st.entered_at = now;
                st.window.clear();
            },
            RetryState::Normal | RetryState::Elevated => {},
        }
    }

    /// Backoff to wait before the next attempt
    #[must_use]
    pub fn next_delay(&self) -> Duration {
        let failures = self.state.lock().consecutive_failures;
        self.config.delay_for_attempt(failures)
    }

    pub fn snapshot_at(&self, now: Instant) -> RetrySnapshot {
        let st = self.state.lock();
        RetrySnapshot {
            state: st.state,
            in_state_for: now.saturating_duration_since(st.entered_at),
            failures_in_window: st.failures_in_window(),
            elevated_generation: st.elevated_generation,
        }
    }
}

impl RetryPolicyPort for RetryPolicy {
    fn state(&self) -> RetryState {
        Self::state(self)
    }

    fn record_outcome(&self, success: bool) {
        Self::record_outcome(self, success);
    }

    fn next_delay(&self) -> Duration {
        Self::next_delay(self)
    }

    fn snapshot(&self) -> RetrySnapshot {
        self.snapshot_at(Instant::now())
    }
}

/// Trait for errors that can be checked for retryability
pub trait Retryable {
    /// Returns true if this error is retryable
    fn is_retryable(&self) -> bool;
}

impl Retryable for application::ApplicationError {
    fn is_retryable(&self) -> bool {
        Self::is_retryable(self)
    }
}

/// Retry result containing either success or the last error
#[derive(Debug)]
pub struct RetryResult<T, E> {
    /// The result of the operation
    pub result: Result<T, E>,
    /// Number of attempts made (1 = no retries, 2 = one retry, etc.)
    pub attempts: u32,
    /// Total time spent including retries
    pub total_duration: Duration,
}

impl<T, E> RetryResult<T, E> {
    /// Check if the operation succeeded
    #[must_use]
    pub const fn is_ok(&self) -> bool {
        self.result.is_ok()
    }

    /// Check if the operation failed
    #[must_use]
    pub const fn is_err(&self) -> bool {
        self.result.is_err()
    }

    /// Convert to standard Result, discarding metadata
    pub fn into_result(self) -> Result<T, E> {
        self.result
    }
}

/// Execute an async operation with retry logic
///
/// Retries the operation up to `max_retries` times when it fails with a
/// retryable error, sleeping for the policy's advised delay in between.
/// Every outcome is recorded on the policy.
#[allow(clippy::cast_possible_truncation)]
pub async fn with_retry<F, Fut, T, E>(policy: &RetryPolicy, mut operation: F) -> RetryResult<T, E>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, E>>,
    E: Retryable + std::fmt::Display,
{
    let start = std::time::Instant::now();
    let max_retries = policy.config().max_retries;
    let mut attempts = 0u32;

    loop {
        attempts += 1;
        match operation().await {
            Ok(value) => {
                policy.record_outcome(true);
                if attempts > 1 {
                    debug!(
                        policy = %policy.name(),
                        attempts,
                        duration_ms = start.elapsed().as_millis() as u64,
                        "Operation succeeded after retries"
                    );
                }
                return RetryResult {
                    result: Ok(value),
                    attempts,
                    total_duration: start.elapsed(),
                };
            },
            Err(err) => {
                policy.record_outcome(false);

                if !err.is_retryable() {
                    debug!(
                        policy = %policy.name(),
                        attempts,
                        error = %err,
                        "Operation failed with non-retryable error"
                    );
                    return RetryResult {
                        result: Err(err),
                        attempts,
                        total_duration: start.elapsed(),
                    };
                }

                if attempts > max_retries {
                    warn!(
                        policy = %policy.name(),
                        attempts,
                        max_retries,
                        error = %err,
                        "Operation failed after max retries"
                    );
                    return RetryResult {
                        result: Err(err),
                        attempts,
                        total_duration: start.elapsed(),
                    };
                }

                let delay = policy.next_delay();
                warn!(
                    policy = %policy.name(),
                    attempt = attempts,
                    max_retries,
                    delay_ms = delay.as_millis() as u64,
                    error = %err,
                    "Operation failed, retrying"
                );

                tokio::time::sleep(delay).await;
            },
        }
    }
}
