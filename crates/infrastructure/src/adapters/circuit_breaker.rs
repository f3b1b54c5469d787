//! Circuit breaker guarding an unstable dependency
//!
//! # States
//!
//! - **Closed**: calls pass; failures are counted in a rolling window
//! - **Open**: calls fail fast until the cooldown (`open_duration`) elapses
//! - **Half-Open**: exactly one probe call is admitted; success closes the
//!   circuit, failure re-opens it with the cooldown multiplied by
//!   `backoff_factor` (capped at `max_open_duration`)
//!
//! OPEN → HALF_OPEN is time based and happens lazily on the next access.
//! Every transition happens under the breaker's single lock.
//!
//! # Example
//!
//! ```rust,ignore
//! use infrastructure::adapters::CircuitBreaker;
//!
//! let cb = CircuitBreaker::new("model-loader");
//! let result = cb.call(|| async {
//!     loader.load().await
//! }).await;
//! ```

use std::{
    collections::VecDeque,
    fmt,
    time::{Duration, Instant},
};

use application::{ApplicationError, BreakerSnapshot, CircuitBreakerPort};
use domain::CircuitState;
use parking_lot::RwLock;

/// Configuration for a circuit breaker
#[derive(Debug, Clone, PartialEq)]
pub struct CircuitBreakerConfig {
    /// Failures within `failure_window` that open the circuit
    pub failure_threshold: u32,
    /// Rolling window failures are counted in
    pub failure_window: Duration,
    /// Initial cooldown before a half-open probe
    pub open_duration: Duration,
    /// Cooldown multiplier applied after a failed probe
    pub backoff_factor: f64,
    /// Upper bound for the cooldown
    pub max_open_duration: Duration,
}

impl Default for CircuitBreakerConfig {
    fn default() -> Self {
        Self {
            failure_threshold: 5,
            failure_window: Duration::from_secs(60),
            open_duration: Duration::from_secs(30),
            backoff_factor: 2.0,
            max_open_duration: Duration::from_secs(300),
        }
    }
}

impl CircuitBreakerConfig {
    /// Creates a configuration for a sensitive/critical service (lower thresholds)
    #[must_use]
    pub const fn sensitive() -> Self {
        Self {
            failure_threshold: 3,
            failure_window: Duration::from_secs(30),
            open_duration: Duration::from_secs(10),
            backoff_factor: 2.0,
            max_open_duration: Duration::from_secs(120),
        }
    }

    /// Creates a configuration for a resilient service (higher thresholds)
    #[must_use]
    pub const fn resilient() -> Self {
        Self {
            failure_threshold: 10,
            failure_window: Duration::from_secs(120),
            open_duration: Duration::from_secs(60),
            backoff_factor: 1.5,
            max_open_duration: Duration::from_secs(600),
        }
    }

    /// Creates a custom configuration with default backoff
    #[must_use]
    pub fn custom(failure_threshold: u32, failure_window: Duration, open_duration: Duration) -> Self {
        Self {
            failure_threshold,
            failure_window,
            open_duration,
            ..Self::default()
        }
    }

    /// Override the backoff applied after failed probes
    #[must_use]
    pub const fn with_backoff(mut self, backoff_factor: f64, max_open_duration: Duration) -> Self {
        self.backoff_factor = backoff_factor;
        self.max_open_duration = max_open_duration;
        self
    }

    fn next_open_duration(&self, current: Duration) -> Duration {
        let factor = if self.backoff_factor.is_finite() {
            self.backoff_factor.max(1.0)
        } else {
            1.0
        };
        current.mul_f64(factor).min(self.ceiling())
    }

    fn ceiling(&self) -> Duration {
        self.max_open_duration.max(self.open_duration)
    }
}

/// Error returned when the circuit is open
#[derive(Debug, Clone)]
pub struct CircuitOpenError {
    /// Name of the guarded dependency
    pub service_name: String,
}

impl std::error::Error for CircuitOpenError {}

impl fmt::Display for CircuitOpenError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Circuit breaker open for service '{}': service is temporarily unavailable",
            self.service_name
        )
    }
}

/// Internal state tracking
struct BreakerState {
    state: CircuitState,
    /// Failure timestamps inside the rolling window (CLOSED only)
    failures: VecDeque<Instant>,
    entered_at: Instant,
    open_until: Option<Instant>,
    open_duration: Duration,
    /// When the admitted half-open probe started
    probe_started: Option<Instant>,
    open_generation: u64,
}

/// Circuit breaker wrapper for dependency calls
pub struct CircuitBreaker {
    name: String,
    config: CircuitBreakerConfig,
    state: RwLock<BreakerState>,
}

impl fmt::Debug for CircuitBreaker {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CircuitBreaker")
            .field("name", &self.name)
            .field("state", &self.state())
            .finish_non_exhaustive()
    }
}

impl CircuitBreaker {
    /// Creates a new circuit breaker with default configuration
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self::with_config(name, CircuitBreakerConfig::default())
    }

    /// Creates a new circuit breaker with custom configuration
    #[must_use]
    pub fn with_config(name: impl Into<String>, config: CircuitBreakerConfig) -> Self {
        let now = Instant::now();
        Self {
            name: name.into(),
            state: RwLock::new(BreakerState {
                state: CircuitState::Closed,
                failures: VecDeque::new(),
                entered_at: now,
                open_until: None,
                open_duration: config.open_duration,
                probe_started: None,
                open_generation: 0,
            }),
            config,
        }
    }

    /// Returns the name of this circuit breaker
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    #[must_use]
    pub const fn config(&self) -> &CircuitBreakerConfig {
        &self.config
    }

    /// Returns the current state of the circuit breaker
    #[must_use]
    pub fn state(&self) -> CircuitState {
        self.state_at(Instant::now())
    }

    /// [`Self::state`] evaluated at `now`
    pub fn state_at(&self, now: Instant) -> CircuitState {
        let mut st = self.state.write();
        self.refresh(&mut st, now);
        st.state
    }

    /// Returns true if the circuit is closed (normal operation)
    #[must_use]
    pub fn is_closed(&self) -> bool {
        self.state() == CircuitState::Closed
    }

    /// Returns true if the circuit is open (service unavailable)
    #[must_use]
    pub fn is_open(&self) -> bool {
        self.state() == CircuitState::Open
    }

    pub fn allow_request(&self) -> bool {
        self.allow_request_at(Instant::now())
    }

    /// Admit a call at `now`
    ///
    /// While HALF_OPEN the first caller takes the probe lease; others are
    /// refused until it reports back. A lease older than the current cooldown
    /// is considered abandoned and may be taken again.
    pub fn allow_request_at(&self, now: Instant) -> bool {
        let mut st = self.state.write();
        self.refresh(&mut st, now);
        match st.state {
            CircuitState::Closed => true,
            CircuitState::Open => false,
            CircuitState::HalfOpen => {
                let lease_free = st
                    .probe_started
                    .is_none_or(|started| now.duration_since(started) >= st.open_duration);
                if lease_free {
                    st.probe_started = Some(now);
                    tracing::debug!(circuit = %self.name, "Admitting half-open probe");
                }
                lease_free
            },
        }
    }

    pub fn record_success(&self) {
        self.record_success_at(Instant::now());
    }

    pub fn record_success_at(&self, now: Instant) {
        let mut st = self.state.write();
        self.refresh(&mut st, now);
        if st.state == CircuitState::HalfOpen {
            tracing::info!(circuit = %self.name, "Circuit transitioning from HalfOpen to Closed");
            st.state = CircuitState::Closed;
            st.entered_at = now;
            st.failures.clear();
            st.open_until = None;
            st.open_duration = self.config.open_duration;
            st.probe_started = None;
        }
    }

    pub fn record_failure(&self) {
        self.record_failure_at(Instant::now());
    }

    pub fn record_failure_at(&self, now: Instant) {
        let mut st = self.state.write();
        self.refresh(&mut st, now);
        match st.state {
            CircuitState::Closed => {
                st.failures.push_back(now);
                while st
                    .failures
                    .front()
                    .is_some_and(|t| now.duration_since(*t) > self.config.failure_window)
                {
                    st.failures.pop_front();
                }
                let failures = u32::try_from(st.failures.len()).unwrap_or(u32::MAX);
                if failures >= self.config.failure_threshold {
                    tracing::warn!(
                        circuit = %self.name,
                        failures,
                        "Circuit transitioning from Closed to Open"
                    );
                    self.trip(&mut st, now);
                }
            },
            CircuitState::HalfOpen => {
                st.open_duration = self.config.next_open_duration(st.open_duration);
                tracing::warn!(
                    circuit = %self.name,
                    open_duration_secs = st.open_duration.as_secs_f64(),
                    "Circuit transitioning from HalfOpen to Open after failed probe"
                );
                self.trip(&mut st, now);
            },
            CircuitState::Open => {},
        }
    }

    /// Move an OPEN breaker to HALF_OPEN ahead of its cooldown
    ///
    /// Returns whether the breaker is half-open afterwards; a CLOSED breaker
    /// is left untouched.
    pub fn force_half_open(&self) -> bool {
        self.force_half_open_at(Instant::now())
    }

    pub fn force_half_open_at(&self, now: Instant) -> bool {
        let mut st = self.state.write();
        self.refresh(&mut st, now);
        match st.state {
            CircuitState::Open => {
                tracing::info!(circuit = %self.name, "Circuit forced from Open to HalfOpen");
                self.enter_half_open(&mut st, now);
                true
            },
            CircuitState::HalfOpen => true,
            CircuitState::Closed => false,
        }
    }

    pub fn snapshot_at(&self, now: Instant) -> BreakerSnapshot {
        let mut st = self.state.write();
        self.refresh(&mut st, now);
        BreakerSnapshot {
            state: st.state,
            in_state_for: now.saturating_duration_since(st.entered_at),
            open_duration: st.open_duration,
            open_generation: st.open_generation,
        }
    }

    /// Calls an async operation through the circuit breaker
    ///
    /// If the circuit refuses the call, returns `CircuitOpenError` immediately.
    /// Otherwise, executes the operation and tracks its success/failure.
    pub async fn call<F, Fut, T, E>(&self, f: F) -> Result<T, CircuitBreakerError<E>>
    where
        F: FnOnce() -> Fut,
        Fut: std::future::Future<Output = Result<T, E>>,
        E: std::fmt::Debug,
    {
        if !self.allow_request() {
            tracing::warn!(circuit = %self.name, "Circuit breaker preventing call to service");
            return Err(CircuitBreakerError::CircuitOpen(CircuitOpenError {
                service_name: self.name.clone(),
            }));
        }

        match f().await {
            Ok(result) => {
                tracing::debug!(circuit = %self.name, "Service call succeeded");
                self.record_success();
                Ok(result)
            },
            Err(e) => {
                tracing::warn!(circuit = %self.name, error = ?e, "Service call failed");
                self.record_failure();
                Err(CircuitBreakerError::ServiceError(e))
            },
        }
    }

    fn refresh(&self, st: &mut BreakerState, now: Instant) {
        if st.state == CircuitState::Open && st.open_until.is_some_and(|until| now >= until) {
            tracing::debug!(
                circuit = %self.name,
                elapsed_secs = now.saturating_duration_since(st.entered_at).as_secs(),
                "Circuit transitioning from Open to HalfOpen"
            );
            self.enter_half_open(st, now);
        }
    }

    fn trip(&self, st: &mut BreakerState, now: Instant) {
        st.state = CircuitState::Open;
        st.entered_at = now;
        st.open_until = Some(now + st.open_duration);
        st.failures.clear();
        st.probe_started = None;
        st.open_generation += 1;
        tracing::debug!(
            circuit = %self.name,
            generation = st.open_generation,
            open_duration_secs = st.open_duration.as_secs_f64(),
            "Circuit opened"
        );
    }

    #[allow(clippy::unused_self)]
    fn enter_half_open(&self, st: &mut BreakerState, now: Instant) {
        st.state = CircuitState::HalfOpen;
        st.entered_at = now;
        st.open_until = None;
        st.probe_started = None;
    }
}

impl CircuitBreakerPort for CircuitBreaker {
    fn state(&self) -> CircuitState {
        Self::state(self)
    }

    fn allow_request(&self) -> bool {
        Self::allow_request(self)
    }

    fn record_success(&self) {
        Self::record_success(self);
    }

    fn record_failure(&self) {
        Self::record_failure(self);
    }

    fn snapshot(&self) -> BreakerSnapshot {
        self.snapshot_at(Instant::now())
    }

    fn force_half_open(&self) -> Result<(), ApplicationError> {
        if Self::force_half_open(self) {
            Ok(())
        } else {
            Err(ApplicationError::RecoveryAction(format!(
                "circuit '{}' is not open",
                self.name
            )))
        }
    }
}

/// Error type for circuit breaker operations
#[derive(Debug)]
pub enum CircuitBreakerError<E> {
    /// The circuit is open, preventing the call
    CircuitOpen(CircuitOpenError),
    /// The underlying service returned an error
    ServiceError(E),
}

impl<E: std::fmt::Display> std::fmt::Display for CircuitBreakerError<E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::CircuitOpen(e) => write!(f, "{e}"),
            Self::ServiceError(e) => write!(f, "{e}"),
        }
    }
}

impl<E: std::error::Error + 'static> std::error::Error for CircuitBreakerError<E> {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::CircuitOpen(e) => Some(e),
            Self::ServiceError(e) => Some(e),
        }
    }
}

impl<E> CircuitBreakerError<E> {
    /// Returns true if this is a circuit open error
    #[must_use]
    pub const fn is_circuit_open(&self) -> bool {
        matches!(self, Self::CircuitOpen(_))
    }

    /// Returns true if this is a service error
    #[must_use]
    pub const fn is_service_error(&self) -> bool {
        matches!(self, Self::ServiceError(_))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn breaker(threshold: u32) -> CircuitBreaker {
        CircuitBreaker::with_config(
            "model-loader",
            CircuitBreakerConfig::custom(threshold, Duration::from_secs(30), Duration::from_secs(5))
                .with_backoff(2.0, Duration::from_secs(20)),
        )
    }

    fn secs(n: u64) -> Duration {
        Duration::from_secs(n)
    }

    #[test]
    fn initial_state_is_closed() {
        let cb = CircuitBreaker::new("test");
        assert_eq!(cb.state(), CircuitState::Closed);
        assert!(cb.allow_request());
    }

    #[test]
    fn circuit_breaker_debug() {
        let cb = CircuitBreaker::new("test");
        let debug = format!("{cb:?}");
        assert!(debug.contains("CircuitBreaker"));
        assert!(debug.contains("test"));
    }

    #[test]
    fn opens_exactly_at_threshold() {
        let cb = breaker(3);
        let t0 = Instant::now();
        cb.record_failure_at(t0);
        cb.record_failure_at(t0 + secs(1));
        assert_eq!(cb.state_at(t0 + secs(1)), CircuitState::Closed);
        cb.record_failure_at(t0 + secs(2));
        assert_eq!(cb.state_at(t0 + secs(2)), CircuitState::Open);
        assert_eq!(cb.snapshot_at(t0 + secs(2)).open_generation, 1);
    }

    #[test]
    fn failures_outside_window_do_not_count() {
        let cb = breaker(3);
        let t0 = Instant::now();
        cb.record_failure_at(t0);
        cb.record_failure_at(t0 + secs(1));
        cb.record_failure_at(t0 + secs(40));
        assert_eq!(cb.state_at(t0 + secs(40)), CircuitState::Closed);
    }

    #[test]
    fn half_open_only_after_cooldown() {
        let cb = breaker(1);
        let t0 = Instant::now();
        cb.record_failure_at(t0);
        assert!(!cb.allow_request_at(t0 + secs(4)));
        assert_eq!(cb.state_at(t0 + secs(4)), CircuitState::Open);
        assert_eq!(cb.state_at(t0 + secs(5)), CircuitState::HalfOpen);
    }

    #[test]
    fn half_open_admits_a_single_probe() {
        let cb = breaker(1);
        let t0 = Instant::now();
        cb.record_failure_at(t0);
        let t = t0 + secs(5);
        assert!(cb.allow_request_at(t));
        assert!(!cb.allow_request_at(t));
        assert!(!cb.allow_request_at(t + secs(1)));
    }

    #[test]
    fn successful_probe_closes_and_resets_backoff() {
        let cb = breaker(1);
        let t0 = Instant::now();
        cb.record_failure_at(t0);
        cb.record_failure_at(t0 + secs(5));
        assert_eq!(cb.snapshot_at(t0 + secs(5)).open_duration, secs(10));

        let t = t0 + secs(15);
        assert!(cb.allow_request_at(t));
        cb.record_success_at(t);
        let snap = cb.snapshot_at(t);
        assert_eq!(snap.state, CircuitState::Closed);
        assert_eq!(snap.open_duration, secs(5));
    }

    #[test]
    fn failed_probe_backs_off_until_capped() {
        let cb = breaker(1);
        let mut now = Instant::now();
        cb.record_failure_at(now);
        let mut last = cb.snapshot_at(now).open_duration;
        let mut seen = vec![last];
        for _ in 0..5 {
            now += last;
            assert_eq!(cb.state_at(now), CircuitState::HalfOpen);
            cb.record_failure_at(now);
            last = cb.snapshot_at(now).open_duration;
            seen.push(last);
        }
        assert_eq!(seen, vec![secs(5), secs(10), secs(20), secs(20), secs(20), secs(20)]);
    }

    #[test]
    fn force_half_open_only_from_open() {
        let cb = breaker(1);
        let t0 = Instant::now();
        assert!(!cb.force_half_open_at(t0));
        cb.record_failure_at(t0);
        assert!(cb.force_half_open_at(t0 + secs(1)));
        assert_eq!(cb.state_at(t0 + secs(1)), CircuitState::HalfOpen);
        assert!(CircuitBreakerPort::force_half_open(&cb).is_ok());
    }

    #[test]
    fn abandoned_probe_lease_expires() {
        let cb = breaker(1);
        let t0 = Instant::now();
        cb.record_failure_at(t0);
        assert!(cb.allow_request_at(t0 + secs(5)));
        assert!(cb.allow_request_at(t0 + secs(10)));
    }

    #[test]
    fn snapshot_reports_time_in_state() {
        let cb = breaker(1);
        let t0 = Instant::now();
        cb.record_failure_at(t0);
        let snap = cb.snapshot_at(t0 + secs(3));
        assert_eq!(snap.state, CircuitState::Open);
        assert_eq!(snap.in_state_for, secs(3));
    }

    #[test]
    fn circuit_open_error_display() {
        let err = CircuitOpenError {
            service_name: "my-service".to_string(),
        };
        assert!(err.to_string().contains("my-service"));
        assert!(err.to_string().contains("temporarily unavailable"));
    }

    #[test]
    fn config_presets() {
        assert_eq!(CircuitBreakerConfig::default().failure_threshold, 5);
        assert_eq!(CircuitBreakerConfig::sensitive().failure_threshold, 3);
        assert_eq!(CircuitBreakerConfig::resilient().failure_threshold, 10);
    }

    #[tokio::test]
    async fn call_succeeds_when_closed() {
        let cb = CircuitBreaker::new("test");
        let result = cb
            .call(|| async { Ok::<_, std::io::Error>("success") })
            .await;
        assert_eq!(result.unwrap(), "success");
    }

    #[tokio::test]
    async fn call_fails_fast_when_open() {
        let cb = breaker(2);
        for _ in 0..2 {
            let result = cb
                .call(|| async { Err::<(), _>(std::io::Error::other("fail")) })
                .await;
            assert!(result.unwrap_err().is_service_error());
        }
        let result = cb.call(|| async { Ok::<_, std::io::Error>(()) }).await;
        assert!(result.unwrap_err().is_circuit_open());
    }
}
