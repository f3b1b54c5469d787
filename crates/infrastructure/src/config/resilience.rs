//! Resilience configurations: circuit breaker, retry escalation, recovery.

use std::time::Duration;

use serde::{Deserialize, Serialize};

use super::default_true;
use crate::adapters::CircuitBreakerConfig;
use crate::retry::RetryConfig;

// ==============================
// Circuit Breaker Configuration
// ==============================

/// Circuit breaker guarding the model loader
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CircuitBreakerAppConfig {
    /// Failures within the window that open the circuit (default: 5)
    #[serde(default = "default_failure_threshold")]
    pub failure_threshold: u32,

    /// Rolling failure window in seconds (default: 60)
    #[serde(default = "default_failure_window")]
    pub failure_window_secs: u64,

    /// Base time spent OPEN before a probe in seconds (default: 30)
    #[serde(default = "default_open_duration")]
    pub open_duration_secs: u64,

    /// Growth factor applied after a failed probe (default: 2.0)
    #[serde(default = "default_backoff_factor")]
    pub backoff_factor: f64,

    /// Upper bound on the open duration in seconds (default: 300)
    #[serde(default = "default_max_open_duration")]
    pub max_open_duration_secs: u64,
}

const fn default_failure_threshold() -> u32 {
    5
}

const fn default_failure_window() -> u64 {
    60
}

const fn default_open_duration() -> u64 {
    30
}

const fn default_backoff_factor() -> f64 {
    2.0
}

const fn default_max_open_duration() -> u64 {
    300
}

impl Default for CircuitBreakerAppConfig {
    fn default() -> Self {
        Self {
            failure_threshold: default_failure_threshold(),
            failure_window_secs: default_failure_window(),
            open_duration_secs: default_open_duration(),
            backoff_factor: default_backoff_factor(),
            max_open_duration_secs: default_max_open_duration(),
        }
    }
}

impl CircuitBreakerAppConfig {
    pub fn to_circuit_breaker_config(&self) -> CircuitBreakerConfig {
        CircuitBreakerConfig::custom(
            self.failure_threshold,
            Duration::from_secs(self.failure_window_secs),
            Duration::from_secs(self.open_duration_secs),
        )
        .with_backoff(
            self.backoff_factor,
            Duration::from_secs(self.max_open_duration_secs),
        )
    }
}

// ==============================
// Retry Configuration
// ==============================

/// Retry escalation for the telemetry upstream and cache
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RetryAppConfig {
    /// Initial delay before first retry in milliseconds (default: 100ms)
    #[serde(default = "default_retry_initial_delay")]
    pub initial_delay_ms: u64,

    /// Maximum delay between retries in milliseconds (default: 10000ms = 10s)
    #[serde(default = "default_retry_max_delay")]
    pub max_delay_ms: u64,

    /// Multiplier for exponential backoff (default: 2.0)
    #[serde(default = "default_retry_multiplier")]
    pub multiplier: f64,

    /// Maximum number of retry attempts (default: 3)
    #[serde(default = "default_retry_max_retries")]
    pub max_retries: u32,

    #[serde(default = "default_true")]
    pub jitter_enabled: bool,

    #[serde(default = "default_jitter_factor")]
    pub jitter_factor: f64,

    /// Outcomes kept in the sliding window (default: 10)
    #[serde(default = "default_window_size")]
    pub window_size: usize,

    /// Failures in the window above which retries escalate (default: 3)
    #[serde(default = "default_elevated_threshold")]
    pub elevated_threshold: usize,

    /// Consecutive successes needed to return to NORMAL (default: 3)
    #[serde(default = "default_recovery_streak")]
    pub recovery_streak: u32,
}

const fn default_retry_initial_delay() -> u64 {
    100
}

const fn default_retry_max_delay() -> u64 {
    10_000
}

const fn default_retry_multiplier() -> f64 {
    2.0
}

const fn default_retry_max_retries() -> u32 {
    3
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

impl Default for RetryAppConfig {
    fn default() -> Self {
        Self {
            initial_delay_ms: default_retry_initial_delay(),
            max_delay_ms: default_retry_max_delay(),
            multiplier: default_retry_multiplier(),
            max_retries: default_retry_max_retries(),
            jitter_enabled: true,
            jitter_factor: default_jitter_factor(),
            window_size: default_window_size(),
            elevated_threshold: default_elevated_threshold(),
            recovery_streak: default_recovery_streak(),
        }
    }
}

impl RetryAppConfig {
    /// Convert to `retry::RetryConfig` for use with retry operations
    #[must_use]
    pub const fn to_retry_config(&self) -> RetryConfig {
        let mut config = RetryConfig::new(
            self.initial_delay_ms,
            self.max_delay_ms,
            self.multiplier,
            self.max_retries,
        )
        .with_escalation(
            self.window_size,
            self.elevated_threshold,
            self.recovery_streak,
        );
        config.jitter_enabled = self.jitter_enabled;
        config.jitter_factor = self.jitter_factor;
        config
    }
}

// ==============================
// Recovery Configuration
// ==============================

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecoveryAppConfig {
    #[serde(default = "default_tick_interval")]
    pub tick_interval_secs: u64,

    /// How long the breaker may stay OPEN before a restart (default: 10)
    #[serde(default = "default_breaker_grace")]
    pub breaker_grace_secs: u64,

    /// How long retries may stay ELEVATED before a cache purge (default: 5)
    #[serde(default = "default_retry_grace")]
    pub retry_grace_secs: u64,

    #[serde(default = "default_max_log_entries")]
    pub max_log_entries: usize,
}

const fn default_tick_interval() -> u64 {
    1
}

const fn default_breaker_grace() -> u64 {
    10
}

const fn default_retry_grace() -> u64 {
    5
}

const fn default_max_log_entries() -> usize {
    application::services::DEFAULT_MAX_LOG_ENTRIES
}

impl Default for RecoveryAppConfig {
    fn default() -> Self {
        Self {
            tick_interval_secs: default_tick_interval(),
            breaker_grace_secs: default_breaker_grace(),
            retry_grace_secs: default_retry_grace(),
            max_log_entries: default_max_log_entries(),
        }
    }
}

impl RecoveryAppConfig {
    pub fn to_recovery_config(&self) -> application::RecoveryConfig {
        application::RecoveryConfig {
            tick_interval: Duration::from_secs(self.tick_interval_secs.max(1)),
            breaker_grace: Duration::from_secs(self.breaker_grace_secs),
            retry_grace: Duration::from_secs(self.retry_grace_secs),
            max_log_entries: self.max_log_entries.max(1),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn breaker_defaults_convert() {
        let config = CircuitBreakerAppConfig::default().to_circuit_breaker_config();
        assert_eq!(config, CircuitBreakerConfig::default());
    }

    #[test]
    fn retry_conversion_keeps_escalation() {
        let app = RetryAppConfig {
            elevated_threshold: 7,
            jitter_enabled: false,
            ..Default::default()
        };
        let config = app.to_retry_config();
        assert_eq!(config.elevated_threshold, 7);
        assert!(!config.jitter_enabled);
        assert_eq!(config.window_size, 10);
    }

    #[test]
    fn recovery_conversion_clamps_zero_values() {
        let app = RecoveryAppConfig {
            tick_interval_secs: 0,
            max_log_entries: 0,
            ..Default::default()
        };
        let config = app.to_recovery_config();
        assert_eq!(config.tick_interval, Duration::from_secs(1));
        assert_eq!(config.max_log_entries, 1);
        assert_eq!(config.breaker_grace, Duration::from_secs(10));
    }
}
