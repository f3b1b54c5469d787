//! Chaos harness configuration.

use std::time::Duration;

use application::ChaosConfig;
use serde::{Deserialize, Serialize};

use crate::http::CorrelatedClientConfig;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChaosAppConfig {
    /// Service under test
    #[serde(default = "default_base_url")]
    pub base_url: String,

    #[serde(default = "default_poll_interval")]
    pub poll_interval_ms: u64,

    /// Recovery deadline after the fault window (default: 30)
    #[serde(default = "default_recovery_timeout")]
    pub recovery_timeout_secs: u64,

    /// Per-request timeout of the probe client (default: 10)
    #[serde(default = "default_request_timeout")]
    pub request_timeout_secs: u64,

    /// Fault duration used by the scenarios (default: 10)
    #[serde(default = "default_duration")]
    pub default_duration_secs: u64,
}

fn default_base_url() -> String {
    application::DEFAULT_BASE_URL.to_string()
}

const fn default_poll_interval() -> u64 {
    500
}

const fn default_recovery_timeout() -> u64 {
    30
}

const fn default_request_timeout() -> u64 {
    10
}

const fn default_duration() -> u64 {
    10
}

impl Default for ChaosAppConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            poll_interval_ms: default_poll_interval(),
            recovery_timeout_secs: default_recovery_timeout(),
            request_timeout_secs: default_request_timeout(),
            default_duration_secs: default_duration(),
        }
    }
}

impl ChaosAppConfig {
    pub fn to_chaos_config(&self) -> ChaosConfig {
        ChaosConfig {
            base_url: self.base_url.trim_end_matches('/').to_string(),
            poll_interval: Duration::from_millis(self.poll_interval_ms.max(1)),
            recovery_timeout: Duration::from_secs(self.recovery_timeout_secs),
            default_duration_secs: self.default_duration_secs,
        }
    }

    pub fn to_client_config(&self) -> CorrelatedClientConfig {
        CorrelatedClientConfig::default()
            .with_timeout(Duration::from_secs(self.request_timeout_secs.max(1)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_harness_defaults() {
        assert_eq!(ChaosAppConfig::default().to_chaos_config(), ChaosConfig::default());
    }

    #[test]
    fn trailing_slash_is_trimmed() {
        let config = ChaosAppConfig {
            base_url: "http://astra-1:8000/".to_string(),
            ..Default::default()
        };
        assert_eq!(config.to_chaos_config().base_url, "http://astra-1:8000");
    }
}
