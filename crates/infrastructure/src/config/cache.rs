//! Telemetry cache and dependency configuration.

use std::path::PathBuf;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::adapters::TelemetryUpstreamConfig;
use crate::cache::TelemetryCacheConfig;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CacheAppConfig {
    #[serde(default = "default_max_capacity")]
    pub max_capacity: u64,

    /// TTL for cached telemetry frames (default: 5 minutes)
    #[serde(default = "default_ttl")]
    pub ttl_secs: u64,
}

const fn default_max_capacity() -> u64 {
    10_000
}

const fn default_ttl() -> u64 {
    5 * 60 // 5 minutes
}

impl Default for CacheAppConfig {
    fn default() -> Self {
        Self {
            max_capacity: default_max_capacity(),
            ttl_secs: default_ttl(),
        }
    }
}

impl CacheAppConfig {
    pub const fn to_cache_config(&self) -> TelemetryCacheConfig {
        TelemetryCacheConfig {
            max_capacity: self.max_capacity,
            ttl: Duration::from_secs(self.ttl_secs),
        }
    }
}

/// Dependencies probed by the service
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DependenciesAppConfig {
    /// Model artifact checked by the model loader; in-process when unset
    #[serde(default)]
    pub model_path: Option<PathBuf>,

    /// Upstream telemetry feed; simulated when unset
    #[serde(default)]
    pub upstream_url: Option<String>,

    #[serde(default = "default_upstream_timeout")]
    pub upstream_timeout_ms: u64,

    /// Interval between dependency probes (default: 1000)
    #[serde(default = "default_probe_interval")]
    pub probe_interval_ms: u64,
}

const fn default_upstream_timeout() -> u64 {
    2000
}

const fn default_probe_interval() -> u64 {
    1000
}

impl Default for DependenciesAppConfig {
    fn default() -> Self {
        Self {
            model_path: None,
            upstream_url: None,
            upstream_timeout_ms: default_upstream_timeout(),
            probe_interval_ms: default_probe_interval(),
        }
    }
}

impl DependenciesAppConfig {
    pub fn to_upstream_config(&self) -> TelemetryUpstreamConfig {
        TelemetryUpstreamConfig {
            url: self.upstream_url.clone(),
            timeout: Duration::from_millis(self.upstream_timeout_ms.max(1)),
        }
    }

    pub fn probe_interval(&self) -> Duration {
        Duration::from_millis(self.probe_interval_ms.max(10))
    }
}
