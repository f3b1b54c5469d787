//! Application configuration
//!
//! Split into focused sub-modules by domain:
//! - `server`: HTTP server and logging settings
//! - `resilience`: Circuit breaker, retry escalation, recovery
//! - `cluster`: Membership, heartbeats, peers
//! - `chaos`: Chaos harness target and timing
//! - `resources`: Host resource thresholds
//! - `cache`: Telemetry cache and probed dependencies

mod cache;
mod chaos;
mod cluster;
mod resilience;
mod resources;
mod server;

use std::path::Path;

use serde::{Deserialize, Serialize};

pub use cache::{CacheAppConfig, DependenciesAppConfig};
pub use chaos::ChaosAppConfig;
pub use cluster::ClusterAppConfig;
pub use resilience::{CircuitBreakerAppConfig, RecoveryAppConfig, RetryAppConfig};
pub use resources::ResourcesAppConfig;
pub use server::ServerConfig;

/// Prefix of environment overrides, e.g. `ASTRAGUARD_SERVER__PORT`
pub const ENV_PREFIX: &str = "ASTRAGUARD";

/// Shared default for boolean `true` fields across config structs
pub(crate) const fn default_true() -> bool {
    true
}

/// Main application configuration
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AppConfig {
    #[serde(default)]
    pub server: ServerConfig,

    #[serde(default)]
    pub circuit_breaker: CircuitBreakerAppConfig,

    #[serde(default)]
    pub retry: RetryAppConfig,

    #[serde(default)]
    pub recovery: RecoveryAppConfig,

    #[serde(default)]
    pub cluster: ClusterAppConfig,

    #[serde(default)]
    pub chaos: ChaosAppConfig,

    #[serde(default)]
    pub resources: ResourcesAppConfig,

    #[serde(default)]
    pub cache: CacheAppConfig,

    #[serde(default)]
    pub dependencies: DependenciesAppConfig,
}

impl AppConfig {
    /// Load configuration from `config.toml` (optional) and environment
    pub fn load() -> Result<Self, config::ConfigError> {
        Self::build(config::File::with_name("config").required(false))
    }

    /// Load configuration from an explicit file, then environment
    pub fn load_from(path: impl AsRef<Path>) -> Result<Self, config::ConfigError> {
        Self::build(config::File::from(path.as_ref()).required(true))
    }

    fn build<S>(file: S) -> Result<Self, config::ConfigError>
    where
        S: config::Source + Send + Sync + 'static,
    {
        let builder = config::Config::builder()
            .add_source(file)
            // Override with environment variables (e.g., ASTRAGUARD_SERVER__PORT)
            .add_source(
                config::Environment::with_prefix(ENV_PREFIX)
                    .prefix_separator("_")
                    .separator("__")
                    .list_separator(",")
                    .with_list_parse_key("cluster.peers")
                    .try_parsing(true),
            );

        let config = builder.build()?;
        config.try_deserialize()
    }
}
