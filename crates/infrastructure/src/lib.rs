//! Infrastructure layer - Adapters for external systems
//!
//! Implements ports defined in the application layer: the circuit breaker
//! and retry policy, cluster consensus, the fault switchboard, the telemetry
//! cache, HTTP probe clients, `/proc` sampling, configuration and logging.

pub mod adapters;
pub mod cache;
pub mod chaos;
pub mod cluster;
pub mod config;
pub mod http;
pub mod metrics;
pub mod retry;
pub mod telemetry;

pub use adapters::*;
pub use cache::{CacheStats, TelemetryCache, TelemetryCacheConfig};
pub use chaos::{FaultInjector, FaultSwitchboard, GuardedCachePurge, GuardedDependency};
pub use cluster::{ConsensusConfig, ConsensusModule, PeerHeartbeatClient};
pub use config::{AppConfig, ServerConfig};
pub use http::{CorrelatedClientConfig, CorrelatedConnector, CorrelatedHttpClient, X_REQUEST_ID};
pub use metrics::{MetricsRegistry, RecoveryObservations};
pub use retry::{RetryConfig, RetryPolicy, RetryResult, Retryable, with_retry};
pub use telemetry::{LogFormat, TelemetryError, init_logging};
