//! Infrastructure adapters
//!
//! Adapters connect application ports to concrete implementations.

mod circuit_breaker;
mod model_loader;
mod procfs_resource_probe;
mod telemetry_upstream;

pub use circuit_breaker::{
    CircuitBreaker, CircuitBreakerConfig, CircuitBreakerError, CircuitOpenError,
};
pub use model_loader::ModelLoaderAdapter;
pub use procfs_resource_probe::ProcfsResourceProbe;
pub use telemetry_upstream::{TelemetryUpstreamAdapter, TelemetryUpstreamConfig};
