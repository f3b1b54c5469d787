//! Cache implementations
//!
//! `TelemetryCache` is the downstream cache the recovery orchestrator purges
//! when retries stay elevated.

mod moka_cache;

pub use moka_cache::{CacheStats, TelemetryCache, TelemetryCacheConfig};
