//! Moka in-memory telemetry cache
//!
//! Holds recently fetched upstream telemetry frames with a cache-level TTL.
//! The recovery orchestrator purges it through [`CachePurgePort`] and the
//! dependency monitor exercises it through [`DependencyPort`].

use std::{
    sync::atomic::{AtomicU64, Ordering},
    time::Duration,
};

use application::{ApplicationError, CachePurgePort, DependencyPort};
use async_trait::async_trait;
use moka::future::Cache;
use serde::Serialize;
use tracing::{debug, info, instrument};

/// Key written by the liveness round trip
const PROBE_KEY: &str = "__probe__";

/// Configuration for the telemetry cache
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TelemetryCacheConfig {
    /// Maximum number of entries
    pub max_capacity: u64,
    /// TTL applied to every entry
    pub ttl: Duration,
}

impl Default for TelemetryCacheConfig {
    fn default() -> Self {
        Self {
            max_capacity: 10_000,
            ttl: Duration::from_secs(300),
        }
    }
}

/// Hit, miss and purge counters
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct CacheStats {
    pub hits: u64,
    pub misses: u64,
    pub entries: u64,
    pub purges: u64,
}

pub struct TelemetryCache {
    cache: Cache<String, Vec<u8>>,
    hits: AtomicU64,
    misses: AtomicU64,
    purges: AtomicU64,
}

impl std::fmt::Debug for TelemetryCache {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TelemetryCache")
            .field("entries", &self.cache.entry_count())
            .field("hits", &self.hits.load(Ordering::Relaxed))
            .field("misses", &self.misses.load(Ordering::Relaxed))
            .finish_non_exhaustive()
    }
}

impl Default for TelemetryCache {
    fn default() -> Self {
        Self::new(TelemetryCacheConfig::default())
    }
}

impl TelemetryCache {
    #[must_use]
    pub fn new(config: TelemetryCacheConfig) -> Self {
        let cache = Cache::builder()
            .max_capacity(config.max_capacity)
            .time_to_live(config.ttl)
            .build();

        Self {
            cache,
            hits: AtomicU64::new(0),
            misses: AtomicU64::new(0),
            purges: AtomicU64::new(0),
        }
    }

    #[instrument(skip(self), level = "debug")]
    pub async fn get(&self, key: &str) -> Option<Vec<u8>> {
        let value = self.cache.get(key).await;
        if value.is_some() {
            self.hits.fetch_add(1, Ordering::Relaxed);
            debug!(key = %key, "Cache hit");
        } else {
            self.misses.fetch_add(1, Ordering::Relaxed);
            debug!(key = %key, "Cache miss");
        }
        value
    }

    #[instrument(skip(self, value), level = "debug")]
    pub async fn insert(&self, key: &str, value: Vec<u8>) {
        self.cache.insert(key.to_string(), value).await;
    }

    pub async fn invalidate(&self, key: &str) {
        self.cache.invalidate(key).await;
    }

    /// Entry count after pending maintenance has run
    pub async fn len(&self) -> u64 {
        self.cache.run_pending_tasks().await;
        self.cache.entry_count()
    }

    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }

    pub fn stats(&self) -> CacheStats {
        CacheStats {
            hits: self.hits.load(Ordering::Relaxed),
            misses: self.misses.load(Ordering::Relaxed),
            entries: self.cache.entry_count(),
            purges: self.purges.load(Ordering::Relaxed),
        }
    }
}

#[async_trait]
impl CachePurgePort for TelemetryCache {
    async fn purge(&self) -> Result<u64, ApplicationError> {
        let dropped = self.len().await;
        self.cache.invalidate_all();
        self.cache.run_pending_tasks().await;
        self.purges.fetch_add(1, Ordering::Relaxed);
        info!(dropped, "Telemetry cache purged");
        Ok(dropped)
    }
}

#[async_trait]
impl DependencyPort for TelemetryCache {
    fn name(&self) -> &'static str {
        "telemetry_cache"
    }

    async fn check(&self) -> Result<(), ApplicationError> {
        self.cache.insert(PROBE_KEY.to_string(), vec![1]).await;
        let round_trip = self.cache.get(PROBE_KEY).await;
        self.cache.invalidate(PROBE_KEY).await;
        match round_trip {
            Some(_) => Ok(()),
            None => Err(ApplicationError::Transport(
                "telemetry cache lost probe entry".to_string(),
            )),
        }
    }
}
