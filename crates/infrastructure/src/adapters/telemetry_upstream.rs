//! Telemetry upstream dependency
//!
//! Fetches the latest frame from the upstream telemetry feed and keeps it in
//! the downstream cache. Without a configured URL the feed is simulated and
//! every fetch succeeds.

use std::sync::Arc;
use std::time::Duration;

use application::{ApplicationError, DependencyPort};
use async_trait::async_trait;
use reqwest::Client;
use tracing::{debug, instrument};

use crate::cache::TelemetryCache;

/// Cache key holding the most recent upstream frame
pub const LATEST_FRAME_KEY: &str = "telemetry:latest";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TelemetryUpstreamConfig {
    pub url: Option<String>,
    pub timeout: Duration,
}

impl Default for TelemetryUpstreamConfig {
    fn default() -> Self {
        Self {
            url: None,
            timeout: Duration::from_secs(2),
        }
    }
}

#[derive(Debug, Clone)]
pub struct TelemetryUpstreamAdapter {
    client: Client,
    config: TelemetryUpstreamConfig,
    cache: Arc<TelemetryCache>,
}

impl TelemetryUpstreamAdapter {
    pub fn new(
        config: TelemetryUpstreamConfig,
        cache: Arc<TelemetryCache>,
    ) -> Result<Self, ApplicationError> {
        let client = Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(|e| ApplicationError::Configuration(e.to_string()))?;
        Ok(Self {
            client,
            config,
            cache,
        })
    }

    #[instrument(skip(self))]
    async fn fetch(&self, url: &str) -> Result<Vec<u8>, ApplicationError> {
        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| ApplicationError::Transport(e.to_string()))?;
        if !response.status().is_success() {
            return Err(ApplicationError::Transport(format!(
                "upstream returned {}",
                response.status()
            )));
        }
        let body = response
            .bytes()
            .await
            .map_err(|e| ApplicationError::Transport(e.to_string()))?;
        Ok(body.to_vec())
    }
}

#[async_trait]
impl DependencyPort for TelemetryUpstreamAdapter {
    fn name(&self) -> &'static str {
        "telemetry_upstream"
    }

    async fn check(&self) -> Result<(), ApplicationError> {
        let frame = match &self.config.url {
            Some(url) => self.fetch(url).await?,
            None => chrono::Utc::now().to_rfc3339().into_bytes(),
        };
        debug!(bytes = frame.len(), "Upstream frame fetched");
        self.cache.insert(LATEST_FRAME_KEY, frame).await;
        Ok(())
    }
}
