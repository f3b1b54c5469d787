//! Cache purge port
//!
//! The recovery orchestrator clears the downstream telemetry cache through
//! this port when retries stay elevated.

use async_trait::async_trait;
#[cfg(test)]
use mockall::automock;

use crate::error::ApplicationError;

#[cfg_attr(test, automock)]
#[async_trait]
pub trait CachePurgePort: Send + Sync {
    /// Remove every cached entry, returning how many were dropped
    async fn purge(&self) -> Result<u64, ApplicationError>;
}
