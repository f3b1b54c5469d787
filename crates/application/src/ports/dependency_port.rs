//! Guarded dependency port
//!
//! A dependency whose reachability is probed periodically and fed into the
//! breaker or retry policy guarding it.

use async_trait::async_trait;
#[cfg(test)]
use mockall::automock;

use crate::error::ApplicationError;

#[cfg_attr(test, automock)]
#[async_trait]
pub trait DependencyPort: Send + Sync {
    /// Short name used in logs
    fn name(&self) -> &'static str;

    /// Perform one lightweight call against the dependency
    async fn check(&self) -> Result<(), ApplicationError>;
}
