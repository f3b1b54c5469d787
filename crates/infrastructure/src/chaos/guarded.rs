//! Dependency decorators that observe engaged faults

use std::sync::Arc;

use application::{ApplicationError, CachePurgePort, DependencyPort};
use async_trait::async_trait;
use domain::FaultType;

use super::FaultInjector;

/// A dependency that fails while its fault is engaged
pub struct GuardedDependency {
    inner: Arc<dyn DependencyPort>,
    fault_type: FaultType,
    injector: FaultInjector,
}

impl std::fmt::Debug for GuardedDependency {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GuardedDependency")
            .field("name", &self.inner.name())
            .field("fault_type", &self.fault_type)
            .finish_non_exhaustive()
    }
}

impl GuardedDependency {
    pub fn new(inner: Arc<dyn DependencyPort>, fault_type: FaultType, injector: FaultInjector) -> Self {
        Self {
            inner,
            fault_type,
            injector,
        }
    }
}

#[async_trait]
impl DependencyPort for GuardedDependency {
    fn name(&self) -> &'static str {
        self.inner.name()
    }

    async fn check(&self) -> Result<(), ApplicationError> {
        self.injector.intercept(self.fault_type).await?;
        self.inner.check().await
    }
}

/// Cache purge that fails while the cache fault is engaged
pub struct GuardedCachePurge {
    inner: Arc<dyn CachePurgePort>,
    injector: FaultInjector,
}

impl std::fmt::Debug for GuardedCachePurge {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GuardedCachePurge").finish_non_exhaustive()
    }
}

impl GuardedCachePurge {
    pub fn new(inner: Arc<dyn CachePurgePort>, injector: FaultInjector) -> Self {
        Self { inner, injector }
    }
}

#[async_trait]
impl CachePurgePort for GuardedCachePurge {
    async fn purge(&self) -> Result<u64, ApplicationError> {
        self.injector
            .intercept(FaultType::RedisFailure)
            .await
            .map_err(|e| ApplicationError::RecoveryAction(e.to_string()))?;
        self.inner.purge().await
    }
}
