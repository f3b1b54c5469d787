//! Host resource probe port

#[cfg(test)]
use mockall::automock;

use domain::ResourceMetrics;

use crate::error::ApplicationError;

#[cfg_attr(test, automock)]
pub trait ResourceProbePort: Send + Sync {
    /// Take one reading of CPU, memory, disk and process usage
    fn sample(&self) -> Result<ResourceMetrics, ApplicationError>;
}
