//! Resource monitoring service
//!
//! Samples host and process resource usage through a probe, keeps a bounded
//! history and classifies readings against warning/critical thresholds.
//! Constructed once at process start and shared by `Arc`.

use std::collections::VecDeque;
use std::sync::Arc;

use domain::{ResourceMetrics, ResourceStatus, ResourceSummary, ResourceThresholds};
use parking_lot::Mutex;
use serde::Serialize;
use tracing::warn;

use crate::ports::ResourceProbePort;

/// Default number of samples kept
pub const DEFAULT_HISTORY_SIZE: usize = 100;

/// Per-resource status of the latest reading
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ResourceHealth {
    pub cpu: ResourceStatus,
    pub memory: ResourceStatus,
    pub disk: ResourceStatus,
}

impl ResourceHealth {
    /// Worst of the three statuses
    #[must_use]
    pub fn overall(&self) -> ResourceStatus {
        self.cpu.max(self.memory).max(self.disk)
    }
}

pub struct ResourceMonitor {
    probe: Arc<dyn ResourceProbePort>,
    thresholds: ResourceThresholds,
    history_size: usize,
    enabled: bool,
    history: Mutex<VecDeque<ResourceMetrics>>,
}

impl std::fmt::Debug for ResourceMonitor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ResourceMonitor")
            .field("thresholds", &self.thresholds)
            .field("history_size", &self.history_size)
            .field("enabled", &self.enabled)
            .finish_non_exhaustive()
    }
}

impl ResourceMonitor {
    pub fn new(
        probe: Arc<dyn ResourceProbePort>,
        thresholds: ResourceThresholds,
        history_size: usize,
    ) -> Self {
        Self {
            probe,
            thresholds,
            history_size: history_size.max(1),
            enabled: true,
            history: Mutex::new(VecDeque::new()),
        }
    }

    /// Enable or disable sampling
    #[must_use]
    pub const fn with_enabled(mut self, enabled: bool) -> Self {
        self.enabled = enabled;
        self
    }

    #[must_use]
    pub const fn is_enabled(&self) -> bool {
        self.enabled
    }

    #[must_use]
    pub const fn thresholds(&self) -> &ResourceThresholds {
        &self.thresholds
    }

    /// Sample the probe and append to history
    ///
    /// Disabled monitors return zeroed metrics without sampling. A failing
    /// probe also yields zeroed metrics, which are not recorded.
    pub fn current_metrics(&self) -> ResourceMetrics {
        if !self.enabled {
            return ResourceMetrics::zeroed();
        }
        match self.probe.sample() {
            Ok(metrics) => {
                let mut history = self.history.lock();
                if history.len() >= self.history_size {
                    history.pop_front();
                }
                history.push_back(metrics);
                metrics
            },
            Err(e) => {
                warn!(error = %e, "Resource sampling failed");
                ResourceMetrics::zeroed()
            },
        }
    }

    /// Classify a fresh reading
    pub fn check_health(&self) -> ResourceHealth {
        let metrics = self.current_metrics();
        self.classify(&metrics)
    }

    /// Classify an existing reading
    pub fn classify(&self, metrics: &ResourceMetrics) -> ResourceHealth {
        ResourceHealth {
            cpu: self.thresholds.cpu_status(metrics),
            memory: self.thresholds.memory_status(metrics),
            disk: self.thresholds.disk_status(metrics),
        }
    }

    /// False iff any resource is critical
    pub fn is_available(&self) -> bool {
        self.check_health().overall() != ResourceStatus::Critical
    }

    /// Averages and maxima over the recorded history
    pub fn summary(&self) -> ResourceSummary {
        ResourceSummary::from_samples(self.history.lock().iter())
    }

    pub fn history_len(&self) -> usize {
        self.history.lock().len()
    }
}
