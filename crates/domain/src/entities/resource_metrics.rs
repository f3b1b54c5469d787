//! Host resource readings, thresholds and summaries

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::value_objects::ResourceStatus;

/// One sample of host and process resource usage
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ResourceMetrics {
    pub cpu_percent: f64,
    pub memory_percent: f64,
    pub memory_available_mb: f64,
    pub disk_usage_percent: f64,
    pub process_memory_mb: f64,
    pub timestamp: DateTime<Utc>,
}

impl ResourceMetrics {
    /// All-zero reading, used when monitoring is disabled or sampling failed
    #[must_use]
    pub fn zeroed() -> Self {
        Self {
            cpu_percent: 0.0,
            memory_percent: 0.0,
            memory_available_mb: 0.0,
            disk_usage_percent: 0.0,
            process_memory_mb: 0.0,
            timestamp: Utc::now(),
        }
    }
}

/// Warning and critical percentages per resource
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ResourceThresholds {
    pub cpu_warning: f64,
    pub cpu_critical: f64,
    pub memory_warning: f64,
    pub memory_critical: f64,
    pub disk_warning: f64,
    pub disk_critical: f64,
}

impl Default for ResourceThresholds {
    fn default() -> Self {
        Self {
            cpu_warning: 70.0,
            cpu_critical: 90.0,
            memory_warning: 75.0,
            memory_critical: 90.0,
            disk_warning: 80.0,
            disk_critical: 95.0,
        }
    }
}

impl ResourceThresholds {
    #[must_use]
    pub fn cpu_status(&self, metrics: &ResourceMetrics) -> ResourceStatus {
        ResourceStatus::classify(metrics.cpu_percent, self.cpu_warning, self.cpu_critical)
    }

    #[must_use]
    pub fn memory_status(&self, metrics: &ResourceMetrics) -> ResourceStatus {
        ResourceStatus::classify(
            metrics.memory_percent,
            self.memory_warning,
            self.memory_critical,
        )
    }

    #[must_use]
    pub fn disk_status(&self, metrics: &ResourceMetrics) -> ResourceStatus {
        ResourceStatus::classify(
            metrics.disk_usage_percent,
            self.disk_warning,
            self.disk_critical,
        )
    }
}

/// Aggregates over the sample history
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct ResourceSummary {
    pub count: usize,
    pub cpu_avg: f64,
    pub cpu_max: f64,
    pub memory_avg: f64,
    pub memory_max: f64,
    pub disk_avg: f64,
    pub disk_max: f64,
    pub process_memory_max_mb: f64,
}

impl ResourceSummary {
    /// Summarize a set of samples; an empty set gives a zero-count summary
    #[must_use]
    #[allow(clippy::cast_precision_loss)]
    pub fn from_samples<'a>(samples: impl IntoIterator<Item = &'a ResourceMetrics>) -> Self {
        let mut summary = Self::default();
        let (mut cpu, mut mem, mut disk) = (0.0, 0.0, 0.0);
        for m in samples {
            summary.count += 1;
            cpu += m.cpu_percent;
            mem += m.memory_percent;
            disk += m.disk_usage_percent;
            summary.cpu_max = summary.cpu_max.max(m.cpu_percent);
            summary.memory_max = summary.memory_max.max(m.memory_percent);
            summary.disk_max = summary.disk_max.max(m.disk_usage_percent);
            summary.process_memory_max_mb = summary.process_memory_max_mb.max(m.process_memory_mb);
        }
        if summary.count > 0 {
            let n = summary.count as f64;
            summary.cpu_avg = cpu / n;
            summary.memory_avg = mem / n;
            summary.disk_avg = disk / n;
        }
        summary
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample(cpu: f64, mem: f64, disk: f64) -> ResourceMetrics {
        ResourceMetrics {
            cpu_percent: cpu,
            memory_percent: mem,
            disk_usage_percent: disk,
            ..ResourceMetrics::zeroed()
        }
    }

    #[test]
    fn default_thresholds() {
        let t = ResourceThresholds::default();
        assert!((t.cpu_warning - 70.0).abs() < f64::EPSILON);
        assert!((t.memory_critical - 90.0).abs() < f64::EPSILON);
        assert!((t.disk_critical - 95.0).abs() < f64::EPSILON);
    }

    #[test]
    fn statuses_follow_thresholds() {
        let t = ResourceThresholds::default();
        let m = sample(95.0, 80.0, 10.0);
        assert_eq!(t.cpu_status(&m), ResourceStatus::Critical);
        assert_eq!(t.memory_status(&m), ResourceStatus::Warning);
        assert_eq!(t.disk_status(&m), ResourceStatus::Healthy);
    }

    #[test]
    fn summary_of_empty_history() {
        let summary = ResourceSummary::from_samples(std::iter::empty());
        assert_eq!(summary.count, 0);
        assert!(summary.cpu_avg.abs() < f64::EPSILON);
    }

    #[test]
    fn summary_averages_and_maxima() {
        let samples = [sample(10.0, 20.0, 30.0), sample(30.0, 40.0, 50.0)];
        let summary = ResourceSummary::from_samples(&samples);
        assert_eq!(summary.count, 2);
        assert!((summary.cpu_avg - 20.0).abs() < f64::EPSILON);
        assert!((summary.memory_max - 40.0).abs() < f64::EPSILON);
        assert!((summary.disk_avg - 40.0).abs() < f64::EPSILON);
    }
}
