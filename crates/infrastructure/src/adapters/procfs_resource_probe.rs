//! Host resource probe reading `/proc`
//!
//! CPU is the 1-minute load average relative to the number of available
//! cores; memory comes from `MemTotal`/`MemAvailable`; process memory from
//! `VmRSS`. Disk usage is not read from `/proc` and is reported as 0.

use std::path::PathBuf;

use application::{ApplicationError, ResourceProbePort};
use chrono::Utc;
use domain::ResourceMetrics;

#[derive(Debug, Clone)]
pub struct ProcfsResourceProbe {
    root: PathBuf,
    cores: usize,
}

impl Default for ProcfsResourceProbe {
    fn default() -> Self {
        Self::new("/proc")
    }
}

impl ProcfsResourceProbe {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        let cores = std::thread::available_parallelism().map_or(1, std::num::NonZeroUsize::get);
        Self {
            root: root.into(),
            cores,
        }
    }

    #[must_use]
    pub const fn with_cores(mut self, cores: usize) -> Self {
        self.cores = cores;
        self
    }

    fn read(&self, relative: &str) -> Result<String, ApplicationError> {
        let path = self.root.join(relative);
        std::fs::read_to_string(&path)
            .map_err(|e| ApplicationError::Internal(format!("{}: {e}", path.display())))
    }
}

/// First field of `/proc/loadavg`
fn parse_loadavg(text: &str) -> Option<f64> {
    text.split_whitespace().next()?.parse().ok()
}

/// Value in kB of `key` in a `/proc/meminfo`-style file
fn parse_kb(text: &str, key: &str) -> Option<f64> {
    text.lines()
        .find_map(|line| line.strip_prefix(key)?.strip_prefix(':'))
        .and_then(|rest| rest.split_whitespace().next())
        .and_then(|v| v.parse().ok())
}

impl ResourceProbePort for ProcfsResourceProbe {
    #[allow(clippy::cast_precision_loss)]
    fn sample(&self) -> Result<ResourceMetrics, ApplicationError> {
        let load = parse_loadavg(&self.read("loadavg")?)
            .ok_or_else(|| ApplicationError::Internal("malformed loadavg".into()))?;
        let cpu_percent = (load / self.cores.max(1) as f64 * 100.0).clamp(0.0, 100.0);

        let meminfo = self.read("meminfo")?;
        let total_kb = parse_kb(&meminfo, "MemTotal")
            .ok_or_else(|| ApplicationError::Internal("meminfo lacks MemTotal".into()))?;
        let available_kb = parse_kb(&meminfo, "MemAvailable").unwrap_or(0.0);
        let memory_percent = if total_kb > 0.0 {
            ((total_kb - available_kb) / total_kb * 100.0).clamp(0.0, 100.0)
        } else {
            0.0
        };

        let process_memory_mb = self
            .read("self/status")
            .ok()
            .and_then(|status| parse_kb(&status, "VmRSS"))
            .map_or(0.0, |kb| kb / 1024.0);

        Ok(ResourceMetrics {
            cpu_percent,
            memory_percent,
            memory_available_mb: available_kb / 1024.0,
            disk_usage_percent: 0.0,
            process_memory_mb,
            timestamp: Utc::now(),
        })
    }
}
