//! Host resource monitoring configuration.

use domain::ResourceThresholds;
use serde::{Deserialize, Serialize};

use super::default_true;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResourcesAppConfig {
    #[serde(default = "default_true")]
    pub enabled: bool,

    /// Samples kept for `summary()` (default: 100)
    #[serde(default = "default_history_size")]
    pub history_size: usize,

    #[serde(default = "default_sample_interval")]
    pub sample_interval_secs: u64,

    #[serde(default)]
    pub thresholds: ResourceThresholds,
}

const fn default_history_size() -> usize {
    application::DEFAULT_HISTORY_SIZE
}

const fn default_sample_interval() -> u64 {
    5
}

impl Default for ResourcesAppConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            history_size: default_history_size(),
            sample_interval_secs: default_sample_interval(),
            thresholds: ResourceThresholds::default(),
        }
    }
}
