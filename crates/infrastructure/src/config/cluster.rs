//! Cluster membership configuration.

use std::time::Duration;

use domain::{DomainError, InstanceId};
use serde::{Deserialize, Serialize};

use crate::cluster::ConsensusConfig;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClusterAppConfig {
    /// This member's id; also its leader-election key
    #[serde(default = "default_instance_id")]
    pub instance_id: String,

    /// Heartbeats older than this do not vote (default: 5)
    #[serde(default = "default_heartbeat_timeout")]
    pub heartbeat_timeout_secs: u64,

    /// Members silent for longer are forgotten (default: 3x heartbeat timeout)
    #[serde(default)]
    pub eviction_timeout_secs: Option<u64>,

    /// How often this member heartbeats itself and its peers (default: 1)
    #[serde(default = "default_heartbeat_interval")]
    pub heartbeat_interval_secs: u64,

    /// Base URLs of the other members
    #[serde(default)]
    pub peers: Vec<String>,
}

fn default_instance_id() -> String {
    "astraguard-0".to_string()
}

const fn default_heartbeat_timeout() -> u64 {
    5
}

const fn default_heartbeat_interval() -> u64 {
    1
}

impl Default for ClusterAppConfig {
    fn default() -> Self {
        Self {
            instance_id: default_instance_id(),
            heartbeat_timeout_secs: default_heartbeat_timeout(),
            eviction_timeout_secs: None,
            heartbeat_interval_secs: default_heartbeat_interval(),
            peers: Vec::new(),
        }
    }
}

impl ClusterAppConfig {
    pub fn instance_id(&self) -> Result<InstanceId, DomainError> {
        InstanceId::parse(self.instance_id.as_str())
    }

    pub fn heartbeat_interval(&self) -> Duration {
        Duration::from_secs(self.heartbeat_interval_secs.max(1))
    }

    pub fn to_consensus_config(&self) -> ConsensusConfig {
        let config =
            ConsensusConfig::with_heartbeat_timeout(Duration::from_secs(self.heartbeat_timeout_secs));
        match self.eviction_timeout_secs {
            Some(secs) => config.with_eviction_timeout(Duration::from_secs(secs)),
            None => config,
        }
    }
}
