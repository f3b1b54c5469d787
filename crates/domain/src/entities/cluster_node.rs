//! Cluster node entity

use std::time::Duration;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::value_objects::InstanceId;

/// A registered cluster member
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClusterNode {
    pub instance_id: InstanceId,
    pub last_heartbeat: DateTime<Utc>,
    /// Whether this node may be elected leader
    pub is_candidate: bool,
}

impl ClusterNode {
    /// Create a freshly registered candidate node
    #[must_use]
    pub const fn new(instance_id: InstanceId, now: DateTime<Utc>) -> Self {
        Self {
            instance_id,
            last_heartbeat: now,
            is_candidate: true,
        }
    }

    /// Time since the last heartbeat; zero if the clock went backwards
    #[must_use]
    pub fn age(&self, now: DateTime<Utc>) -> Duration {
        now.signed_duration_since(self.last_heartbeat)
            .to_std()
            .unwrap_or_default()
    }

    /// Whether the node heartbeated within `timeout`
    #[must_use]
    pub fn is_alive(&self, now: DateTime<Utc>, timeout: Duration) -> bool {
        self.age(now) <= timeout
    }

    pub fn touch(&mut self, now: DateTime<Utc>) {
        if now > self.last_heartbeat {
            self.last_heartbeat = now;
        }
    }
}
