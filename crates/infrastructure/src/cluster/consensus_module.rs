//! In-memory consensus over heartbeating cluster members
//!
//! The leader is the lexicographically smallest candidate whose heartbeat is
//! within `heartbeat_timeout`. Election is recomputed lazily on every read,
//! so there are no timers. Nodes silent for longer than `eviction_timeout`
//! are dropped from the membership on the next write.

use std::collections::HashMap;
use std::time::Duration;

use application::ConsensusPort;
use chrono::{DateTime, Utc};
use domain::{ClusterNode, ConsensusRound, InstanceId};
use parking_lot::RwLock;
use tracing::{debug, info};

/// Heartbeat and eviction windows
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ConsensusConfig {
    pub heartbeat_timeout: Duration,
    pub eviction_timeout: Duration,
}

impl Default for ConsensusConfig {
    fn default() -> Self {
        Self::with_heartbeat_timeout(Duration::from_secs(5))
    }
}

impl ConsensusConfig {
    /// Eviction defaults to three heartbeat timeouts
    #[must_use]
    pub const fn with_heartbeat_timeout(heartbeat_timeout: Duration) -> Self {
        Self {
            heartbeat_timeout,
            eviction_timeout: heartbeat_timeout.saturating_mul(3),
        }
    }

    #[must_use]
    pub const fn with_eviction_timeout(mut self, eviction_timeout: Duration) -> Self {
        self.eviction_timeout = eviction_timeout;
        self
    }
}

pub struct ConsensusModule {
    config: ConsensusConfig,
    nodes: RwLock<HashMap<InstanceId, ClusterNode>>,
}

impl std::fmt::Debug for ConsensusModule {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ConsensusModule")
            .field("config", &self.config)
            .field("known", &self.nodes.read().len())
            .finish()
    }
}

impl Default for ConsensusModule {
    fn default() -> Self {
        Self::new(ConsensusConfig::default())
    }
}

impl ConsensusModule {
    #[must_use]
    pub fn new(config: ConsensusConfig) -> Self {
        Self {
            config,
            nodes: RwLock::new(HashMap::new()),
        }
    }

    #[must_use]
    pub const fn config(&self) -> &ConsensusConfig {
        &self.config
    }

    pub fn register_node_at(&self, instance_id: InstanceId, is_candidate: bool, now: DateTime<Utc>) {
        let mut nodes = self.nodes.write();
        self.evict_stale(&mut nodes, now);
        let node = nodes
            .entry(instance_id.clone())
            .or_insert_with(|| ClusterNode::new(instance_id.clone(), now));
        node.touch(now);
        node.is_candidate = is_candidate;
        info!(instance = %instance_id, is_candidate, "Cluster node registered");
    }

    pub fn heartbeat_at(&self, instance_id: InstanceId, now: DateTime<Utc>) {
        let mut nodes = self.nodes.write();
        self.evict_stale(&mut nodes, now);
        match nodes.get_mut(&instance_id) {
            Some(node) => node.touch(now),
            None => {
                info!(instance = %instance_id, "Unknown node joined by heartbeat");
                nodes.insert(instance_id.clone(), ClusterNode::new(instance_id, now));
            },
        }
    }

    pub fn current_leader_at(&self, now: DateTime<Utc>) -> Option<InstanceId> {
        let nodes = self.nodes.read();
        self.elect(&nodes, now)
    }

    pub fn compute_round_at(&self, now: DateTime<Utc>) -> ConsensusRound {
        let nodes = self.nodes.read();
        let known = nodes
            .values()
            .filter(|n| !self.is_evictable(n, now))
            .count();
        if known == 0 {
            return ConsensusRound::empty();
        }
        let voting = nodes
            .values()
            .filter(|n| n.is_alive(now, self.config.heartbeat_timeout))
            .count();
        let round = ConsensusRound::new(self.elect(&nodes, now), voting, known);
        debug!(
            voting,
            known,
            quorum_met = round.quorum_met,
            "Consensus round computed"
        );
        round
    }

    pub fn nodes_at(&self, now: DateTime<Utc>) -> Vec<ClusterNode> {
        let nodes = self.nodes.read();
        let mut list: Vec<ClusterNode> = nodes
            .values()
            .filter(|n| !self.is_evictable(n, now))
            .cloned()
            .collect();
        list.sort_by(|a, b| a.instance_id.cmp(&b.instance_id));
        list
    }

    fn elect(&self, nodes: &HashMap<InstanceId, ClusterNode>, now: DateTime<Utc>) -> Option<InstanceId> {
        nodes
            .values()
            .filter(|n| n.is_candidate && n.is_alive(now, self.config.heartbeat_timeout))
            .map(|n| &n.instance_id)
            .min()
            .cloned()
    }

    fn is_evictable(&self, node: &ClusterNode, now: DateTime<Utc>) -> bool {
        node.age(now) > self.config.eviction_timeout
    }

    fn evict_stale(&self, nodes: &mut HashMap<InstanceId, ClusterNode>, now: DateTime<Utc>) {
        nodes.retain(|id, node| {
            let keep = !self.is_evictable(node, now);
            if !keep {
                info!(instance = %id, "Evicting silent cluster node");
            }
            keep
        });
    }
}

impl ConsensusPort for ConsensusModule {
    fn register_node(&self, instance_id: InstanceId) {
        self.register_node_at(instance_id, true, Utc::now());
    }

    fn heartbeat(&self, instance_id: InstanceId) {
        self.heartbeat_at(instance_id, Utc::now());
    }

    fn deregister(&self, instance_id: &InstanceId) -> bool {
        let removed = self.nodes.write().remove(instance_id).is_some();
        if removed {
            info!(instance = %instance_id, "Cluster node deregistered");
        }
        removed
    }

    fn current_leader(&self) -> Option<InstanceId> {
        self.current_leader_at(Utc::now())
    }

    fn compute_round(&self) -> ConsensusRound {
        self.compute_round_at(Utc::now())
    }

    fn nodes(&self) -> Vec<ClusterNode> {
        self.nodes_at(Utc::now())
    }
}
