//! Cluster consensus port
//!
//! Membership, leader election and quorum computation.

#[cfg(test)]
use mockall::automock;

use domain::{ClusterNode, ConsensusRound, InstanceId};

/// Port for cluster membership and consensus
///
/// Implementations must make `compute_round` safe to call concurrently with
/// `heartbeat`, and must never expose a partially updated node set.
#[cfg_attr(test, automock)]
pub trait ConsensusPort: Send + Sync {
    /// Register a node as a leader candidate
    fn register_node(&self, instance_id: InstanceId);

    /// Refresh a node's heartbeat, registering it if unknown
    fn heartbeat(&self, instance_id: InstanceId);

    /// Remove a node; returns whether it was known
    fn deregister(&self, instance_id: &InstanceId) -> bool;

    /// Currently elected leader, if any
    fn current_leader(&self) -> Option<InstanceId>;

    /// Recompute leader and quorum from the current membership
    fn compute_round(&self) -> ConsensusRound;

    /// Registered (non-evicted) nodes
    fn nodes(&self) -> Vec<ClusterNode>;
}
