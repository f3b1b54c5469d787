//! Consensus round entity - Result of one leader/quorum computation

use serde::{Deserialize, Serialize};

use crate::value_objects::InstanceId;

/// Snapshot of one consensus computation; never persisted
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConsensusRound {
    pub quorum_met: bool,
    pub voting_instances: usize,
    pub known_instances: usize,
    /// Omitted from JSON when no leader was elected
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub leader_id: Option<InstanceId>,
}

impl ConsensusRound {
    /// Strict majority of `known`
    #[must_use]
    pub const fn majority(known: usize) -> usize {
        known / 2 + 1
    }

    /// Build a round, deriving `quorum_met`
    ///
    /// Quorum requires a strict majority of known instances to be voting and
    /// an elected leader. Zero known instances never yields quorum.
    #[must_use]
    pub fn new(leader_id: Option<InstanceId>, voting_instances: usize, known_instances: usize) -> Self {
        let quorum_met = known_instances > 0
            && leader_id.is_some()
            && voting_instances >= Self::majority(known_instances);
        Self {
            quorum_met,
            voting_instances,
            known_instances,
            leader_id,
        }
    }

    /// Round for an empty cluster
    #[must_use]
    pub fn empty() -> Self {
        Self::new(None, 0, 0)
    }
}
