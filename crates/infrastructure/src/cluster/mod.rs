//! Cluster membership and leader election

mod consensus_module;
mod peer_heartbeat;

pub use consensus_module::{ConsensusConfig, ConsensusModule};
pub use peer_heartbeat::PeerHeartbeatClient;
