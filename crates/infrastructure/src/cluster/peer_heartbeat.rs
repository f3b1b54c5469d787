//! Announces this instance to its cluster peers
//!
//! Every member POSTs its own id to `{peer}/cluster/heartbeat` on an
//! interval; a peer that has never seen the id registers it.

use std::sync::Arc;

use application::HttpProbePort;
use domain::InstanceId;
use serde_json::json;
use tracing::{debug, warn};

#[derive(Debug, Clone)]
pub struct PeerHeartbeatClient {
    client: Arc<dyn HttpProbePort>,
    instance_id: InstanceId,
    peers: Vec<String>,
}

impl PeerHeartbeatClient {
    pub fn new(client: Arc<dyn HttpProbePort>, instance_id: InstanceId, peers: Vec<String>) -> Self {
        let peers = peers
            .into_iter()
            .map(|p| p.trim_end_matches('/').to_string())
            .filter(|p| !p.is_empty())
            .collect();
        Self {
            client,
            instance_id,
            peers,
        }
    }

    pub fn peers(&self) -> &[String] {
        &self.peers
    }

    /// Heartbeat every peer once, returning how many acknowledged
    pub async fn announce(&self) -> usize {
        let body = json!({ "instance_id": self.instance_id.as_str() });
        let mut acknowledged = 0;
        for peer in &self.peers {
            let url = format!("{peer}/cluster/heartbeat");
            match self.client.post(&url, Some(body.clone())).await {
                Ok(resp) if resp.is_success() => {
                    debug!(peer = %peer, "Peer acknowledged heartbeat");
                    acknowledged += 1;
                },
                Ok(resp) => {
                    warn!(peer = %peer, status = resp.status, "Peer rejected heartbeat");
                },
                Err(e) => {
                    warn!(peer = %peer, error = %e, "Peer heartbeat failed");
                },
            }
        }
        acknowledged
    }
}
