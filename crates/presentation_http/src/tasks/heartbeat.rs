//! Cluster heartbeat task
//!
//! Refreshes this instance's own membership and announces it to every
//! configured peer.

use std::sync::Arc;
use std::time::Duration;

use application::ConsensusPort;
use domain::InstanceId;
use infrastructure::PeerHeartbeatClient;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tracing::debug;

use super::spawn_periodic;

pub fn spawn_heartbeat_task(
    consensus: Arc<dyn ConsensusPort>,
    instance_id: InstanceId,
    peers: Option<Arc<PeerHeartbeatClient>>,
    interval: Duration,
    shutdown: watch::Receiver<bool>,
) -> JoinHandle<()> {
    spawn_periodic("cluster_heartbeat", interval, shutdown, move || {
        let consensus = Arc::clone(&consensus);
        let instance_id = instance_id.clone();
        let peers = peers.clone();
        async move {
            consensus.heartbeat(instance_id);
            if let Some(peers) = peers {
                let acknowledged = peers.announce().await;
                debug!(acknowledged, total = peers.peers().len(), "Heartbeat announced");
            }
        }
    })
}

#[cfg(test)]
mod tests {
    use infrastructure::{ConsensusConfig, ConsensusModule};

    use super::*;

    #[tokio::test]
    async fn heartbeat_registers_self() {
        let consensus: Arc<dyn ConsensusPort> =
            Arc::new(ConsensusModule::new(ConsensusConfig::default()));
        let id = InstanceId::parse("astra-7").unwrap();

        let (tx, rx) = watch::channel(false);
        let handle = spawn_heartbeat_task(
            Arc::clone(&consensus),
            id.clone(),
            None,
            Duration::from_millis(10),
            rx,
        );
        tokio::time::sleep(Duration::from_millis(50)).await;
        tx.send_replace(true);
        handle.await.unwrap();

        assert_eq!(consensus.current_leader(), Some(id));
        assert!(consensus.compute_round().quorum_met);
    }
}
