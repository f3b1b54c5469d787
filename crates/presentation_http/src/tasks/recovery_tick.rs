//! Recovery orchestrator tick task

use std::sync::Arc;
use std::time::Duration;

use application::RecoveryOrchestrator;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tracing::debug;

use super::spawn_periodic;

/// Spawn the loop that lets the recovery orchestrator evaluate and remediate
pub fn spawn_recovery_tick_task(
    recovery: Arc<RecoveryOrchestrator>,
    interval: Duration,
    shutdown: watch::Receiver<bool>,
) -> JoinHandle<()> {
    spawn_periodic("recovery_tick", interval, shutdown, move || {
        let recovery = Arc::clone(&recovery);
        async move {
            let actions = recovery.tick().await;
            if !actions.is_empty() {
                debug!(
                    attempted = actions.len(),
                    logged = recovery.action_count(),
                    "Recovery tick issued actions"
                );
            }
        }
    })
}

#[cfg(test)]
mod tests {
    use infrastructure::AppConfig;

    use super::*;
    use crate::runtime::Runtime;

    #[tokio::test]
    async fn tick_task_stops_on_shutdown() {
        let runtime = Runtime::build(AppConfig::default()).unwrap();
        let (tx, rx) = watch::channel(false);
        let handle =
            spawn_recovery_tick_task(Arc::clone(&runtime.recovery), Duration::from_millis(10), rx);

        tokio::time::sleep(Duration::from_millis(50)).await;
        tx.send_replace(true);
        handle.await.unwrap();

        // A healthy instance never needs remediation
        assert_eq!(runtime.recovery.action_count(), 0);
    }
}
