//! Dependency probe task

use std::sync::Arc;
use std::time::Duration;

use application::DependencyMonitor;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tracing::trace;

use super::spawn_periodic;

/// Spawn the loop feeding dependency outcomes into the breaker and retry policy
pub fn spawn_dependency_probe_task(
    monitor: Arc<DependencyMonitor>,
    interval: Duration,
    shutdown: watch::Receiver<bool>,
) -> JoinHandle<()> {
    spawn_periodic("dependency_probe", interval, shutdown, move || {
        let monitor = Arc::clone(&monitor);
        async move {
            let report = monitor.probe_once().await;
            trace!(?report, "Dependency probe pass");
        }
    })
}
