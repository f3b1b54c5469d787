//! Host resource sampling task

use std::sync::Arc;
use std::time::Duration;

use application::ResourceMonitor;
use domain::ResourceStatus;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tracing::warn;

use super::spawn_periodic;

/// Spawn the loop that keeps the resource history filled
pub fn spawn_resource_sampling_task(
    resources: Arc<ResourceMonitor>,
    interval: Duration,
    shutdown: watch::Receiver<bool>,
) -> JoinHandle<()> {
    spawn_periodic("resource_sampling", interval, shutdown, move || {
        let resources = Arc::clone(&resources);
        async move {
            let metrics = resources.current_metrics();
            let health = resources.classify(&metrics);
            if health.overall() == ResourceStatus::Critical {
                warn!(
                    cpu = %health.cpu,
                    memory = %health.memory,
                    disk = %health.disk,
                    "Host resources critical"
                );
            }
        }
    })
}

#[cfg(test)]
mod tests {
    use application::{ApplicationError, ResourceProbePort};
    use domain::{ResourceMetrics, ResourceThresholds};

    use super::*;

    #[derive(Debug)]
    struct FixedProbe;

    impl ResourceProbePort for FixedProbe {
        fn sample(&self) -> Result<ResourceMetrics, ApplicationError> {
            Ok(ResourceMetrics {
                cpu_percent: 42.0,
                ..ResourceMetrics::zeroed()
            })
        }
    }

    #[tokio::test(start_paused = true)]
    async fn sampling_fills_bounded_history() {
        let resources = Arc::new(ResourceMonitor::new(
            Arc::new(FixedProbe),
            ResourceThresholds::default(),
            3,
        ));
        let (tx, rx) = watch::channel(false);
        let handle =
            spawn_resource_sampling_task(Arc::clone(&resources), Duration::from_secs(1), rx);

        tokio::time::sleep(Duration::from_millis(4500)).await;
        tx.send_replace(true);
        handle.await.unwrap();

        assert_eq!(resources.history_len(), 3);
        assert!((resources.summary().cpu_avg - 42.0).abs() < f64::EPSILON);
    }
}
