//! Background tasks for the HTTP presentation layer
//!
//! Every task ticks on a fixed interval and exits once the shared shutdown
//! watch channel turns true (or its sender is dropped).

mod dependency_probe;
mod heartbeat;
mod recovery_tick;
mod resource_sampling;

use std::future::Future;
use std::time::Duration;

use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tracing::{debug, info};

pub use dependency_probe::spawn_dependency_probe_task;
pub use heartbeat::spawn_heartbeat_task;
pub use recovery_tick::spawn_recovery_tick_task;
pub use resource_sampling::spawn_resource_sampling_task;

/// Shortest accepted tick interval
const MIN_INTERVAL: Duration = Duration::from_millis(10);

/// Resolve once shutdown is requested
pub async fn shutdown_requested(shutdown: &mut watch::Receiver<bool>) {
    while !*shutdown.borrow_and_update() {
        if shutdown.changed().await.is_err() {
            return;
        }
    }
}

/// Run `step` every `interval` until shutdown
///
/// The first step runs immediately. A step in progress is finished before
/// shutdown is observed.
fn spawn_periodic<F, Fut>(
    task: &'static str,
    interval: Duration,
    mut shutdown: watch::Receiver<bool>,
    mut step: F,
) -> JoinHandle<()>
where
    F: FnMut() -> Fut + Send + 'static,
    Fut: Future<Output = ()> + Send,
{
    let interval = interval.max(MIN_INTERVAL);
    info!(
        task,
        interval_ms = u64::try_from(interval.as_millis()).unwrap_or(u64::MAX),
        "Starting background task"
    );

    tokio::spawn(async move {
        let mut ticker = tokio::time::interval(interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

        loop {
            tokio::select! {
                _ = ticker.tick() => step().await,
                () = shutdown_requested(&mut shutdown) => break,
            }
        }
        debug!(task, "Background task stopped");
    })
}
