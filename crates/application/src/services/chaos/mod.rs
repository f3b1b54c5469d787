//! Chaos verification harness
//!
//! The orchestrator is an external client of the service under test. It
//! engages a fault through the service's fault control endpoints, polls the
//! health surface until the expected degraded-then-recovered sequence is
//! seen (or a deadline passes), and reports a plain boolean. Every injected
//! fault is withdrawn by an independent timer task after its duration, or
//! immediately on [`ChaosOrchestrator::shutdown`].

mod observe;
mod scenarios;
#[cfg(test)]
mod tests;

use std::collections::HashMap;
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use domain::{FaultInjectionRecord, FaultType};
use parking_lot::{Mutex, RwLock};
use serde_json::json;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio::time::Instant;
use tracing::{debug, info, warn};

pub use self::scenarios::{
    SCENARIO_CIRCUIT_BREAKER, SCENARIO_CLUSTER_CONSENSUS, SCENARIO_RECOVERY_ORCHESTRATOR,
    SCENARIO_RETRY_LOGIC, SCENARIOS,
};
use self::observe::{Classifier, Observation};
use crate::error::ApplicationError;
use crate::ports::{ChaosMetricsPort, HttpProbePort, HttpResponse, ProbeConnectorPort};

/// Default service under test
pub const DEFAULT_BASE_URL: &str = "http://localhost:8000";

/// Harness tuning
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChaosConfig {
    pub base_url: String,
    /// Fixed delay between polls
    pub poll_interval: Duration,
    /// How long after the fault window recovery may take
    pub recovery_timeout: Duration,
    /// Fault duration used by the named scenarios
    pub default_duration_secs: u64,
}

impl Default for ChaosConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            poll_interval: Duration::from_millis(500),
            recovery_timeout: Duration::from_secs(30),
            default_duration_secs: 10,
        }
    }
}

/// Injects faults into a running service and verifies it heals
pub struct ChaosOrchestrator {
    config: ChaosConfig,
    connector: Arc<dyn ProbeConnectorPort>,
    metrics: Arc<dyn ChaosMetricsPort>,
    session: RwLock<Option<Arc<dyn HttpProbePort>>>,
    active_depth: Mutex<usize>,
    shutdown: watch::Sender<bool>,
    withdrawals: Mutex<HashMap<FaultType, JoinHandle<()>>>,
}

impl std::fmt::Debug for ChaosOrchestrator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ChaosOrchestrator")
            .field("config", &self.config)
            .field("started", &self.is_started())
            .field("chaos_active", &self.chaos_active())
            .finish_non_exhaustive()
    }
}

impl ChaosOrchestrator {
    pub fn new(
        config: ChaosConfig,
        connector: Arc<dyn ProbeConnectorPort>,
        metrics: Arc<dyn ChaosMetricsPort>,
    ) -> Self {
        let (shutdown, _) = watch::channel(false);
        Self {
            config,
            connector,
            metrics,
            session: RwLock::new(None),
            active_depth: Mutex::new(0),
            shutdown,
            withdrawals: Mutex::new(HashMap::new()),
        }
    }

    #[must_use]
    pub fn base_url(&self) -> &str {
        &self.config.base_url
    }

    #[must_use]
    pub const fn config(&self) -> &ChaosConfig {
        &self.config
    }

    /// Whether a session is open
    pub fn is_started(&self) -> bool {
        self.session.read().is_some()
    }

    /// Whether an injection window is currently open
    pub fn chaos_active(&self) -> bool {
        *self.active_depth.lock() > 0
    }

    /// Acquire the network client; a no-op when already started
    pub async fn startup(&self) -> Result<(), ApplicationError> {
        if self.is_started() {
            return Ok(());
        }
        let client = self.connector.connect().await?;
        self.shutdown.send_replace(false);
        *self.session.write() = Some(client);
        info!(base_url = %self.config.base_url, "Chaos session started");
        Ok(())
    }

    /// Stop polling, withdraw engaged faults and release the session
    ///
    /// Safe to call any number of times.
    pub async fn shutdown(&self) {
        self.shutdown.send_replace(true);
        self.await_withdrawals().await;
        if self.session.write().take().is_some() {
            info!("Chaos session closed");
        }
    }

    /// Inject `fault_type` for `duration_seconds` and verify recovery
    pub async fn inject_faults(&self, fault_type: FaultType, duration_seconds: u64) -> bool {
        match fault_type {
            FaultType::ModelLoaderFailure => {
                self.inject_model_loader_failure(duration_seconds).await
            },
            FaultType::NetworkLatency => self.inject_network_latency(duration_seconds).await,
            FaultType::RedisFailure => self.inject_redis_failure(duration_seconds).await,
        }
    }

    /// Like [`Self::inject_faults`], validating the name before any I/O
    pub async fn inject_faults_named(&self, fault_type: &str, duration_seconds: u64) -> bool {
        match fault_type.parse::<FaultType>() {
            Ok(fault_type) => self.inject_faults(fault_type, duration_seconds).await,
            Err(e) => {
                warn!(fault_type, error = %e, "Rejected fault injection");
                false
            },
        }
    }

    /// Fail model loads; true once the breaker is seen probing or closed again
    pub async fn inject_model_loader_failure(&self, duration_seconds: u64) -> bool {
        self.run_injection(FaultType::ModelLoaderFailure, duration_seconds)
            .await
    }

    /// Slow the telemetry upstream; true once retries settle back to normal
    pub async fn inject_network_latency(&self, duration_seconds: u64) -> bool {
        self.run_injection(FaultType::NetworkLatency, duration_seconds)
            .await
    }

    /// Break the cache; true if the service stays observable for the window
    pub async fn inject_redis_failure(&self, duration_seconds: u64) -> bool {
        self.run_injection(FaultType::RedisFailure, duration_seconds)
            .await
    }

    async fn run_injection(&self, fault_type: FaultType, duration_seconds: u64) -> bool {
        let client = match self.client() {
            Ok(client) => client,
            Err(e) => {
                warn!(fault_type = %fault_type, error = %e, "Cannot inject fault");
                return false;
            },
        };

        self.metrics.record_injection(fault_type);
        let _active = self.activate();
        let mut record = FaultInjectionRecord::start(fault_type, duration_seconds);
        let window = record.window();

        info!(fault_type = %fault_type, duration_seconds, "Injecting fault");
        let engaged = self.engage(client.as_ref(), fault_type, duration_seconds).await;
        self.schedule_withdrawal(Arc::clone(&client), fault_type, window);

        let outcome = match engaged {
            Ok(()) => self.verify(client.as_ref(), fault_type, window).await,
            Err(e) => Err(e),
        };
        let recovered = outcome.unwrap_or_else(|e| {
            warn!(fault_type = %fault_type, error = %e, "Fault verification aborted");
            false
        });

        record.complete(recovered);
        info!(
            fault_type = %fault_type,
            recovered,
            elapsed = ?record.elapsed(),
            "Fault injection finished"
        );
        recovered
    }

    async fn verify(
        &self,
        client: &dyn HttpProbePort,
        fault_type: FaultType,
        window: Duration,
    ) -> Result<bool, ApplicationError> {
        match fault_type {
            FaultType::ModelLoaderFailure => {
                self.observe_recovery(client, "/health", window, observe::classify_breaker)
                    .await
            },
            FaultType::NetworkLatency => {
                self.observe_recovery(client, "/metrics/retry", window, observe::classify_retry)
                    .await
            },
            FaultType::RedisFailure => {
                self.observe_recovery(client, "/health", window, observe::classify_system)
                    .await
            },
        }
    }

    /// Poll until a degraded observation is followed by a nominal one
    ///
    /// A half-open breaker counts as degraded: the dependency is still being
    /// probed. A service that never leaves nominal is not a recovery, so it
    /// fails at the deadline like one that never comes back.
    async fn observe_recovery(
        &self,
        client: &dyn HttpProbePort,
        path: &str,
        window: Duration,
        classify: Classifier,
    ) -> Result<bool, ApplicationError> {
        let deadline = Instant::now() + window + self.config.recovery_timeout;
        let mut saw_degraded = false;

        loop {
            let observation = classify(&self.get(client, path).await?)?;
            debug!(path, ?observation, saw_degraded, "Polled health");
            match observation {
                Observation::Degraded | Observation::Recovering => saw_degraded = true,
                Observation::Nominal if saw_degraded => return Ok(true),
                Observation::Nominal => {},
            }
            if Instant::now() >= deadline || !self.pause().await {
                return Ok(false);
            }
        }
    }

    /// Poll `path` until `assertion` holds or the recovery timeout passes
    async fn assert_eventually(&self, path: &str, assertion: observe::Assertion) -> bool {
        self.try_assert_eventually(path, assertion)
            .await
            .unwrap_or_else(|e| {
                warn!(path, error = %e, "Assertion polling aborted");
                false
            })
    }

    async fn try_assert_eventually(
        &self,
        path: &str,
        assertion: observe::Assertion,
    ) -> Result<bool, ApplicationError> {
        let client = self.client()?;
        let deadline = Instant::now() + self.config.recovery_timeout;
        loop {
            if assertion(&self.get(client.as_ref(), path).await?)? {
                return Ok(true);
            }
            if Instant::now() >= deadline || !self.pause().await {
                return Ok(false);
            }
        }
    }

    async fn engage(
        &self,
        client: &dyn HttpProbePort,
        fault_type: FaultType,
        duration_seconds: u64,
    ) -> Result<(), ApplicationError> {
        let body = json!({ "duration_secs": duration_seconds });
        let resp = client
            .post(&self.fault_url(fault_type), Some(body))
            .await?;
        if resp.is_success() {
            Ok(())
        } else {
            Err(ApplicationError::Protocol(format!(
                "fault control answered {} for {fault_type}",
                resp.status
            )))
        }
    }

    fn schedule_withdrawal(
        &self,
        client: Arc<dyn HttpProbePort>,
        fault_type: FaultType,
        window: Duration,
    ) {
        let url = self.fault_url(fault_type);
        let mut stop = self.shutdown.subscribe();
        let handle = tokio::spawn(async move {
            tokio::select! {
                () = tokio::time::sleep(window) => {},
                () = shutdown_signalled(&mut stop) => {
                    debug!(fault_type = %fault_type, "Withdrawing fault early on shutdown");
                },
            }
            withdraw(client.as_ref(), &url, fault_type).await;
        });
        if let Some(previous) = self.withdrawals.lock().insert(fault_type, handle) {
            previous.abort();
        }
    }

    /// Wait for every scheduled withdrawal to run
    async fn await_withdrawals(&self) {
        let pending: Vec<_> = self.withdrawals.lock().drain().collect();
        for (fault_type, handle) in pending {
            if let Err(e) = handle.await {
                if !e.is_cancelled() {
                    warn!(fault_type = %fault_type, error = %e, "Fault withdrawal task failed");
                }
            }
        }
    }

    fn client(&self) -> Result<Arc<dyn HttpProbePort>, ApplicationError> {
        self.session
            .read()
            .clone()
            .ok_or_else(|| ApplicationError::NotStarted("call startup() first".to_string()))
    }

    fn url(&self, path: &str) -> String {
        format!("{}{path}", self.config.base_url.trim_end_matches('/'))
    }

    fn fault_url(&self, fault_type: FaultType) -> String {
        self.url(&format!("/chaos/faults/{fault_type}"))
    }

    async fn get(
        &self,
        client: &dyn HttpProbePort,
        path: &str,
    ) -> Result<HttpResponse, ApplicationError> {
        let url = self.url(path);
        self.until_shutdown(client.get(&url))
            .await
            .unwrap_or_else(|| Err(ApplicationError::NotStarted("shutting down".to_string())))
    }

    /// Sleep one poll interval; false if shutdown interrupted it
    async fn pause(&self) -> bool {
        self.until_shutdown(tokio::time::sleep(self.config.poll_interval))
            .await
            .is_some()
    }

    async fn until_shutdown<F: Future>(&self, fut: F) -> Option<F::Output> {
        let mut stop = self.shutdown.subscribe();
        tokio::select! {
            out = fut => Some(out),
            () = shutdown_signalled(&mut stop) => None,
        }
    }

    fn activate(&self) -> ActiveGuard<'_> {
        let mut depth = self.active_depth.lock();
        *depth += 1;
        if *depth == 1 {
            self.metrics.set_chaos_active(true);
        }
        ActiveGuard { orchestrator: self }
    }
}

/// Keeps the "chaos active" gauge raised while alive
struct ActiveGuard<'a> {
    orchestrator: &'a ChaosOrchestrator,
}

impl Drop for ActiveGuard<'_> {
    fn drop(&mut self) {
        let mut depth = self.orchestrator.active_depth.lock();
        *depth = depth.saturating_sub(1);
        if *depth == 0 {
            self.orchestrator.metrics.set_chaos_active(false);
        }
    }
}

/// Resolves once shutdown has been requested
async fn shutdown_signalled(stop: &mut watch::Receiver<bool>) {
    loop {
        if *stop.borrow_and_update() {
            return;
        }
        if stop.changed().await.is_err() {
            std::future::pending::<()>().await;
        }
    }
}

async fn withdraw(client: &dyn HttpProbePort, url: &str, fault_type: FaultType) {
    match client.delete(url).await {
        Ok(resp) if resp.is_success() || resp.status == 404 => {
            info!(fault_type = %fault_type, "Fault withdrawn");
        },
        Ok(resp) => {
            warn!(fault_type = %fault_type, status = resp.status, "Fault withdrawal rejected");
        },
        Err(e) => warn!(fault_type = %fault_type, error = %e, "Fault withdrawal failed"),
    }
}
