//! Component wiring for one server instance
//!
//! Builds the resilience primitives, the guarded dependencies and the
//! services from an [`AppConfig`], and starts the background loops that
//! drive them.

use std::sync::Arc;
use std::time::Duration;

use application::{
    ApplicationError, CachePurgePort, CircuitBreakerPort, ConsensusPort, DependencyMonitor,
    DependencyPort, FaultSwitchPort, HealthAggregator, RecoveryOrchestrator, ResourceMonitor,
    RetryPolicyPort,
};
use domain::FaultType;
use infrastructure::{
    AppConfig, CircuitBreaker, ConsensusModule, CorrelatedHttpClient, FaultInjector,
    FaultSwitchboard, GuardedCachePurge, GuardedDependency, MetricsRegistry, ModelLoaderAdapter,
    PeerHeartbeatClient, ProcfsResourceProbe, RetryPolicy, TelemetryCache,
    TelemetryUpstreamAdapter,
};
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tracing::info;

use crate::state::{AppState, GUARDED_CIRCUIT};
use crate::tasks;

/// Everything a running instance owns
#[derive(Debug)]
pub struct Runtime {
    pub state: AppState,
    pub recovery: Arc<RecoveryOrchestrator>,
    pub monitor: Arc<DependencyMonitor>,
    /// `None` for a single-member cluster
    pub peers: Option<Arc<PeerHeartbeatClient>>,
}

impl Runtime {
    /// Wire every component described by `config`
    pub fn build(config: AppConfig) -> Result<Self, ApplicationError> {
        let instance_id = config.cluster.instance_id()?;

        let switchboard = Arc::new(FaultSwitchboard::new());
        let injector = FaultInjector::new(Arc::clone(&switchboard));

        let breaker: Arc<dyn CircuitBreakerPort> = Arc::new(CircuitBreaker::with_config(
            GUARDED_CIRCUIT,
            config.circuit_breaker.to_circuit_breaker_config(),
        ));
        let retry: Arc<dyn RetryPolicyPort> = Arc::new(RetryPolicy::new(
            "telemetry_pipeline",
            config.retry.to_retry_config(),
        ));
        let consensus: Arc<dyn ConsensusPort> = Arc::new(ConsensusModule::new(
            config.cluster.to_consensus_config(),
        ));
        consensus.register_node(instance_id.clone());

        let cache = Arc::new(TelemetryCache::new(config.cache.to_cache_config()));

        let model_loader: Arc<dyn DependencyPort> = Arc::new(GuardedDependency::new(
            Arc::new(ModelLoaderAdapter::new(config.dependencies.model_path.clone())),
            FaultType::ModelLoaderFailure,
            injector.clone(),
        ));
        let upstream: Arc<dyn DependencyPort> = Arc::new(GuardedDependency::new(
            Arc::new(TelemetryUpstreamAdapter::new(
                config.dependencies.to_upstream_config(),
                Arc::clone(&cache),
            )?),
            FaultType::NetworkLatency,
            injector.clone(),
        ));
        let cache_dependency: Arc<dyn DependencyPort> = Arc::new(GuardedDependency::new(
            Arc::clone(&cache) as Arc<dyn DependencyPort>,
            FaultType::RedisFailure,
            injector.clone(),
        ));
        let purge: Arc<dyn CachePurgePort> = Arc::new(GuardedCachePurge::new(cache, injector));

        let recovery = Arc::new(RecoveryOrchestrator::new(
            Arc::clone(&breaker),
            Arc::clone(&retry),
            purge,
            config.recovery.to_recovery_config(),
        ));
        let health = Arc::new(HealthAggregator::new(
            Arc::clone(&breaker),
            Arc::clone(&retry),
            Arc::clone(&recovery),
            Arc::clone(&consensus),
        ));
        let monitor = Arc::new(DependencyMonitor::new(
            Arc::clone(&breaker),
            Arc::clone(&retry),
            model_loader,
            vec![upstream, cache_dependency],
        ));

        let resources = Arc::new(
            ResourceMonitor::new(
                Arc::new(ProcfsResourceProbe::default()),
                config.resources.thresholds,
                config.resources.history_size,
            )
            .with_enabled(config.resources.enabled),
        );

        let peers = if config.cluster.peers.is_empty() {
            None
        } else {
            let client = CorrelatedHttpClient::with_config(config.chaos.to_client_config())
                .map_err(|e| ApplicationError::Configuration(e.to_string()))?;
            Some(Arc::new(PeerHeartbeatClient::new(
                Arc::new(client),
                instance_id.clone(),
                config.cluster.peers.clone(),
            )))
        };

        info!(
            instance_id = %instance_id,
            peers = config.cluster.peers.len(),
            model_path = ?config.dependencies.model_path,
            upstream = ?config.dependencies.upstream_url,
            "Components wired"
        );

        let switchboard: Arc<dyn FaultSwitchPort> = switchboard;
        Ok(Self {
            state: AppState {
                health,
                consensus,
                breaker,
                retry,
                switchboard,
                metrics: Arc::new(MetricsRegistry::new()),
                resources,
                config: Arc::new(config),
                instance_id,
            },
            recovery,
            monitor,
            peers,
        })
    }

    /// Start every background loop; each stops once `shutdown` turns true
    pub fn spawn_tasks(&self, shutdown: &watch::Receiver<bool>) -> Vec<JoinHandle<()>> {
        let config = &self.state.config;
        let mut handles = vec![
            tasks::spawn_recovery_tick_task(
                Arc::clone(&self.recovery),
                self.recovery.config().tick_interval,
                shutdown.clone(),
            ),
            tasks::spawn_dependency_probe_task(
                Arc::clone(&self.monitor),
                config.dependencies.probe_interval(),
                shutdown.clone(),
            ),
            tasks::spawn_heartbeat_task(
                Arc::clone(&self.state.consensus),
                self.state.instance_id.clone(),
                self.peers.clone(),
                config.cluster.heartbeat_interval(),
                shutdown.clone(),
            ),
        ];
        if self.state.resources.is_enabled() {
            handles.push(tasks::spawn_resource_sampling_task(
                Arc::clone(&self.state.resources),
                Duration::from_secs(config.resources.sample_interval_secs),
                shutdown.clone(),
            ));
        }
        handles
    }
}
