use std::collections::{HashMap, VecDeque};
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use domain::FaultType;
use parking_lot::Mutex;
use serde_json::{Value, json};

use super::*;
use crate::ports::NoopChaosMetrics;

const BASE: &str = "http://svc:8000";

#[derive(Debug, Clone)]
enum Reply {
    Ok(HttpResponse),
    Refused,
    /// The response of the first engaged fault listed, else `otherwise`
    Reacting {
        faults: Vec<(FaultType, HttpResponse)>,
        otherwise: HttpResponse,
    },
}

/// In-memory service: replies are queued per "METHOD path"; the last reply
/// of a queue repeats forever. Fault control calls engage and withdraw
/// faults for [`Reply::Reacting`] routes.
#[derive(Debug, Default)]
struct FakeService {
    routes: Mutex<HashMap<String, VecDeque<Reply>>>,
    calls: Mutex<Vec<String>>,
    engaged: Mutex<Vec<FaultType>>,
}

impl FakeService {
    fn route(&self, key: &str, replies: Vec<Reply>) {
        self.routes.lock().insert(key.to_string(), replies.into());
    }

    fn calls(&self) -> Vec<String> {
        self.calls.lock().clone()
    }

    fn count(&self, key: &str) -> usize {
        self.calls.lock().iter().filter(|c| *c == key).count()
    }

    fn answer(&self, method: &str, url: &str) -> Result<HttpResponse, ApplicationError> {
        let path = url.strip_prefix(BASE).unwrap_or(url);
        let key = format!("{method} {path}");
        self.calls.lock().push(key.clone());
        self.track_fault(method, path);

        let reply = {
            let mut routes = self.routes.lock();
            match routes.get_mut(&key) {
                Some(queue) if queue.len() > 1 => queue.pop_front(),
                Some(queue) => queue.front().cloned(),
                None => None,
            }
        };
        match reply {
            Some(Reply::Ok(resp)) => Ok(resp),
            Some(Reply::Reacting { faults, otherwise }) => {
                let engaged = self.engaged.lock();
                Ok(faults
                    .into_iter()
                    .find(|(fault, _)| engaged.contains(fault))
                    .map_or(otherwise, |(_, resp)| resp))
            },
            Some(Reply::Refused) => Err(ApplicationError::Transport("connection refused".into())),
            None if method != "GET" => Ok(HttpResponse::ok(json!({}))),
            None => Err(ApplicationError::Transport(format!("no route for {key}"))),
        }
    }

    fn track_fault(&self, method: &str, path: &str) {
        let Some(fault) = path
            .strip_prefix("/chaos/faults/")
            .and_then(|name| name.parse::<FaultType>().ok())
        else {
            return;
        };
        let mut engaged = self.engaged.lock();
        match method {
            "POST" if !engaged.contains(&fault) => engaged.push(fault),
            "DELETE" => engaged.retain(|f| *f != fault),
            _ => {},
        }
    }
}

#[async_trait]
impl HttpProbePort for FakeService {
    async fn get(&self, url: &str) -> Result<HttpResponse, ApplicationError> {
        self.answer("GET", url)
    }

    async fn post(&self, url: &str, _body: Option<Value>) -> Result<HttpResponse, ApplicationError> {
        self.answer("POST", url)
    }

    async fn delete(&self, url: &str) -> Result<HttpResponse, ApplicationError> {
        self.answer("DELETE", url)
    }
}

#[derive(Debug)]
struct FakeConnector(Arc<FakeService>);

#[async_trait]
impl ProbeConnectorPort for FakeConnector {
    async fn connect(&self) -> Result<Arc<dyn HttpProbePort>, ApplicationError> {
        Ok(Arc::clone(&self.0) as Arc<dyn HttpProbePort>)
    }
}

#[derive(Debug, Default)]
struct RecordingMetrics {
    injections: Mutex<Vec<FaultType>>,
    active: Mutex<Vec<bool>>,
    recoveries: Mutex<Vec<String>>,
}

impl ChaosMetricsPort for RecordingMetrics {
    fn record_injection(&self, fault_type: FaultType) {
        self.injections.lock().push(fault_type);
    }

    fn set_chaos_active(&self, active: bool) {
        self.active.lock().push(active);
    }

    fn observe_recovery_time(&self, scenario: &str, _elapsed: Duration) {
        self.recoveries.lock().push(scenario.to_string());
    }
}

fn config() -> ChaosConfig {
    ChaosConfig {
        base_url: BASE.to_string(),
        poll_interval: Duration::from_millis(500),
        recovery_timeout: Duration::from_secs(10),
        default_duration_secs: 5,
    }
}

fn harness() -> (Arc<ChaosOrchestrator>, Arc<FakeService>, Arc<RecordingMetrics>) {
    let service = Arc::new(FakeService::default());
    let metrics = Arc::new(RecordingMetrics::default());
    let orch = ChaosOrchestrator::new(
        config(),
        Arc::new(FakeConnector(Arc::clone(&service))),
        Arc::clone(&metrics) as Arc<dyn ChaosMetricsPort>,
    );
    (Arc::new(orch), service, metrics)
}

async fn started() -> (Arc<ChaosOrchestrator>, Arc<FakeService>, Arc<RecordingMetrics>) {
    let (orch, service, metrics) = harness();
    orch.startup().await.unwrap();
    (orch, service, metrics)
}

fn health(status: &str, state: &str) -> Reply {
    Reply::Ok(health_doc(status, state))
}

fn health_doc(status: &str, state: &str) -> HttpResponse {
    HttpResponse::ok(json!({
        "system": {"status": status},
        "circuit_breaker": {"state": state},
        "retry": {"state": "NORMAL"},
        "recovery": {"action_count": 0, "actions": []},
        "consensus": {"quorum_met": true, "voting_instances": 1, "known_instances": 1},
    }))
}

fn retry(state: &str, status: &str) -> Reply {
    Reply::Ok(retry_doc(state, status))
}

fn retry_doc(state: &str, status: &str) -> HttpResponse {
    HttpResponse::ok(json!({
        "retry": {"state": state},
        "system": {"status": status},
    }))
}

fn leader(id: &str) -> Reply {
    Reply::Ok(HttpResponse::ok(json!({"instance_id": id})))
}

fn consensus(quorum_met: bool) -> Reply {
    Reply::Ok(HttpResponse::ok(
        json!({"quorum_met": quorum_met, "voting_instances": 3, "known_instances": 3}),
    ))
}

fn recovery(actions: &[&str]) -> Reply {
    Reply::Ok(HttpResponse::ok(
        json!({"action_count": actions.len(), "actions": actions}),
    ))
}

fn healthy_service(service: &FakeService) {
    service.route("GET /health", vec![health("HEALTHY", "CLOSED")]);
    service.route("GET /metrics/retry", vec![retry("NORMAL", "HEALTHY")]);
    service.route(
        "GET /metrics/recovery",
        vec![recovery(&["circuit_restart", "cache_purge"])],
    );
    service.route("GET /leader", vec![leader("astra-a")]);
    service.route("GET /consensus", vec![consensus(true)]);
}

/// Healthy until a fault is engaged, degraded while it is, healthy again
/// once it is withdrawn
fn reacting_service(service: &FakeService) {
    healthy_service(service);
    service.route(
        "GET /health",
        vec![Reply::Reacting {
            faults: vec![
                (FaultType::ModelLoaderFailure, health_doc("DEGRADED", "OPEN")),
                (FaultType::RedisFailure, health_doc("DEGRADED", "CLOSED")),
            ],
            otherwise: health_doc("HEALTHY", "CLOSED"),
        }],
    );
    service.route(
        "GET /metrics/retry",
        vec![Reply::Reacting {
            faults: vec![(FaultType::NetworkLatency, retry_doc("ELEVATED", "DEGRADED"))],
            otherwise: retry_doc("NORMAL", "HEALTHY"),
        }],
    );
}

#[test]
fn defaults() {
    let orch = ChaosOrchestrator::new(
        ChaosConfig::default(),
        Arc::new(FakeConnector(Arc::new(FakeService::default()))),
        Arc::new(NoopChaosMetrics),
    );
    assert_eq!(orch.base_url(), "http://localhost:8000");
    assert!(!orch.is_started());
    assert!(!orch.chaos_active());
}

#[tokio::test]
async fn startup_opens_session() {
    let (orch, _, _) = started().await;
    assert!(orch.is_started());
}

#[tokio::test]
async fn unknown_fault_type_makes_no_calls() {
    let (orch, service, metrics) = started().await;
    assert!(!orch.inject_faults_named("unknown_fault_type", 5).await);
    assert!(service.calls().is_empty());
    assert!(metrics.injections.lock().is_empty());
}

#[tokio::test]
async fn injection_before_startup_fails() {
    let (orch, service, _) = harness();
    assert!(!orch.inject_faults(FaultType::NetworkLatency, 5).await);
    assert!(service.calls().is_empty());
}

#[tokio::test]
async fn shutdown_is_idempotent() {
    let (orch, _, _) = harness();
    orch.shutdown().await;
    orch.startup().await.unwrap();
    orch.shutdown().await;
    orch.shutdown().await;
    assert!(!orch.is_started());
}

#[tokio::test(start_paused = true)]
async fn network_latency_degraded_then_healthy() {
    let (orch, service, metrics) = started().await;
    service.route(
        "GET /metrics/retry",
        vec![
            retry("NORMAL", "HEALTHY"),
            retry("ELEVATED", "DEGRADED"),
            retry("ELEVATED", "DEGRADED"),
            retry("NORMAL", "HEALTHY"),
        ],
    );

    assert!(orch.inject_faults_named("network_latency", 5).await);
    assert!(!orch.chaos_active());
    assert_eq!(*metrics.injections.lock(), vec![FaultType::NetworkLatency]);
    assert_eq!(*metrics.active.lock(), vec![true, false]);
    assert_eq!(
        service.calls()[0],
        "POST /chaos/faults/network_latency".to_string()
    );

    orch.await_withdrawals().await;
    assert_eq!(service.count("DELETE /chaos/faults/network_latency"), 1);
}

#[tokio::test(start_paused = true)]
async fn network_latency_without_recovery_fails_after_deadline() {
    let (orch, service, _) = started().await;
    service.route(
        "GET /metrics/retry",
        vec![retry("NORMAL", "HEALTHY"), retry("ELEVATED", "DEGRADED")],
    );

    let started_at = Instant::now();
    assert!(!orch.inject_faults(FaultType::NetworkLatency, 5).await);
    assert!(started_at.elapsed() >= Duration::from_secs(15));
    orch.await_withdrawals().await;
    assert_eq!(service.count("DELETE /chaos/faults/network_latency"), 1);
}

#[tokio::test(start_paused = true)]
async fn never_degraded_service_fails_at_deadline() {
    let (orch, service, _) = started().await;
    healthy_service(&service);

    let started_at = Instant::now();
    assert!(!orch.inject_faults(FaultType::NetworkLatency, 3).await);
    assert!(started_at.elapsed() >= Duration::from_secs(13));

    assert!(!orch.inject_model_loader_failure(3).await);
    assert!(!orch.inject_redis_failure(3).await);
    orch.await_withdrawals().await;
    for fault in FaultType::ALL {
        assert_eq!(service.count(&format!("DELETE /chaos/faults/{fault}")), 1);
    }
}

#[tokio::test(start_paused = true)]
async fn half_open_then_closed_recovers() {
    let (orch, service, _) = started().await;
    service.route(
        "GET /health",
        vec![
            health("DEGRADED", "OPEN"),
            health("DEGRADED", "HALF_OPEN"),
            health("HEALTHY", "CLOSED"),
        ],
    );
    assert!(orch.inject_model_loader_failure(5).await);
}

#[tokio::test(start_paused = true)]
async fn breaker_stuck_half_open_fails() {
    let (orch, service, _) = started().await;
    service.route(
        "GET /health",
        vec![health("DEGRADED", "OPEN"), health("DEGRADED", "HALF_OPEN")],
    );
    assert!(!orch.inject_model_loader_failure(5).await);
}

#[tokio::test(start_paused = true)]
async fn fault_is_withdrawn_after_duration_even_when_verified_early() {
    let (orch, service, _) = started().await;
    service.route(
        "GET /health",
        vec![health("DEGRADED", "OPEN"), health("HEALTHY", "CLOSED")],
    );

    assert!(orch.inject_model_loader_failure(20).await);
    assert_eq!(service.count("DELETE /chaos/faults/model_loader_failure"), 0);

    tokio::time::sleep(Duration::from_secs(21)).await;
    assert_eq!(service.count("DELETE /chaos/faults/model_loader_failure"), 1);
}

#[tokio::test(start_paused = true)]
async fn transport_errors_become_false() {
    let (orch, service, _) = started().await;
    service.route("GET /health", vec![Reply::Refused]);
    assert!(!orch.inject_model_loader_failure(5).await);
    orch.await_withdrawals().await;
    assert_eq!(service.count("DELETE /chaos/faults/model_loader_failure"), 1);
}

#[tokio::test(start_paused = true)]
async fn rejected_engagement_is_false_but_still_withdrawn() {
    let (orch, service, _) = started().await;
    healthy_service(&service);
    service.route(
        "POST /chaos/faults/redis_failure",
        vec![Reply::Ok(HttpResponse::new(500, json!({"error": "boom"})))],
    );
    assert!(!orch.inject_redis_failure(2).await);
    assert_eq!(service.count("GET /health"), 0);
    orch.await_withdrawals().await;
    assert_eq!(service.count("DELETE /chaos/faults/redis_failure"), 1);
}

#[tokio::test(start_paused = true)]
async fn redis_failure_degraded_then_healthy() {
    let (orch, service, _) = started().await;
    service.route(
        "GET /health",
        vec![
            health("HEALTHY", "CLOSED"),
            health("DEGRADED", "CLOSED"),
            health("DEGRADED", "CLOSED"),
            health("HEALTHY", "CLOSED"),
        ],
    );
    assert!(orch.inject_redis_failure(3).await);
    assert_eq!(service.count("GET /health"), 4);
}

#[tokio::test(start_paused = true)]
async fn redis_failure_stuck_degraded_fails() {
    let (orch, service, _) = started().await;
    service.route(
        "GET /health",
        vec![health("HEALTHY", "CLOSED"), health("DEGRADED", "CLOSED")],
    );

    let started_at = Instant::now();
    assert!(!orch.inject_redis_failure(3).await);
    assert!(started_at.elapsed() >= Duration::from_secs(13));
}

#[tokio::test(start_paused = true)]
async fn redis_failure_with_malformed_health_fails() {
    let (orch, service, _) = started().await;
    service.route(
        "GET /health",
        vec![
            health("DEGRADED", "CLOSED"),
            Reply::Ok(HttpResponse::ok(json!({"oops": true}))),
        ],
    );
    assert!(!orch.inject_redis_failure(3).await);
}

#[tokio::test(start_paused = true)]
async fn consensus_reads_leader_twice_then_quorum() {
    let (orch, service, _) = started().await;
    healthy_service(&service);

    assert!(orch.test_cluster_consensus().await);
    assert_eq!(
        service.calls(),
        vec!["GET /leader", "GET /leader", "GET /consensus"]
    );
}

#[tokio::test(start_paused = true)]
async fn consensus_waits_for_a_leader() {
    let (orch, service, _) = started().await;
    service.route(
        "GET /leader",
        vec![
            Reply::Ok(HttpResponse::new(404, json!({"error": "no leader"}))),
            leader("astra-b"),
            leader("astra-a"),
            leader("astra-a"),
        ],
    );
    service.route("GET /consensus", vec![consensus(true)]);
    assert!(orch.test_cluster_consensus().await);
    assert_eq!(service.count("GET /leader"), 4);
}

#[tokio::test(start_paused = true)]
async fn consensus_without_quorum_fails() {
    let (orch, service, metrics) = started().await;
    healthy_service(&service);
    service.route("GET /consensus", vec![consensus(false)]);
    assert!(!orch.test_cluster_consensus().await);
    assert!(metrics.injections.lock().is_empty());
    assert_eq!(
        *metrics.recoveries.lock(),
        vec![SCENARIO_CLUSTER_CONSENSUS.to_string()]
    );
}

#[tokio::test(start_paused = true)]
async fn full_suite_reports_four_scenarios() {
    let (orch, service, metrics) = started().await;
    reacting_service(&service);

    let results = orch.run_full_suite().await;
    let keys: Vec<_> = results.keys().cloned().collect();
    assert_eq!(
        keys,
        vec![
            "circuit_breaker",
            "cluster_consensus",
            "recovery_orchestrator",
            "retry_logic"
        ]
    );
    assert!(results.values().all(|passed| *passed));
    assert_eq!(metrics.injections.lock().len(), 3);
    assert_eq!(metrics.recoveries.lock().len(), 4);
    for fault in FaultType::ALL {
        assert_eq!(service.count(&format!("DELETE /chaos/faults/{fault}")), 1);
    }
}

#[tokio::test(start_paused = true)]
async fn full_suite_continues_after_failure() {
    let (orch, service, _) = started().await;
    reacting_service(&service);
    service.route("GET /health", vec![Reply::Refused]);

    let results = orch.run_full_suite().await;
    assert_eq!(results.len(), 4);
    assert!(!results[SCENARIO_CIRCUIT_BREAKER]);
    assert!(!results[SCENARIO_RECOVERY_ORCHESTRATOR]);
    assert!(results[SCENARIO_RETRY_LOGIC]);
    assert!(results[SCENARIO_CLUSTER_CONSENSUS]);
}

#[tokio::test(start_paused = true)]
async fn full_suite_fails_when_nothing_degrades() {
    let (orch, service, _) = started().await;
    healthy_service(&service);

    let results = orch.run_full_suite().await;
    assert!(!results[SCENARIO_CIRCUIT_BREAKER]);
    assert!(!results[SCENARIO_RETRY_LOGIC]);
    assert!(!results[SCENARIO_RECOVERY_ORCHESTRATOR]);
    assert!(results[SCENARIO_CLUSTER_CONSENSUS]);
}

#[tokio::test(start_paused = true)]
async fn shutdown_withdraws_mid_injection() {
    let (orch, service, _) = started().await;
    service.route("GET /health", vec![health("DEGRADED", "OPEN")]);

    let task = {
        let orch = Arc::clone(&orch);
        tokio::spawn(async move { orch.inject_model_loader_failure(600).await })
    };
    tokio::time::sleep(Duration::from_secs(2)).await;
    assert!(orch.chaos_active());

    let started_at = Instant::now();
    orch.shutdown().await;
    assert!(!task.await.unwrap());
    assert!(started_at.elapsed() < Duration::from_secs(1));
    assert_eq!(service.count("DELETE /chaos/faults/model_loader_failure"), 1);
    assert!(!orch.is_started());
    assert!(!orch.chaos_active());
}
