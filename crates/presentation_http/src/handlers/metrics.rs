//! Metrics and observability handlers
//!
//! JSON views of the retry policy, the recovery log and host resources, plus
//! the Prometheus text exposition.

use application::ResourceHealth;
use axum::{Json, extract::State};
use domain::{
    CircuitState, RecoveryAction, RecoveryActionKind, ResourceMetrics, ResourceSummary,
    RetryState, SystemSection,
};
use serde::Serialize;

use crate::state::{AppState, GUARDED_CIRCUIT};

/// Retry state with its sliding-window detail
#[derive(Debug, Clone, Serialize)]
pub struct RetryDetail {
    pub state: RetryState,
    pub failures_in_window: usize,
    pub in_state_secs: f64,
}

#[derive(Debug, Clone, Serialize)]
pub struct RetryMetricsResponse {
    pub retry: RetryDetail,
    pub system: SystemSection,
}

pub async fn get_retry_metrics(State(state): State<AppState>) -> Json<RetryMetricsResponse> {
    let snapshot = state.retry.snapshot();
    Json(RetryMetricsResponse {
        retry: RetryDetail {
            state: snapshot.state,
            failures_in_window: snapshot.failures_in_window,
            in_state_secs: snapshot.in_state_for.as_secs_f64(),
        },
        system: SystemSection {
            status: state.health.status(),
        },
    })
}

#[derive(Debug, Clone, Serialize)]
pub struct RecoveryMetricsResponse {
    pub action_count: usize,
    pub actions: Vec<RecoveryActionKind>,
    /// Full entries, oldest first
    pub log: Vec<RecoveryAction>,
}

pub async fn get_recovery_metrics(State(state): State<AppState>) -> Json<RecoveryMetricsResponse> {
    let log = state.recovery().action_log();
    Json(RecoveryMetricsResponse {
        action_count: log.len(),
        actions: log.iter().map(|a| a.kind).collect(),
        log,
    })
}

#[derive(Debug, Clone, Serialize)]
pub struct ResourceMetricsResponse {
    pub enabled: bool,
    pub metrics: ResourceMetrics,
    pub health: ResourceHealth,
    pub available: bool,
    pub summary: ResourceSummary,
}

/// Take a fresh sample and report it with its classification
pub async fn get_resource_metrics(
    State(state): State<AppState>,
) -> Json<ResourceMetricsResponse> {
    let resources = state.resources.as_ref();
    let metrics = resources.current_metrics();
    let health = resources.classify(&metrics);
    Json(ResourceMetricsResponse {
        enabled: resources.is_enabled(),
        metrics,
        available: health.overall() != domain::ResourceStatus::Critical,
        health,
        summary: resources.summary(),
    })
}

const fn circuit_gauge(state: CircuitState) -> u8 {
    match state {
        CircuitState::Closed => 0,
        CircuitState::HalfOpen => 1,
        CircuitState::Open => 2,
    }
}

const fn retry_gauge(state: RetryState) -> u8 {
    match state {
        RetryState::Normal => 0,
        RetryState::Elevated => 1,
    }
}

/// Prometheus-compatible metrics endpoint
pub async fn get_metrics_prometheus(State(state): State<AppState>) -> String {
    state.sync_chaos_gauge();
    let mut output = state.metrics.render_prometheus();
    output.push('\n');

    let breaker = state.breaker.snapshot();
    output.push_str(&format!(
        "# HELP circuit_breaker_state Circuit state (0=closed, 1=half_open, 2=open)\n\
         # TYPE circuit_breaker_state gauge\n\
         circuit_breaker_state{{circuit=\"{GUARDED_CIRCUIT}\"}} {}\n\n",
        circuit_gauge(breaker.state)
    ));

    output.push_str(&format!(
        "# HELP circuit_breaker_open_duration_seconds Current open duration after backoff\n\
         # TYPE circuit_breaker_open_duration_seconds gauge\n\
         circuit_breaker_open_duration_seconds{{circuit=\"{GUARDED_CIRCUIT}\"}} {:.3}\n\n",
        breaker.open_duration.as_secs_f64()
    ));

    let retry = state.retry.snapshot();
    output.push_str(&format!(
        "# HELP retry_state Retry state (0=normal, 1=elevated)\n\
         # TYPE retry_state gauge\n\
         retry_state {}\n\n",
        retry_gauge(retry.state)
    ));

    output.push_str(&format!(
        "# HELP retry_failures_in_window Failures in the retry sliding window\n\
         # TYPE retry_failures_in_window gauge\n\
         retry_failures_in_window {}\n\n",
        retry.failures_in_window
    ));

    output.push_str(&format!(
        "# HELP recovery_actions Recovery actions in the log\n\
         # TYPE recovery_actions gauge\n\
         recovery_actions {}\n\n",
        state.recovery().action_count()
    ));

    let round = state.consensus.compute_round();
    output.push_str(&format!(
        "# HELP consensus_quorum_met Whether quorum is met\n\
         # TYPE consensus_quorum_met gauge\n\
         consensus_quorum_met {}\n\n\
         # HELP consensus_voting_instances Members heartbeating within the timeout\n\
         # TYPE consensus_voting_instances gauge\n\
         consensus_voting_instances {}\n\n\
         # HELP consensus_known_instances Registered members\n\
         # TYPE consensus_known_instances gauge\n\
         consensus_known_instances {}\n\n",
        i32::from(round.quorum_met),
        round.voting_instances,
        round.known_instances
    ));

    output.push_str(&format!(
        "# HELP chaos_faults_engaged Faults currently engaged on this instance\n\
         # TYPE chaos_faults_engaged gauge\n\
         chaos_faults_engaged {}\n",
        state.switchboard.engaged().len()
    ));

    output
}
