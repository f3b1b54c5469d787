//! Response shapes polled by the chaos harness and their classification

use domain::{CircuitState, RecoveryActionKind, RetryState, SystemStatus};
use serde::Deserialize;

use crate::error::ApplicationError;
use crate::ports::HttpResponse;

#[derive(Debug, Deserialize)]
pub(super) struct StatusDoc {
    pub status: SystemStatus,
}

#[derive(Debug, Deserialize)]
pub(super) struct StateDoc<S> {
    pub state: S,
}

/// `GET /health`
#[derive(Debug, Deserialize)]
pub(super) struct HealthDoc {
    pub system: StatusDoc,
    pub circuit_breaker: StateDoc<CircuitState>,
    pub retry: StateDoc<RetryState>,
}

/// `GET /metrics/retry`
#[derive(Debug, Deserialize)]
pub(super) struct RetryDoc {
    pub retry: StateDoc<RetryState>,
    pub system: StatusDoc,
}

/// `GET /metrics/recovery`
#[derive(Debug, Deserialize)]
pub(super) struct RecoveryDoc {
    pub action_count: usize,
    pub actions: Vec<String>,
}

/// `GET /leader`
#[derive(Debug, Deserialize)]
pub(super) struct LeaderDoc {
    pub instance_id: String,
}

/// `GET /consensus`
#[derive(Debug, Deserialize)]
pub(super) struct ConsensusDoc {
    pub quorum_met: bool,
    pub voting_instances: usize,
}

/// What one poll says about the dependency under fault
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(super) enum Observation {
    Nominal,
    Degraded,
    /// Degraded but visibly probing (a half-open breaker)
    Recovering,
}

pub(super) type Classifier = fn(&HttpResponse) -> Result<Observation, ApplicationError>;

pub(super) type Assertion = fn(&HttpResponse) -> Result<bool, ApplicationError>;

/// Classify `/health` by circuit breaker state
pub(super) fn classify_breaker(resp: &HttpResponse) -> Result<Observation, ApplicationError> {
    let doc: HealthDoc = resp.json()?;
    Ok(match doc.circuit_breaker.state {
        CircuitState::Closed => Observation::Nominal,
        CircuitState::Open => Observation::Degraded,
        CircuitState::HalfOpen => Observation::Recovering,
    })
}

/// Classify `/metrics/retry` by retry state and overall status
pub(super) fn classify_retry(resp: &HttpResponse) -> Result<Observation, ApplicationError> {
    let doc: RetryDoc = resp.json()?;
    Ok(
        if doc.retry.state == RetryState::Elevated || doc.system.status == SystemStatus::Degraded {
            Observation::Degraded
        } else {
            Observation::Nominal
        },
    )
}

/// Classify `/health` by overall status and retry state
pub(super) fn classify_system(resp: &HttpResponse) -> Result<Observation, ApplicationError> {
    let doc: HealthDoc = resp.json()?;
    Ok(
        if doc.system.status == SystemStatus::Degraded || doc.retry.state == RetryState::Elevated {
            Observation::Degraded
        } else {
            Observation::Nominal
        },
    )
}

/// Breaker is closed or probing
pub(super) fn breaker_settled(resp: &HttpResponse) -> Result<bool, ApplicationError> {
    let doc: HealthDoc = resp.json()?;
    Ok(matches!(
        doc.circuit_breaker.state,
        CircuitState::Closed | CircuitState::HalfOpen
    ))
}

/// Retries are back to normal
pub(super) fn retry_settled(resp: &HttpResponse) -> Result<bool, ApplicationError> {
    let doc: RetryDoc = resp.json()?;
    Ok(doc.retry.state == RetryState::Normal)
}

/// At least one known remediation has been recorded
pub(super) fn recovery_recorded(resp: &HttpResponse) -> Result<bool, ApplicationError> {
    let doc: RecoveryDoc = resp.json()?;
    let known = doc
        .actions
        .iter()
        .any(|a| a.parse::<RecoveryActionKind>().is_ok());
    Ok(doc.action_count > 0 && known)
}
