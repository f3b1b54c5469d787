//! Fault control handlers
//!
//! Engaging a fault makes this instance's guarded dependencies misbehave
//! until the fault expires or is withdrawn.

use std::time::Duration;

use application::{ChaosMetricsPort, EngagedFault};
use axum::{
    Json,
    body::Bytes,
    extract::{Path, State},
    http::StatusCode,
};
use domain::FaultType;
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::{error::ApiError, state::AppState};

/// Optional body of `POST /chaos/faults/{fault_type}`
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct EngageRequest {
    #[serde(default)]
    pub duration_secs: Option<u64>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EngageResponse {
    pub fault_type: FaultType,
    pub engaged: bool,
    pub duration_secs: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WithdrawResponse {
    pub fault_type: FaultType,
    /// False when the fault had already expired or was never engaged
    pub withdrawn: bool,
}

#[derive(Debug, Clone, Serialize)]
pub struct FaultListResponse {
    pub faults: Vec<EngagedFault>,
}

fn parse_fault(raw: &str) -> Result<FaultType, ApiError> {
    Ok(raw.parse::<FaultType>()?)
}

fn parse_engage_request(body: &[u8]) -> Result<EngageRequest, ApiError> {
    if body.iter().all(u8::is_ascii_whitespace) {
        return Ok(EngageRequest::default());
    }
    serde_json::from_slice(body).map_err(|e| ApiError::BadRequest(format!("invalid body: {e}")))
}

/// Engage a fault for `duration_secs` (configured default when omitted)
pub async fn engage_fault(
    State(state): State<AppState>,
    Path(fault_type): Path<String>,
    body: Bytes,
) -> Result<(StatusCode, Json<EngageResponse>), ApiError> {
    let fault_type = parse_fault(&fault_type)?;
    let request = parse_engage_request(&body)?;
    let duration_secs = request
        .duration_secs
        .unwrap_or(state.config.chaos.default_duration_secs);
    if duration_secs == 0 {
        return Err(ApiError::BadRequest(
            "duration_secs must be at least 1".to_string(),
        ));
    }

    state
        .switchboard
        .engage(fault_type, Duration::from_secs(duration_secs));
    state.metrics.record_injection(fault_type);
    state.metrics.set_chaos_active(true);
    info!(fault_type = %fault_type, duration_secs, "Fault engaged via control surface");

    Ok((
        StatusCode::ACCEPTED,
        Json(EngageResponse {
            fault_type,
            engaged: true,
            duration_secs,
        }),
    ))
}

pub async fn withdraw_fault(
    State(state): State<AppState>,
    Path(fault_type): Path<String>,
) -> Result<Json<WithdrawResponse>, ApiError> {
    let fault_type = parse_fault(&fault_type)?;
    let withdrawn = state.switchboard.withdraw(fault_type);
    state.sync_chaos_gauge();
    info!(fault_type = %fault_type, withdrawn, "Fault withdrawn via control surface");
    Ok(Json(WithdrawResponse {
        fault_type,
        withdrawn,
    }))
}

pub async fn list_faults(State(state): State<AppState>) -> Json<FaultListResponse> {
    Json(FaultListResponse {
        faults: state.switchboard.engaged(),
    })
}
