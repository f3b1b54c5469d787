//! Health check handlers

use axum::{Json, extract::State, http::StatusCode};
use domain::HealthSnapshot;
use serde::{Deserialize, Serialize};

use crate::state::AppState;

/// Aggregate health document
///
/// Always answers 200; degradation is reported in the body so pollers can
/// tell a degraded service from an unreachable one.
pub async fn health_check(State(state): State<AppState>) -> Json<HealthSnapshot> {
    Json(state.health.snapshot())
}

/// Readiness response
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReadinessResponse {
    pub ready: bool,
    pub quorum_met: bool,
    pub resources_available: bool,
    pub version: String,
}

/// Readiness check - quorum is met and no host resource is critical
pub async fn readiness_check(
    State(state): State<AppState>,
) -> (StatusCode, Json<ReadinessResponse>) {
    let quorum_met = state.consensus.compute_round().quorum_met;
    let resources_available = state.resources.is_available();
    let ready = quorum_met && resources_available;
    let status_code = if ready {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    };

    (
        status_code,
        Json(ReadinessResponse {
            ready,
            quorum_met,
            resources_available,
            version: env!("CARGO_PKG_VERSION").to_string(),
        }),
    )
}
