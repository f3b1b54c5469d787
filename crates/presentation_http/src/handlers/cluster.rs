//! Cluster membership and consensus handlers

use axum::{Json, extract::State};
use domain::{ClusterNode, ConsensusRound, InstanceId};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::{error::ApiError, state::AppState};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LeaderResponse {
    pub instance_id: InstanceId,
}

/// Currently elected leader; 404 when no candidate is alive
pub async fn get_leader(State(state): State<AppState>) -> Result<Json<LeaderResponse>, ApiError> {
    state
        .consensus
        .current_leader()
        .map(|instance_id| Json(LeaderResponse { instance_id }))
        .ok_or_else(|| ApiError::NotFound("no leader elected".to_string()))
}

pub async fn get_consensus(State(state): State<AppState>) -> Json<ConsensusRound> {
    Json(state.consensus.compute_round())
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NodesResponse {
    pub nodes: Vec<ClusterNode>,
}

/// Known members, ordered by instance id
pub async fn list_nodes(State(state): State<AppState>) -> Json<NodesResponse> {
    Json(NodesResponse {
        nodes: state.consensus.nodes(),
    })
}

/// Heartbeat request
///
/// The id is validated here rather than during deserialization so a bad id
/// gets the usual error body.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HeartbeatRequest {
    pub instance_id: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HeartbeatResponse {
    pub instance_id: InstanceId,
    pub known_instances: usize,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub leader_id: Option<InstanceId>,
}

/// Member heartbeat; unknown ids are registered
pub async fn heartbeat(
    State(state): State<AppState>,
    Json(request): Json<HeartbeatRequest>,
) -> Result<Json<HeartbeatResponse>, ApiError> {
    let instance_id = InstanceId::parse(request.instance_id)?;
    debug!(instance_id = %instance_id, "Heartbeat received");

    state.consensus.heartbeat(instance_id.clone());
    let round = state.consensus.compute_round();

    Ok(Json(HeartbeatResponse {
        instance_id,
        known_instances: round.known_instances,
        leader_id: round.leader_id,
    }))
}
