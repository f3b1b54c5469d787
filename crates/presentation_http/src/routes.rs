//! Route definitions

use axum::{
    Router,
    routing::{get, post},
};
use tower_http::trace::TraceLayer;

use crate::{handlers, middleware::RequestIdLayer, state::AppState};

/// Create the main router with all routes
pub fn create_router(state: AppState) -> Router {
    Router::new()
        // Health
        .route("/health", get(handlers::health::health_check))
        .route("/ready", get(handlers::health::readiness_check))
        // Metrics
        .route("/metrics/retry", get(handlers::metrics::get_retry_metrics))
        .route("/metrics/recovery", get(handlers::metrics::get_recovery_metrics))
        .route("/metrics/resources", get(handlers::metrics::get_resource_metrics))
        .route("/metrics/prometheus", get(handlers::metrics::get_metrics_prometheus))
        // Cluster
        .route("/leader", get(handlers::cluster::get_leader))
        .route("/consensus", get(handlers::cluster::get_consensus))
        .route("/cluster/nodes", get(handlers::cluster::list_nodes))
        .route("/cluster/heartbeat", post(handlers::cluster::heartbeat))
        // Fault control
        .route("/chaos/faults", get(handlers::chaos::list_faults))
        .route(
            "/chaos/faults/{fault_type}",
            post(handlers::chaos::engage_fault).delete(handlers::chaos::withdraw_fault),
        )
        .layer(TraceLayer::new_for_http())
        .layer(RequestIdLayer::new())
        .with_state(state)
}
