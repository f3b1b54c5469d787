//! AstraGuard HTTP presentation layer
//!
//! Serves the health, metrics, cluster and fault-control endpoints of one
//! resilience instance and runs its background loops.

pub mod error;
pub mod handlers;
pub mod middleware;
pub mod routes;
pub mod runtime;
pub mod state;
pub mod tasks;

pub use error::ApiError;
pub use middleware::{REQUEST_ID_HEADER, RequestIdLayer};
pub use routes::create_router;
pub use runtime::Runtime;
pub use state::AppState;
