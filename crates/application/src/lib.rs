//! Application layer - Use cases and orchestration
//!
//! Contains the resilience use cases (health aggregation, recovery,
//! dependency probing, resource monitoring) and the chaos verification
//! harness, together with the port definitions they depend on.
//! Infrastructure adapters implement the ports.

pub mod error;
pub mod ports;
pub mod services;

pub use error::ApplicationError;
pub use ports::*;
pub use services::*;
