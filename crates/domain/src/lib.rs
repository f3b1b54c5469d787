//! Domain layer for AstraGuard cluster resilience
//!
//! Contains the vocabulary shared by every other layer: breaker and retry
//! states, recovery actions, cluster membership, consensus rounds, health
//! snapshots, fault injection records and resource metrics.
//! This layer has no I/O and no runtime dependencies.

pub mod entities;
pub mod errors;
pub mod value_objects;

pub use entities::*;
pub use errors::DomainError;
pub use value_objects::*;
