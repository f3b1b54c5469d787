//! Chaos and recovery metrics
//!
//! An explicitly constructed registry shared by `Arc`; there is no global
//! recorder.

mod registry;

pub use registry::{MetricsRegistry, RecoveryObservations};
