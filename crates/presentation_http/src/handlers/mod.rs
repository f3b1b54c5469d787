//! HTTP request handlers

pub mod chaos;
pub mod cluster;
pub mod health;
pub mod metrics;
