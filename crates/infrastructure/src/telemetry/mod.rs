//! Logging initialization
//!
//! Installs a `tracing-subscriber` registry with an `EnvFilter` and a `fmt`
//! layer emitting either JSON or human-readable text.

mod logging;

pub use logging::{LogFormat, TelemetryError, init_logging};
