//! Server-side fault injection
//!
//! The chaos harness engages faults over HTTP; they land on the
//! [`FaultSwitchboard`]. Dependency adapters are wrapped in
//! [`GuardedDependency`] / [`GuardedCachePurge`], which consult the
//! [`FaultInjector`] before every call and fail or slow down according to
//! the engaged fault's [`FaultPolicy`].
//!
//! # Example
//!
//! ```ignore
//! use infrastructure::chaos::{FaultInjector, FaultSwitchboard, GuardedDependency};
//!
//! let switchboard = Arc::new(FaultSwitchboard::new());
//! let injector = FaultInjector::new(Arc::clone(&switchboard));
//! let loader = GuardedDependency::new(loader, FaultType::ModelLoaderFailure, injector);
//!
//! switchboard.engage(FaultType::ModelLoaderFailure, Duration::from_secs(5));
//! assert!(loader.check().await.is_err());
//! ```

mod fault_injector;
mod fault_policy;
mod guarded;
mod switchboard;

pub use fault_injector::{FaultInjector, InjectedError};
pub use fault_policy::{FaultPolicy, LatencyDistribution};
pub use guarded::{GuardedCachePurge, GuardedDependency};
pub use switchboard::{ChaosStats, FaultSwitchboard};
