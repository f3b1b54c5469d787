//! Fault injection record - Lifetime of one chaos injection

use std::time::Duration;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::value_objects::FaultType;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FaultInjectionRecord {
    pub fault_type: FaultType,
    pub duration_seconds: u64,
    pub started_at: DateTime<Utc>,
    pub completed_at: Option<DateTime<Utc>>,
    pub recovered: bool,
}

impl FaultInjectionRecord {
    /// Start a new injection record
    #[must_use]
    pub fn start(fault_type: FaultType, duration_seconds: u64) -> Self {
        Self {
            fault_type,
            duration_seconds,
            started_at: Utc::now(),
            completed_at: None,
            recovered: false,
        }
    }

    /// Mark the verification as finished
    pub fn complete(&mut self, recovered: bool) {
        self.completed_at = Some(Utc::now());
        self.recovered = recovered;
    }

    #[must_use]
    pub const fn is_complete(&self) -> bool {
        self.completed_at.is_some()
    }

    /// Time the fault stays engaged
    #[must_use]
    pub const fn window(&self) -> Duration {
        Duration::from_secs(self.duration_seconds)
    }

    /// Wall-clock time from start to completion, if completed
    #[must_use]
    pub fn elapsed(&self) -> Option<Duration> {
        self.completed_at
            .and_then(|done| done.signed_duration_since(self.started_at).to_std().ok())
    }
}
