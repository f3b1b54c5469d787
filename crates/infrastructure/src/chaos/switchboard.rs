//! Registry of currently engaged faults
//!
//! Each engagement carries a deadline; a fault whose deadline has passed is
//! treated as withdrawn even if the harness never sent the DELETE.

use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

use application::{EngagedFault, FaultSwitchPort};
use domain::FaultType;
use parking_lot::RwLock;
use serde::{Deserialize, Serialize};
use tokio::time::Instant;
use tracing::{info, warn};

/// Statistics about fault injection
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChaosStats {
    pub engagements: u64,
    pub withdrawals: u64,
    /// Guarded calls that were failed by an engaged fault
    pub calls_failed: u64,
    /// Guarded calls that were only delayed
    pub calls_delayed: u64,
}

#[derive(Debug, Default)]
pub struct FaultSwitchboard {
    deadlines: RwLock<HashMap<FaultType, Instant>>,
    engagements: AtomicU64,
    withdrawals: AtomicU64,
    calls_failed: AtomicU64,
    calls_delayed: AtomicU64,
}

impl FaultSwitchboard {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn engage_at(&self, fault_type: FaultType, duration: Duration, now: Instant) {
        let deadline = now + duration;
        let mut deadlines = self.deadlines.write();
        let extended = deadlines.insert(fault_type, deadline).is_some();
        self.engagements.fetch_add(1, Ordering::Relaxed);
        warn!(
            fault_type = %fault_type,
            duration_secs = duration.as_secs(),
            extended,
            "Fault engaged"
        );
    }

    pub fn is_engaged_at(&self, fault_type: FaultType, now: Instant) -> bool {
        self.deadlines
            .read()
            .get(&fault_type)
            .is_some_and(|deadline| *deadline > now)
    }

    pub fn engaged_at(&self, now: Instant) -> Vec<EngagedFault> {
        let mut list: Vec<EngagedFault> = self
            .deadlines
            .read()
            .iter()
            .filter(|(_, deadline)| **deadline > now)
            .map(|(ft, deadline)| EngagedFault {
                fault_type: *ft,
                remaining_secs: deadline.saturating_duration_since(now).as_secs(),
            })
            .collect();
        list.sort_by_key(|f| f.fault_type);
        list
    }

    pub(super) fn record_failed(&self) {
        self.calls_failed.fetch_add(1, Ordering::Relaxed);
    }

    pub(super) fn record_delayed(&self) {
        self.calls_delayed.fetch_add(1, Ordering::Relaxed);
    }

    pub fn stats(&self) -> ChaosStats {
        ChaosStats {
            engagements: self.engagements.load(Ordering::Relaxed),
            withdrawals: self.withdrawals.load(Ordering::Relaxed),
            calls_failed: self.calls_failed.load(Ordering::Relaxed),
            calls_delayed: self.calls_delayed.load(Ordering::Relaxed),
        }
    }
}

impl FaultSwitchPort for FaultSwitchboard {
    fn engage(&self, fault_type: FaultType, duration: Duration) {
        self.engage_at(fault_type, duration, Instant::now());
    }

    fn withdraw(&self, fault_type: FaultType) -> bool {
        let now = Instant::now();
        let removed = self.deadlines.write().remove(&fault_type);
        let was_engaged = removed.is_some_and(|deadline| deadline > now);
        if was_engaged {
            self.withdrawals.fetch_add(1, Ordering::Relaxed);
            info!(fault_type = %fault_type, "Fault withdrawn");
        }
        was_engaged
    }

    fn is_engaged(&self, fault_type: FaultType) -> bool {
        self.is_engaged_at(fault_type, Instant::now())
    }

    fn engaged(&self) -> Vec<EngagedFault> {
        self.engaged_at(Instant::now())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn nothing_engaged_initially() {
        let board = FaultSwitchboard::new();
        assert!(board.engaged().is_empty());
        assert!(!board.is_engaged(FaultType::RedisFailure));
    }

    #[tokio::test(start_paused = true)]
    async fn fault_expires_at_deadline() {
        let board = FaultSwitchboard::new();
        board.engage(FaultType::NetworkLatency, Duration::from_secs(5));
        assert!(board.is_engaged(FaultType::NetworkLatency));

        tokio::time::advance(Duration::from_secs(4)).await;
        assert_eq!(board.engaged()[0].remaining_secs, 1);

        tokio::time::advance(Duration::from_secs(2)).await;
        assert!(!board.is_engaged(FaultType::NetworkLatency));
        assert!(!board.withdraw(FaultType::NetworkLatency));
    }

    #[test]
    fn withdraw_reports_prior_engagement() {
        let board = FaultSwitchboard::new();
        board.engage(FaultType::ModelLoaderFailure, Duration::from_secs(30));
        assert!(board.withdraw(FaultType::ModelLoaderFailure));
        assert!(!board.withdraw(FaultType::ModelLoaderFailure));
        assert_eq!(board.stats().withdrawals, 1);
    }

    #[test]
    fn reengaging_extends_deadline() {
        let board = FaultSwitchboard::new();
        let now = Instant::now();
        board.engage_at(FaultType::RedisFailure, Duration::from_secs(2), now);
        board.engage_at(FaultType::RedisFailure, Duration::from_secs(10), now);
        assert!(board.is_engaged_at(FaultType::RedisFailure, now + Duration::from_secs(5)));
        assert_eq!(board.stats().engagements, 2);
        assert_eq!(board.engaged_at(now).len(), 1);
    }

    #[test]
    fn engaged_list_is_sorted() {
        let board = FaultSwitchboard::new();
        board.engage(FaultType::RedisFailure, Duration::from_secs(10));
        board.engage(FaultType::ModelLoaderFailure, Duration::from_secs(10));
        let kinds: Vec<_> = board.engaged().into_iter().map(|f| f.fault_type).collect();
        assert_eq!(kinds, vec![FaultType::ModelLoaderFailure, FaultType::RedisFailure]);
    }
}
