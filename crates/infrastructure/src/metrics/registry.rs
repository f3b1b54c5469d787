//! Counters, gauges and recovery-time observations with Prometheus output

use std::collections::BTreeMap;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::time::{Duration, Instant};

use application::ChaosMetricsPort;
use domain::FaultType;
use parking_lot::Mutex;
use serde::Serialize;

/// Recovery times observed for one scenario
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct RecoveryObservations {
    pub count: u64,
    pub sum_seconds: f64,
    pub max_seconds: f64,
    pub last_seconds: f64,
}

impl RecoveryObservations {
    fn observe(&mut self, elapsed: Duration) {
        let secs = elapsed.as_secs_f64();
        self.count += 1;
        self.sum_seconds += secs;
        self.max_seconds = self.max_seconds.max(secs);
        self.last_seconds = secs;
    }
}

#[derive(Debug)]
pub struct MetricsRegistry {
    start_time: Instant,
    /// Indexed by position in [`FaultType::ALL`]
    injections: [AtomicU64; FaultType::ALL.len()],
    chaos_active: AtomicBool,
    recovery: Mutex<BTreeMap<String, RecoveryObservations>>,
}

impl Default for MetricsRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl MetricsRegistry {
    #[must_use]
    pub fn new() -> Self {
        Self {
            start_time: Instant::now(),
            injections: std::array::from_fn(|_| AtomicU64::new(0)),
            chaos_active: AtomicBool::new(false),
            recovery: Mutex::new(BTreeMap::new()),
        }
    }

    fn slot(fault_type: FaultType) -> usize {
        FaultType::ALL
            .iter()
            .position(|ft| *ft == fault_type)
            .unwrap_or_default()
    }

    pub fn injection_count(&self, fault_type: FaultType) -> u64 {
        self.injections[Self::slot(fault_type)].load(Ordering::Relaxed)
    }

    pub fn chaos_active(&self) -> bool {
        self.chaos_active.load(Ordering::Relaxed)
    }

    pub fn recovery_observations(&self, scenario: &str) -> RecoveryObservations {
        self.recovery
            .lock()
            .get(scenario)
            .copied()
            .unwrap_or_default()
    }

    pub fn uptime_seconds(&self) -> u64 {
        self.start_time.elapsed().as_secs()
    }

    /// Prometheus text exposition of every metric
    pub fn render_prometheus(&self) -> String {
        let mut output = String::new();

        output.push_str(&format!(
            "# HELP app_uptime_seconds Application uptime in seconds\n\
             # TYPE app_uptime_seconds counter\n\
             app_uptime_seconds {}\n\n",
            self.uptime_seconds()
        ));

        output.push_str(
            "# HELP chaos_injections Chaos fault injections attempted\n\
             # TYPE chaos_injections counter\n",
        );
        for ft in FaultType::ALL {
            output.push_str(&format!(
                "chaos_injections{{fault_type=\"{}\"}} {}\n",
                ft.metric_label(),
                self.injection_count(ft)
            ));
        }
        output.push('\n');

        output.push_str(&format!(
            "# HELP chaos_active Whether a chaos experiment is running\n\
             # TYPE chaos_active gauge\n\
             chaos_active {}\n\n",
            i32::from(self.chaos_active())
        ));

        output.push_str(
            "# HELP chaos_recovery_seconds Time from injection to observed recovery\n\
             # TYPE chaos_recovery_seconds summary\n",
        );
        for (scenario, obs) in self.recovery.lock().iter() {
            output.push_str(&format!(
                "chaos_recovery_seconds_count{{scenario=\"{scenario}\"}} {}\n\
                 chaos_recovery_seconds_sum{{scenario=\"{scenario}\"}} {:.3}\n\
                 chaos_recovery_seconds_max{{scenario=\"{scenario}\"}} {:.3}\n\
                 chaos_recovery_seconds_last{{scenario=\"{scenario}\"}} {:.3}\n",
                obs.count, obs.sum_seconds, obs.max_seconds, obs.last_seconds
            ));
        }

        output
    }
}

impl ChaosMetricsPort for MetricsRegistry {
    fn record_injection(&self, fault_type: FaultType) {
        self.injections[Self::slot(fault_type)].fetch_add(1, Ordering::Relaxed);
    }

    fn set_chaos_active(&self, active: bool) {
        self.chaos_active.store(active, Ordering::Relaxed);
    }

    fn observe_recovery_time(&self, scenario: &str, elapsed: Duration) {
        self.recovery
            .lock()
            .entry(scenario.to_string())
            .or_default()
            .observe(elapsed);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn starts_empty() {
        let registry = MetricsRegistry::new();
        for ft in FaultType::ALL {
            assert_eq!(registry.injection_count(ft), 0);
        }
        assert!(!registry.chaos_active());
        assert_eq!(registry.recovery_observations("retry_logic").count, 0);
    }

    #[test]
    fn injections_are_counted_per_fault_type() {
        let registry = MetricsRegistry::new();
        registry.record_injection(FaultType::NetworkLatency);
        registry.record_injection(FaultType::NetworkLatency);
        registry.record_injection(FaultType::RedisFailure);

        assert_eq!(registry.injection_count(FaultType::NetworkLatency), 2);
        assert_eq!(registry.injection_count(FaultType::RedisFailure), 1);
        assert_eq!(registry.injection_count(FaultType::ModelLoaderFailure), 0);
    }

    #[test]
    fn recovery_observations_accumulate() {
        let registry = MetricsRegistry::new();
        registry.observe_recovery_time("circuit_breaker", Duration::from_secs(4));
        registry.observe_recovery_time("circuit_breaker", Duration::from_secs(2));

        let obs = registry.recovery_observations("circuit_breaker");
        assert_eq!(obs.count, 2);
        assert!((obs.sum_seconds - 6.0).abs() < 1e-9);
        assert!((obs.max_seconds - 4.0).abs() < 1e-9);
        assert!((obs.last_seconds - 2.0).abs() < 1e-9);
    }

    #[test]
    fn prometheus_output_has_preambles_and_labels() {
        let registry = MetricsRegistry::new();
        registry.record_injection(FaultType::ModelLoaderFailure);
        registry.set_chaos_active(true);
        registry.observe_recovery_time("retry_logic", Duration::from_millis(1500));

        let text = registry.render_prometheus();
        assert!(text.contains("# TYPE chaos_injections counter"));
        assert!(text.contains("chaos_injections{fault_type=\"model_loader\"} 1"));
        assert!(text.contains("chaos_injections{fault_type=\"redis\"} 0"));
        assert!(text.contains("# TYPE chaos_active gauge"));
        assert!(text.contains("chaos_active 1"));
        assert!(text.contains("chaos_recovery_seconds_count{scenario=\"retry_logic\"} 1"));
        assert!(text.contains("chaos_recovery_seconds_last{scenario=\"retry_logic\"} 1.500"));
    }
}
