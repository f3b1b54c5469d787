//! How an engaged fault manifests on a guarded call

use std::time::Duration;

use domain::FaultType;
use rand::Rng;
use serde::{Deserialize, Serialize};

/// Uniformly distributed latency added before a call
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct LatencyDistribution {
    pub min: Duration,
    pub max: Duration,
}

impl LatencyDistribution {
    /// Create a constant latency (no variation)
    pub const fn constant(duration: Duration) -> Self {
        Self {
            min: duration,
            max: duration,
        }
    }

    /// Create a uniformly distributed latency range
    pub const fn uniform(min: Duration, max: Duration) -> Self {
        Self { min, max }
    }

    /// Sample a latency value from this distribution
    #[allow(clippy::cast_possible_truncation)]
    pub fn sample(&self) -> Duration {
        let min = self.min.as_nanos();
        let max = self.max.as_nanos();
        if max <= min {
            return self.min;
        }
        let nanos = rand::rng().random_range(min..=max);
        Duration::from_nanos(nanos as u64)
    }
}

impl Default for LatencyDistribution {
    fn default() -> Self {
        Self::uniform(Duration::from_millis(100), Duration::from_millis(500))
    }
}

/// Effect of an engaged fault on each intercepted call
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FaultPolicy {
    /// Probability that an intercepted call fails (0.0 to 1.0)
    pub fault_rate: f64,
    /// Latency added before the call, failing or not
    pub latency: Option<LatencyDistribution>,
}

impl FaultPolicy {
    /// Every call fails immediately
    pub const fn always_fail() -> Self {
        Self {
            fault_rate: 1.0,
            latency: None,
        }
    }

    /// Calls are slowed and fail with probability `fault_rate`
    pub const fn latency(fault_rate: f64, latency: LatencyDistribution) -> Self {
        Self {
            fault_rate,
            latency: Some(latency),
        }
    }

    /// Calls proceed untouched
    pub const fn never() -> Self {
        Self {
            fault_rate: 0.0,
            latency: None,
        }
    }

    /// Built-in behaviour of each fault type
    ///
    /// The model loader and the cache go down hard; the upstream becomes
    /// slow and drops most requests.
    pub const fn for_fault(fault_type: FaultType) -> Self {
        match fault_type {
            FaultType::ModelLoaderFailure | FaultType::RedisFailure => Self::always_fail(),
            FaultType::NetworkLatency => Self::latency(
                0.8,
                LatencyDistribution::uniform(Duration::from_millis(200), Duration::from_millis(800)),
            ),
        }
    }

    /// Check if a fault should be injected based on probability
    pub fn should_fail(&self) -> bool {
        if self.fault_rate <= 0.0 {
            return false;
        }
        if self.fault_rate >= 1.0 {
            return true;
        }
        rand::rng().random::<f64>() < self.fault_rate
    }
}
