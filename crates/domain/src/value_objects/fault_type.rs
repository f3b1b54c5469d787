//! Chaos fault type value object

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::errors::DomainError;

/// A dependency degradation the chaos harness knows how to inject
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FaultType {
    /// The anomaly model loader fails every load attempt
    ModelLoaderFailure,
    /// The telemetry upstream becomes slow and drops requests
    NetworkLatency,
    /// The telemetry cache stops answering
    RedisFailure,
}

impl FaultType {
    /// All supported fault types
    pub const ALL: [Self; 3] = [
        Self::ModelLoaderFailure,
        Self::NetworkLatency,
        Self::RedisFailure,
    ];

    /// Canonical name, as accepted by `FromStr` and the control surface
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::ModelLoaderFailure => "model_loader_failure",
            Self::NetworkLatency => "network_latency",
            Self::RedisFailure => "redis_failure",
        }
    }

    /// Label used for the `chaos_injections{fault_type}` counter
    #[must_use]
    pub const fn metric_label(&self) -> &'static str {
        match self {
            Self::ModelLoaderFailure => "model_loader",
            Self::NetworkLatency => "network_latency",
            Self::RedisFailure => "redis",
        }
    }
}

impl fmt::Display for FaultType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for FaultType {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "model_loader_failure" => Ok(Self::ModelLoaderFailure),
            "network_latency" => Ok(Self::NetworkLatency),
            "redis_failure" => Ok(Self::RedisFailure),
            _ => Err(DomainError::UnknownFaultType(s.to_string())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_canonical_names() {
        for fault in FaultType::ALL {
            assert_eq!(fault.as_str().parse::<FaultType>().unwrap(), fault);
        }
    }

    #[test]
    fn unknown_fault_type_is_rejected() {
        let err = "unknown_fault_type".parse::<FaultType>().unwrap_err();
        assert_eq!(
            err,
            DomainError::UnknownFaultType("unknown_fault_type".to_string())
        );
    }

    #[test]
    fn parsing_is_case_sensitive() {
        assert!("Network_Latency".parse::<FaultType>().is_err());
    }

    #[test]
    fn metric_labels() {
        assert_eq!(FaultType::ModelLoaderFailure.metric_label(), "model_loader");
        assert_eq!(FaultType::RedisFailure.metric_label(), "redis");
    }
}
