//! Cluster instance identifier value object

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::errors::DomainError;

/// Maximum accepted identifier length
const MAX_INSTANCE_ID_LEN: usize = 128;

/// Identifier of one cluster member
///
/// Ordering is lexicographic on the underlying string; leader election
/// relies on it.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct InstanceId(String);

impl InstanceId {
    /// Parse and validate an instance identifier
    ///
    /// Identifiers must be non-empty, at most 128 characters, and contain no
    /// whitespace or control characters.
    pub fn parse(raw: impl Into<String>) -> Result<Self, DomainError> {
        let raw = raw.into();
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            return Err(DomainError::InvalidInstanceId("empty".to_string()));
        }
        if trimmed.len() > MAX_INSTANCE_ID_LEN {
            return Err(DomainError::InvalidInstanceId(format!(
                "longer than {MAX_INSTANCE_ID_LEN} characters"
            )));
        }
        if trimmed.chars().any(|c| c.is_whitespace() || c.is_control()) {
            return Err(DomainError::InvalidInstanceId(trimmed.to_string()));
        }
        Ok(Self(trimmed.to_string()))
    }

    /// Get the identifier as a string slice
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for InstanceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl TryFrom<String> for InstanceId {
    type Error = DomainError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(value)
    }
}

impl From<InstanceId> for String {
    fn from(id: InstanceId) -> Self {
        id.0
    }
}

impl std::str::FromStr for InstanceId {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn trims_surrounding_whitespace() {
        let id = InstanceId::parse("  astra-abc123 ").unwrap();
        assert_eq!(id.as_str(), "astra-abc123");
    }

    #[test]
    fn rejects_empty_and_inner_whitespace() {
        assert!(InstanceId::parse("").is_err());
        assert!(InstanceId::parse("   ").is_err());
        assert!(InstanceId::parse("astra abc").is_err());
    }

    #[test]
    fn rejects_overlong() {
        assert!(InstanceId::parse("a".repeat(129)).is_err());
        assert!(InstanceId::parse("a".repeat(128)).is_ok());
    }

    #[test]
    fn ordering_is_lexicographic() {
        let a = InstanceId::parse("astra-a").unwrap();
        let b = InstanceId::parse("astra-b").unwrap();
        assert!(a < b);
    }

    #[test]
    fn deserialization_validates() {
        let ok: Result<InstanceId, _> = serde_json::from_str("\"node-1\"");
        assert!(ok.is_ok());
        let bad: Result<InstanceId, _> = serde_json::from_str("\"\"");
        assert!(bad.is_err());
    }
}
