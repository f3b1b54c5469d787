//! Network client port used by the chaos harness
//!
//! The harness never talks to reqwest directly: a connector creates a client
//! during `startup()` and every request goes through [`HttpProbePort`], so
//! tests can substitute an in-memory fake.

use std::sync::Arc;

use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde_json::Value;

use crate::error::ApplicationError;

/// Status and decoded JSON body of one response
#[derive(Debug, Clone, PartialEq)]
pub struct HttpResponse {
    pub status: u16,
    pub body: Value,
}

impl HttpResponse {
    #[must_use]
    pub const fn new(status: u16, body: Value) -> Self {
        Self { status, body }
    }

    /// 200 OK with `body`
    #[must_use]
    pub const fn ok(body: Value) -> Self {
        Self::new(200, body)
    }

    #[must_use]
    pub const fn is_success(&self) -> bool {
        self.status >= 200 && self.status < 300
    }

    /// Decode the body, failing on non-2xx or shape mismatch
    pub fn json<T: DeserializeOwned>(&self) -> Result<T, ApplicationError> {
        if !self.is_success() {
            return Err(ApplicationError::Protocol(format!(
                "unexpected status {}",
                self.status
            )));
        }
        serde_json::from_value(self.body.clone())
            .map_err(|e| ApplicationError::Protocol(format!("unexpected body: {e}")))
    }
}

/// Minimal JSON-over-HTTP client
#[async_trait]
pub trait HttpProbePort: Send + Sync + std::fmt::Debug {
    async fn get(&self, url: &str) -> Result<HttpResponse, ApplicationError>;

    async fn post(&self, url: &str, body: Option<Value>) -> Result<HttpResponse, ApplicationError>;

    async fn delete(&self, url: &str) -> Result<HttpResponse, ApplicationError>;
}

/// Creates the client a chaos session uses
#[async_trait]
pub trait ProbeConnectorPort: Send + Sync + std::fmt::Debug {
    async fn connect(&self) -> Result<Arc<dyn HttpProbePort>, ApplicationError>;
}

#[cfg(test)]
mod tests {
    use serde::Deserialize;
    use serde_json::json;

    use super::*;

    #[derive(Debug, Deserialize)]
    struct Leader {
        instance_id: String,
    }

    #[test]
    fn json_decodes_success_body() {
        let resp = HttpResponse::ok(json!({"instance_id": "astra-1"}));
        let leader: Leader = resp.json().unwrap();
        assert_eq!(leader.instance_id, "astra-1");
    }

    #[test]
    fn json_rejects_error_status() {
        let resp = HttpResponse::new(404, json!({"error": "no leader"}));
        assert!(matches!(
            resp.json::<Leader>(),
            Err(ApplicationError::Protocol(_))
        ));
    }

    #[test]
    fn json_rejects_wrong_shape() {
        let resp = HttpResponse::ok(json!({"leader": 1}));
        assert!(resp.json::<Leader>().is_err());
    }
}
