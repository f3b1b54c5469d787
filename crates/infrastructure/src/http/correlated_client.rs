//! HTTP probe client with automatic request ID correlation
//!
//! Wraps `reqwest::Client` and tags every outgoing request with a fresh
//! `X-Request-Id` header, so the service's request log can be joined with
//! the chaos harness's own log. Implements [`HttpProbePort`]; the
//! [`CorrelatedConnector`] builds one per chaos session.
//!
//! # Examples
//!
//! ```ignore
//! use infrastructure::http::CorrelatedHttpClient;
//!
//! let client = CorrelatedHttpClient::new()?;
//! let resp = client.get("http://localhost:8000/health").await?;
//! assert!(resp.is_success());
//! ```

use std::sync::Arc;
use std::time::Duration;

use application::{ApplicationError, HttpProbePort, HttpResponse, ProbeConnectorPort};
use async_trait::async_trait;
use reqwest::{Client, RequestBuilder, Response};
use serde_json::Value;
use tracing::{debug, instrument};
use uuid::Uuid;

/// Header name for request correlation ID
pub const X_REQUEST_ID: &str = "x-request-id";

/// Configuration for the correlated HTTP client
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CorrelatedClientConfig {
    /// Connection timeout
    pub connect_timeout: Duration,
    /// Request timeout
    pub timeout: Duration,
    /// User agent string
    pub user_agent: String,
}

impl Default for CorrelatedClientConfig {
    fn default() -> Self {
        Self {
            connect_timeout: Duration::from_secs(5),
            timeout: Duration::from_secs(10),
            user_agent: format!("AstraGuard/{}", env!("CARGO_PKG_VERSION")),
        }
    }
}

impl CorrelatedClientConfig {
    /// Create a new configuration with custom timeout
    #[must_use]
    pub const fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Create a new configuration with custom connect timeout
    #[must_use]
    pub const fn with_connect_timeout(mut self, timeout: Duration) -> Self {
        self.connect_timeout = timeout;
        self
    }

    /// Set the user agent string
    #[must_use]
    pub fn with_user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.user_agent = user_agent.into();
        self
    }
}

/// HTTP client that tags every request with a correlation ID
#[derive(Debug, Clone)]
pub struct CorrelatedHttpClient {
    inner: Client,
    config: CorrelatedClientConfig,
}

impl CorrelatedHttpClient {
    /// Create a new client with default configuration
    ///
    /// # Errors
    ///
    /// Returns an error if the underlying reqwest client cannot be built.
    pub fn new() -> Result<Self, reqwest::Error> {
        Self::with_config(CorrelatedClientConfig::default())
    }

    /// Create a new client with custom configuration
    ///
    /// # Errors
    ///
    /// Returns an error if the underlying reqwest client cannot be built.
    pub fn with_config(config: CorrelatedClientConfig) -> Result<Self, reqwest::Error> {
        let inner = Client::builder()
            .connect_timeout(config.connect_timeout)
            .timeout(config.timeout)
            .user_agent(&config.user_agent)
            .build()?;

        Ok(Self { inner, config })
    }

    /// Get the configuration
    #[must_use]
    pub const fn config(&self) -> &CorrelatedClientConfig {
        &self.config
    }

    /// Get a reference to the underlying reqwest client
    #[must_use]
    pub const fn inner(&self) -> &Client {
        &self.inner
    }

    #[instrument(skip(self, builder), fields(request_id))]
    async fn send(&self, builder: RequestBuilder) -> Result<HttpResponse, ApplicationError> {
        let request_id = Uuid::new_v4();
        tracing::Span::current().record("request_id", tracing::field::display(request_id));

        let response = builder
            .header(X_REQUEST_ID, request_id.to_string())
            .send()
            .await
            .map_err(|e| ApplicationError::Transport(e.to_string()))?;
        debug!(request_id = %request_id, status = %response.status(), "Probe response");
        decode(response).await
    }
}

/// Read the body as JSON; plain-text bodies become a JSON string
async fn decode(response: Response) -> Result<HttpResponse, ApplicationError> {
    let status = response.status().as_u16();
    let text = response
        .text()
        .await
        .map_err(|e| ApplicationError::Transport(e.to_string()))?;
    let body = if text.trim().is_empty() {
        Value::Null
    } else {
        serde_json::from_str(&text).unwrap_or(Value::String(text))
    };
    Ok(HttpResponse::new(status, body))
}

#[async_trait]
impl HttpProbePort for CorrelatedHttpClient {
    async fn get(&self, url: &str) -> Result<HttpResponse, ApplicationError> {
        self.send(self.inner.get(url)).await
    }

    async fn post(&self, url: &str, body: Option<Value>) -> Result<HttpResponse, ApplicationError> {
        let builder = self.inner.post(url);
        let builder = match body {
            Some(body) => builder.json(&body),
            None => builder,
        };
        self.send(builder).await
    }

    async fn delete(&self, url: &str) -> Result<HttpResponse, ApplicationError> {
        self.send(self.inner.delete(url)).await
    }
}

/// Builds a fresh [`CorrelatedHttpClient`] per chaos session
#[derive(Debug, Clone, Default)]
pub struct CorrelatedConnector {
    config: CorrelatedClientConfig,
}

impl CorrelatedConnector {
    #[must_use]
    pub const fn new(config: CorrelatedClientConfig) -> Self {
        Self { config }
    }
}

#[async_trait]
impl ProbeConnectorPort for CorrelatedConnector {
    async fn connect(&self) -> Result<Arc<dyn HttpProbePort>, ApplicationError> {
        let client = CorrelatedHttpClient::with_config(self.config.clone())
            .map_err(|e| ApplicationError::Configuration(e.to_string()))?;
        Ok(Arc::new(client))
    }
}
