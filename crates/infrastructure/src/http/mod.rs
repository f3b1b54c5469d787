//! HTTP utilities and clients with correlation support
//!
//! The chaos harness reaches the service under test through these clients;
//! every outgoing request carries an `X-Request-Id` header.

mod correlated_client;

pub use correlated_client::{
    CorrelatedClientConfig, CorrelatedConnector, CorrelatedHttpClient, X_REQUEST_ID,
};
