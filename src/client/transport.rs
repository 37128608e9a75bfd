use async_trait::async_trait;
use serde_json::Value;
use thiserror::Error;

/// Raw result of one GraphQL round trip
#[derive(Debug, Clone, PartialEq)]
pub struct GraphqlResponse {
    /// HTTP status code
    pub status: u16,

    /// Decoded JSON body, opaque to the transport
    pub body: Value,
}

impl GraphqlResponse {
    pub fn new(status: u16, body: Value) -> Self {
        Self { status, body }
    }

    /// Returns true for 2xx statuses
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

/// Network-level failures
///
/// Every variant is considered transient by the retry policy.
#[derive(Debug, Error)]
pub enum TransportError {
    #[error("Request timeout for {endpoint}")]
    Timeout { endpoint: String },

    #[error("Connection failed for {endpoint}: {message}")]
    Connect { endpoint: String, message: String },

    #[error("Request failed for {endpoint}: {message}")]
    Request { endpoint: String, message: String },

    #[error("Failed to parse JSON response (HTTP {status}): {message}")]
    InvalidBody { status: u16, message: String },

    #[error("Invalid endpoint '{endpoint}': {message}")]
    InvalidEndpoint { endpoint: String, message: String },
}

/// Sends a query and its variables to a GraphQL server
///
/// Implementations return the status and body as-is; interpreting either is
/// left to the caller.
#[async_trait]
pub trait Transport: Send + Sync {
    async fn execute(&self, query: &str, variables: &Value)
        -> Result<GraphqlResponse, TransportError>;
}

#[async_trait]
impl<T: Transport + ?Sized> Transport for &T {
    async fn execute(
        &self,
        query: &str,
        variables: &Value,
    ) -> Result<GraphqlResponse, TransportError> {
        (**self).execute(query, variables).await
    }
}

#[async_trait]
impl<T: Transport + ?Sized> Transport for std::sync::Arc<T> {
    async fn execute(
        &self,
        query: &str,
        variables: &Value,
    ) -> Result<GraphqlResponse, TransportError> {
        (**self).execute(query, variables).await
    }
}
