//! HTTP transport implementation
//!
//! This module handles the actual HTTP exchange with the GraphQL server:
//! - Building the reqwest client with timeouts and a user agent
//! - Encoding the `{query, variables}` payload
//! - Classifying network errors

use crate::client::transport::{GraphqlResponse, Transport, TransportError};
use crate::config::ClientConfig;
use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderValue, ACCEPT, CONTENT_TYPE};
use reqwest::Client;
use serde_json::{json, Value};
use std::time::Duration;
use url::Url;

/// Default per-request timeout in milliseconds
pub const DEFAULT_TIMEOUT_MS: u64 = 5000;

/// User agent sent with every request
pub const USER_AGENT: &str = concat!("graphql_sync/", env!("CARGO_PKG_VERSION"));

/// Header carrying the optional store access token
const ACCESS_TOKEN_HEADER: &str = "X-Shopify-Access-Token";

/// Longest request body logged verbatim
const MAX_LOGGED_BODY: usize = 300;

/// Builds an HTTP client with proper configuration
///
/// # Arguments
///
/// * `timeout` - Per-request timeout, also applied to connecting
///
/// # Returns
///
/// * `Ok(Client)` - Successfully built HTTP client
/// * `Err(reqwest::Error)` - Failed to build client
pub fn build_http_client(timeout: Duration) -> Result<Client, reqwest::Error> {
    let mut headers = HeaderMap::new();
    headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
    headers.insert(ACCEPT, HeaderValue::from_static("application/json"));

    Client::builder()
        .user_agent(USER_AGENT)
        .default_headers(headers)
        .timeout(timeout)
        .connect_timeout(timeout)
        .gzip(true)
        .brotli(true)
        .build()
}

/// GraphQL transport over HTTP(S) POST
#[derive(Debug, Clone)]
pub struct HttpTransport {
    client: Client,
    endpoint: Url,
    access_token: Option<String>,
}

impl HttpTransport {
    /// Creates a transport for the given endpoint
    ///
    /// # Arguments
    ///
    /// * `endpoint` - Full URL, e.g. `http://localhost:4000/graphql`
    /// * `access_token` - Optional token sent as `X-Shopify-Access-Token`
    /// * `timeout` - Per-request timeout
    ///
    /// # Returns
    ///
    /// * `Ok(HttpTransport)` - Ready to send queries
    /// * `Err(SyncError)` - Invalid endpoint or client construction failure
    pub fn new(
        endpoint: &str,
        access_token: Option<String>,
        timeout: Duration,
    ) -> crate::Result<Self> {
        let endpoint = parse_endpoint(endpoint)?;
        let client = build_http_client(timeout)?;

        Ok(Self {
            client,
            endpoint,
            access_token: access_token.filter(|t| !t.is_empty()),
        })
    }

    /// Creates a transport from the `[client]` configuration section
    pub fn from_config(config: &ClientConfig) -> crate::Result<Self> {
        Self::new(
            &config.endpoint,
            config.access_token.clone(),
            Duration::from_millis(config.timeout_ms),
        )
    }

    pub fn endpoint(&self) -> &Url {
        &self.endpoint
    }

    fn classify_error(&self, error: reqwest::Error) -> TransportError {
        let endpoint = self.endpoint.to_string();
        if error.is_timeout() {
            TransportError::Timeout { endpoint }
        } else if error.is_connect() {
            TransportError::Connect {
                endpoint,
                message: error.to_string(),
            }
        } else {
            TransportError::Request {
                endpoint,
                message: error.to_string(),
            }
        }
    }
}

#[async_trait]
impl Transport for HttpTransport {
    async fn execute(
        &self,
        query: &str,
        variables: &Value,
    ) -> Result<GraphqlResponse, TransportError> {
        let payload = build_payload(query, variables);

        if tracing::enabled!(tracing::Level::DEBUG) {
            let body = payload.to_string();
            tracing::debug!("POST {}", self.endpoint);
            if body.len() <= MAX_LOGGED_BODY {
                tracing::debug!("Body: {}", body);
            } else {
                let cut = floor_char_boundary(&body, MAX_LOGGED_BODY);
                tracing::debug!("Body: {} ...(truncated)", &body[..cut]);
            }
        }

        let mut request = self.client.post(self.endpoint.clone()).json(&payload);
        if let Some(token) = &self.access_token {
            request = request.header(ACCESS_TOKEN_HEADER, token);
        }

        let response = request
            .send()
            .await
            .map_err(|e| self.classify_error(e))?;
        let status = response.status().as_u16();
        let text = response.text().await.map_err(|e| self.classify_error(e))?;

        tracing::debug!("HTTP {}", status);

        let body = serde_json::from_str(&text).map_err(|e| TransportError::InvalidBody {
            status,
            message: e.to_string(),
        })?;

        Ok(GraphqlResponse { status, body })
    }
}

/// Builds the JSON request payload, omitting empty variables
fn build_payload(query: &str, variables: &Value) -> Value {
    let has_variables = match variables {
        Value::Null => false,
        Value::Object(map) => !map.is_empty(),
        _ => true,
    };

    if has_variables {
        json!({ "query": query, "variables": variables })
    } else {
        json!({ "query": query })
    }
}

/// Validates that the endpoint is an absolute http(s) URL with a host
fn parse_endpoint(endpoint: &str) -> Result<Url, TransportError> {
    let invalid = |message: String| TransportError::InvalidEndpoint {
        endpoint: endpoint.to_string(),
        message,
    };

    let url = Url::parse(endpoint).map_err(|e| invalid(e.to_string()))?;

    if url.scheme() != "http" && url.scheme() != "https" {
        return Err(invalid(format!("unsupported scheme '{}'", url.scheme())));
    }

    match url.host_str() {
        Some(host) if !host.is_empty() => Ok(url),
        _ => Err(invalid("missing host".to_string())),
    }
}

fn floor_char_boundary(s: &str, mut index: usize) -> usize {
    while index > 0 && !s.is_char_boundary(index) {
        index -= 1;
    }
    index
}
