use crate::client::DEFAULT_TIMEOUT_MS;
use crate::retry::{
    RetryPolicy, DEFAULT_BASE_DELAY_MS, DEFAULT_MAX_ATTEMPTS, DEFAULT_MAX_DELAY_MS,
};
use crate::throttle::{BudgetTracker, DEFAULT_SAFETY_MARGIN};
use serde::Deserialize;
use std::time::Duration;

/// Main configuration structure for graphql-sync
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub client: ClientConfig,
    #[serde(default)]
    pub fetch: FetchConfig,
    #[serde(default)]
    pub throttle: ThrottleConfig,
    #[serde(default)]
    pub retry: RetryConfig,
}

/// GraphQL endpoint configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ClientConfig {
    /// Full endpoint URL, e.g. "http://localhost:4000/graphql"
    pub endpoint: String,

    /// Optional access token sent with every request
    #[serde(rename = "access-token")]
    pub access_token: Option<String>,

    /// Per-request timeout (milliseconds)
    #[serde(rename = "timeout-ms")]
    pub timeout_ms: u64,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            endpoint: "http://localhost:4000/graphql".to_string(),
            access_token: None,
            timeout_ms: DEFAULT_TIMEOUT_MS,
        }
    }
}

/// Pagination limits
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct FetchConfig {
    /// Maximum number of records to fetch in one run
    pub total: usize,

    /// Records requested per page
    #[serde(rename = "page-size")]
    pub page_size: usize,
}

impl Default for FetchConfig {
    fn default() -> Self {
        Self {
            total: 750,
            page_size: 100,
        }
    }
}

/// Cost budget throttling
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ThrottleConfig {
    /// Extra budget headroom required before sending the next request
    #[serde(rename = "safety-margin")]
    pub safety_margin: f64,
}

impl Default for ThrottleConfig {
    fn default() -> Self {
        Self {
            safety_margin: DEFAULT_SAFETY_MARGIN,
        }
    }
}

impl ThrottleConfig {
    /// Builds a fresh budget tracker for one run
    pub fn tracker(&self) -> BudgetTracker {
        BudgetTracker::new(self.safety_margin)
    }
}

/// Retry and backoff behavior
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct RetryConfig {
    /// Attempts per page, including the first
    #[serde(rename = "max-attempts")]
    pub max_attempts: u32,

    /// Delay before the first retry (milliseconds)
    #[serde(rename = "base-delay-ms")]
    pub base_delay_ms: u64,

    /// Cap on the exponential delay (milliseconds)
    #[serde(rename = "max-delay-ms")]
    pub max_delay_ms: u64,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_attempts: DEFAULT_MAX_ATTEMPTS,
            base_delay_ms: DEFAULT_BASE_DELAY_MS,
            max_delay_ms: DEFAULT_MAX_DELAY_MS,
        }
    }
}

impl RetryConfig {
    pub fn policy(&self) -> RetryPolicy {
        RetryPolicy::new()
            .with_max_attempts(self.max_attempts)
            .with_base_delay(Duration::from_millis(self.base_delay_ms))
            .with_max_delay(Duration::from_millis(self.max_delay_ms))
    }
}
