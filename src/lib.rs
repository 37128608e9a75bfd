//! graphql-sync: a cost-aware GraphQL pagination engine
//!
//! This crate enumerates a large, cursor-paginated GraphQL connection while
//! respecting the server's query-cost budget and tolerating transient failures.

pub mod client;
pub mod config;
pub mod mapping;
pub mod output;
pub mod pagination;
pub mod retry;
pub mod throttle;

use thiserror::Error;

/// Main error type for graphql-sync operations
#[derive(Debug, Error)]
pub enum SyncError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Transport error: {0}")]
    Transport(#[from] client::TransportError),

    #[error("Retry error: {0}")]
    Retry(#[from] retry::RetryError),

    #[error("Response shape error: {0}")]
    Shape(#[from] mapping::ShapeError),

    #[error("HTTP client error: {0}")]
    Reqwest(#[from] reqwest::Error),
}

/// Configuration-specific errors
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse TOML: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Invalid URL in config: {0}")]
    InvalidUrl(String),
}

/// Result type alias for graphql-sync operations
pub type Result<T> = std::result::Result<T, SyncError>;

/// Result type alias for configuration operations
pub type ConfigResult<T> = std::result::Result<T, ConfigError>;

// Re-export commonly used types
pub use client::{GraphqlResponse, HttpTransport, Transport};
pub use config::Config;
pub use mapping::{PageResult, Product};
pub use pagination::{FetchOutcome, FetchPhase, FetchStats, Paginator};
pub use retry::RetryPolicy;
pub use throttle::{BudgetTracker, CostObservation};
