//! Configuration module for graphql-sync
//!
//! This module handles loading, parsing, and validating TOML configuration files.
//!
//! # Example
//!
//! ```no_run
//! use graphql_sync::config::load_config;
//! use std::path::Path;
//!
//! let config = load_config(Path::new("sync.toml")).unwrap();
//! println!("Fetching {} products", config.fetch.total);
//! ```

mod parser;
mod types;
mod validation;

// Re-export types
pub use types::{ClientConfig, Config, FetchConfig, RetryConfig, ThrottleConfig};

// Re-export parser functions
pub use parser::{compute_config_hash, load_config, load_config_with_hash, parse_config};
pub use validation::validate;
