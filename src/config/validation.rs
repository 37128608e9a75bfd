use crate::config::types::{ClientConfig, Config, FetchConfig, RetryConfig, ThrottleConfig};
use crate::ConfigError;
use url::Url;

/// Largest page the products connection accepts
const MAX_PAGE_SIZE: usize = 250;

/// Validates the entire configuration
pub fn validate(config: &Config) -> Result<(), ConfigError> {
    validate_client_config(&config.client)?;
    validate_fetch_config(&config.fetch)?;
    validate_throttle_config(&config.throttle)?;
    validate_retry_config(&config.retry)?;
    Ok(())
}

/// Validates endpoint and timeout
fn validate_client_config(config: &ClientConfig) -> Result<(), ConfigError> {
    let url = Url::parse(&config.endpoint)
        .map_err(|e| ConfigError::InvalidUrl(format!("Invalid endpoint: {}", e)))?;

    if url.scheme() != "http" && url.scheme() != "https" {
        return Err(ConfigError::InvalidUrl(format!(
            "Endpoint '{}' must use http or https",
            config.endpoint
        )));
    }

    if url.host_str().map_or(true, str::is_empty) {
        return Err(ConfigError::InvalidUrl(format!(
            "Endpoint '{}' has no host",
            config.endpoint
        )));
    }

    if config.timeout_ms < 1 {
        return Err(ConfigError::Validation(
            "timeout_ms must be >= 1".to_string(),
        ));
    }

    Ok(())
}

/// Validates pagination limits
fn validate_fetch_config(config: &FetchConfig) -> Result<(), ConfigError> {
    if config.total < 1 {
        return Err(ConfigError::Validation(format!(
            "total must be >= 1, got {}",
            config.total
        )));
    }

    if config.page_size < 1 || config.page_size > MAX_PAGE_SIZE {
        return Err(ConfigError::Validation(format!(
            "page_size must be between 1 and {}, got {}",
            MAX_PAGE_SIZE, config.page_size
        )));
    }

    Ok(())
}

fn validate_throttle_config(config: &ThrottleConfig) -> Result<(), ConfigError> {
    if !config.safety_margin.is_finite() || config.safety_margin < 0.0 {
        return Err(ConfigError::Validation(format!(
            "safety_margin must be a non-negative number, got {}",
            config.safety_margin
        )));
    }
    Ok(())
}

fn validate_retry_config(config: &RetryConfig) -> Result<(), ConfigError> {
    if config.max_attempts < 1 {
        return Err(ConfigError::Validation(format!(
            "max_attempts must be >= 1, got {}",
            config.max_attempts
        )));
    }

    if config.base_delay_ms > config.max_delay_ms {
        return Err(ConfigError::Validation(format!(
            "base_delay_ms ({}) cannot exceed max_delay_ms ({})",
            config.base_delay_ms, config.max_delay_ms
        )));
    }

    Ok(())
}
