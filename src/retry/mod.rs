//! Bounded retry with exponential backoff
//!
//! This module decides, per attempt, whether a failed GraphQL call is worth
//! repeating and how long to wait first:
//! - HTTP 429 and 5xx statuses are transient
//! - Network failures (timeouts, refused connections, unparseable bodies) are transient
//! - Everything else is handed back to the caller untouched

mod backoff;
mod policy;

pub use backoff::{
    compute_backoff, compute_backoff_with_jitter, DEFAULT_BASE_DELAY_MS, DEFAULT_JITTER_MS,
    DEFAULT_MAX_DELAY_MS,
};
pub use policy::{
    is_retryable_status, AttemptOutcome, RetryContext, RetryError, RetryOutput, RetryPolicy,
    RetryReason, DEFAULT_MAX_ATTEMPTS,
};
