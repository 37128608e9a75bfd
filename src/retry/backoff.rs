use rand::Rng;
use std::time::Duration;

/// Delay before the first retry, in milliseconds
pub const DEFAULT_BASE_DELAY_MS: u64 = 200;

/// Upper bound on the exponential part of the delay, in milliseconds
pub const DEFAULT_MAX_DELAY_MS: u64 = 5000;

/// Upper bound on the random jitter added to every delay, in milliseconds
pub const DEFAULT_JITTER_MS: u64 = 100;

/// Computes an exponential backoff delay with up to 100 ms of random jitter
///
/// `attempt` is 0-based: the delay is `min(base_ms * 2^attempt, max_ms)` plus
/// a uniform jitter in `[0, 100]` ms.
///
/// # Example
///
/// ```
/// use graphql_sync::retry::compute_backoff;
/// use std::time::Duration;
///
/// let delay = compute_backoff(1, 200, 5000);
/// assert!(delay >= Duration::from_millis(400));
/// assert!(delay <= Duration::from_millis(500));
/// ```
pub fn compute_backoff(attempt: u32, base_ms: u64, max_ms: u64) -> Duration {
    compute_backoff_with_jitter(attempt, base_ms, max_ms, DEFAULT_JITTER_MS)
}

/// Same as [`compute_backoff`] with an explicit jitter bound
pub fn compute_backoff_with_jitter(
    attempt: u32,
    base_ms: u64,
    max_ms: u64,
    jitter_ms: u64,
) -> Duration {
    let factor = 2u64.checked_pow(attempt).unwrap_or(u64::MAX);
    let delay = base_ms.saturating_mul(factor).min(max_ms);

    let jitter = if jitter_ms == 0 {
        0
    } else {
        rand::thread_rng().gen_range(0..=jitter_ms)
    };

    Duration::from_millis(delay.saturating_add(jitter))
}
