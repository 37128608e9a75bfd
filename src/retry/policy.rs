use crate::client::{GraphqlResponse, TransportError};
use crate::retry::backoff::{
    compute_backoff_with_jitter, DEFAULT_BASE_DELAY_MS, DEFAULT_JITTER_MS, DEFAULT_MAX_DELAY_MS,
};
use std::fmt;
use std::future::Future;
use std::time::Duration;
use thiserror::Error;
use tokio_util::sync::CancellationToken;

/// Attempts made per logical call, including the first
pub const DEFAULT_MAX_ATTEMPTS: u32 = 6;

/// Returns true for statuses worth retrying: 429 and any 5xx
pub fn is_retryable_status(status: u16) -> bool {
    status == 429 || status >= 500
}

/// Why an attempt is being retried
#[derive(Debug)]
pub enum RetryReason {
    /// Server answered with 429 or 5xx
    Status(u16),

    /// The request never produced a usable response
    Transport(TransportError),
}

impl fmt::Display for RetryReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Status(status) => write!(f, "HTTP status: {}", status),
            Self::Transport(error) => write!(f, "error: {}", error),
        }
    }
}

/// Classification of a single attempt
#[derive(Debug)]
pub enum AttemptOutcome {
    /// 2xx response
    Success(GraphqlResponse),

    /// Transient failure, try again if attempts remain
    Retry(RetryReason),

    /// Non-retryable status; the response is handed back for inspection
    Fatal(GraphqlResponse),
}

impl AttemptOutcome {
    /// Classifies the raw result of one transport call
    pub fn classify(result: Result<GraphqlResponse, TransportError>) -> Self {
        match result {
            Ok(response) if is_retryable_status(response.status) => {
                Self::Retry(RetryReason::Status(response.status))
            }
            Ok(response) if response.is_success() => Self::Success(response),
            Ok(response) => Self::Fatal(response),
            Err(error) => Self::Retry(RetryReason::Transport(error)),
        }
    }
}

/// Position within one logical call
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryContext {
    /// 0-based index of the current attempt
    pub attempt: u32,
    pub max_attempts: u32,
}

impl RetryContext {
    pub fn new(max_attempts: u32) -> Self {
        Self {
            attempt: 0,
            max_attempts: max_attempts.max(1),
        }
    }

    /// Returns true if no attempt remains after the current one
    pub fn is_last(&self) -> bool {
        self.attempt + 1 >= self.max_attempts
    }

    fn advance(&mut self) {
        self.attempt += 1;
    }
}

/// Successful result of [`RetryPolicy::execute`]
#[derive(Debug)]
pub struct RetryOutput {
    /// The final response, either 2xx or a non-retryable status
    pub response: GraphqlResponse,

    /// Retries performed before this response arrived
    pub retries: u32,
}

/// Terminal failures of the retry loop
#[derive(Debug, Error)]
pub enum RetryError {
    #[error("Max retries exceeded after {attempts} attempts. Last {last}")]
    MaxRetriesExceeded {
        attempts: u32,
        retries: u32,
        last: RetryReason,
    },

    #[error("Cancelled after {retries} retries")]
    Cancelled { retries: u32 },
}

impl RetryError {
    /// Retries performed before the loop gave up
    pub fn retries(&self) -> u32 {
        match self {
            Self::MaxRetriesExceeded { retries, .. } | Self::Cancelled { retries } => *retries,
        }
    }
}

/// Bounded exponential-backoff retry policy
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RetryPolicy {
    max_attempts: u32,
    base_delay_ms: u64,
    max_delay_ms: u64,
    jitter_ms: u64,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: DEFAULT_MAX_ATTEMPTS,
            base_delay_ms: DEFAULT_BASE_DELAY_MS,
            max_delay_ms: DEFAULT_MAX_DELAY_MS,
            jitter_ms: DEFAULT_JITTER_MS,
        }
    }
}

impl RetryPolicy {
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the total number of attempts (at least one)
    pub fn with_max_attempts(mut self, max_attempts: u32) -> Self {
        self.max_attempts = max_attempts.max(1);
        self
    }

    pub fn with_base_delay(mut self, delay: Duration) -> Self {
        self.base_delay_ms = delay.as_millis() as u64;
        self
    }

    pub fn with_max_delay(mut self, delay: Duration) -> Self {
        self.max_delay_ms = delay.as_millis() as u64;
        self
    }

    pub fn with_jitter(mut self, jitter: Duration) -> Self {
        self.jitter_ms = jitter.as_millis() as u64;
        self
    }

    pub fn max_attempts(&self) -> u32 {
        self.max_attempts
    }

    /// Delay to wait after the given (failed) 0-based attempt
    pub fn backoff(&self, attempt: u32) -> Duration {
        compute_backoff_with_jitter(attempt, self.base_delay_ms, self.max_delay_ms, self.jitter_ms)
    }

    /// Runs `attempt_body` until it yields a non-retryable result or attempts run out
    pub async fn execute<F, Fut>(&self, attempt_body: F) -> Result<RetryOutput, RetryError>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<GraphqlResponse, TransportError>>,
    {
        self.execute_with_cancel(&CancellationToken::new(), attempt_body)
            .await
    }

    /// Same as [`RetryPolicy::execute`], aborting when `cancel` fires
    ///
    /// The token is raced against both the attempt itself and the backoff
    /// delay that follows a transient failure.
    pub async fn execute_with_cancel<F, Fut>(
        &self,
        cancel: &CancellationToken,
        mut attempt_body: F,
    ) -> Result<RetryOutput, RetryError>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<GraphqlResponse, TransportError>>,
    {
        let mut context = RetryContext::new(self.max_attempts);
        let mut retries = 0;

        loop {
            if cancel.is_cancelled() {
                return Err(RetryError::Cancelled { retries });
            }

            let result = tokio::select! {
                _ = cancel.cancelled() => return Err(RetryError::Cancelled { retries }),
                result = attempt_body() => result,
            };

            let reason = match AttemptOutcome::classify(result) {
                AttemptOutcome::Success(response) => {
                    return Ok(RetryOutput { response, retries });
                }
                AttemptOutcome::Fatal(response) => {
                    tracing::warn!("HTTP {} is not retryable", response.status);
                    return Ok(RetryOutput { response, retries });
                }
                AttemptOutcome::Retry(reason) => reason,
            };

            if context.is_last() {
                tracing::error!(
                    "Attempt {}/{} failed with {}; giving up",
                    context.attempt + 1,
                    context.max_attempts,
                    reason
                );
                return Err(RetryError::MaxRetriesExceeded {
                    attempts: context.max_attempts,
                    retries,
                    last: reason,
                });
            }

            let delay = self.backoff(context.attempt);
            retries += 1;
            tracing::warn!(
                "Attempt {}/{} failed with {}; retrying in {} ms",
                context.attempt + 1,
                context.max_attempts,
                reason,
                delay.as_millis()
            );

            tokio::select! {
                _ = cancel.cancelled() => return Err(RetryError::Cancelled { retries }),
                _ = tokio::time::sleep(delay) => {}
            }

            context.advance();
        }
    }
}
