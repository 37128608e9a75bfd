//! Pagination orchestrator - the main fetch loop
//!
//! Each iteration of the loop:
//! 1. Waits on the budget tracker if the last response left too little budget
//! 2. Requests the next page through the retry policy
//! 3. Feeds the reported cost back into the budget tracker
//! 4. Decodes the page and appends its records
//! 5. Follows the cursor, or stops
//!
//! Failures below this layer end the run early but never escape it: the caller
//! always receives whatever was retrieved before the failure.

use crate::client::{GraphqlResponse, Transport};
use crate::mapping::{decode_cost, decode_error_messages, decode_page, PageResult, Product};
use crate::pagination::phase::FetchPhase;
use crate::pagination::query::PRODUCTS_QUERY;
use crate::pagination::stats::FetchStats;
use crate::retry::{RetryError, RetryPolicy};
use crate::throttle::BudgetTracker;
use crate::SyncError;
use serde_json::{json, Value};
use tokio::time::Instant;
use tokio_util::sync::CancellationToken;

/// Result of one pagination run
#[derive(Debug, Clone)]
pub struct FetchOutcome {
    /// Records in page arrival order
    pub records: Vec<Product>,

    /// Final statistics for the run
    pub stats: FetchStats,

    /// Why the run ended
    pub phase: FetchPhase,
}

impl FetchOutcome {
    /// Returns true if the run stopped before enumeration was complete
    pub fn is_partial(&self) -> bool {
        self.phase.is_partial()
    }
}

/// Builds the `{first, after}` variables for one page request
///
/// `after` is omitted entirely when there is no cursor yet.
pub fn page_variables(first: usize, after: Option<&str>) -> Value {
    match after {
        Some(cursor) => json!({ "first": first, "after": cursor }),
        None => json!({ "first": first }),
    }
}

/// Drives cursor pagination against one GraphQL connection
///
/// A paginator owns its budget tracker, so independent paginators can run
/// concurrently without sharing rate-limit state. A single paginator runs one
/// fetch at a time.
pub struct Paginator<T> {
    transport: T,
    tracker: BudgetTracker,
    retry: RetryPolicy,
    cancel: CancellationToken,
    phase: FetchPhase,
}

impl<T: Transport> Paginator<T> {
    /// Creates a new paginator
    ///
    /// # Arguments
    ///
    /// * `transport` - Sends queries to the server
    /// * `tracker` - Budget tracker for this session
    /// * `retry` - Retry policy applied to every page request
    pub fn new(transport: T, tracker: BudgetTracker, retry: RetryPolicy) -> Self {
        Self {
            transport,
            tracker,
            retry,
            cancel: CancellationToken::new(),
            phase: FetchPhase::Fetching,
        }
    }

    /// Uses the given token to cancel runs
    pub fn with_cancellation(mut self, cancel: CancellationToken) -> Self {
        self.cancel = cancel;
        self
    }

    pub fn tracker(&self) -> &BudgetTracker {
        &self.tracker
    }

    pub fn cancellation_token(&self) -> &CancellationToken {
        &self.cancel
    }

    /// Phase of the current (or last) run
    pub fn phase(&self) -> FetchPhase {
        self.phase
    }

    /// Fetches up to `total_limit` records in pages of `page_size`
    ///
    /// Never fails: transport, retry, and decoding errors end the run early and
    /// the records accumulated so far are returned, with
    /// [`FetchOutcome::phase`] saying why the run stopped.
    ///
    /// # Panics
    ///
    /// Panics if `total_limit` or `page_size` is zero.
    pub async fn fetch_all(&mut self, total_limit: usize, page_size: usize) -> FetchOutcome {
        assert!(total_limit > 0, "total_limit must be positive");
        assert!(page_size > 0, "page_size must be positive");

        let mut records: Vec<Product> = Vec::new();
        let mut cursor: Option<String> = None;
        let mut stats = FetchStats::default();
        let sleep_before = self.tracker.total_sleep_seconds();

        tracing::info!(
            "Starting fetch: total_limit={}, page_size={}",
            total_limit,
            page_size
        );

        let phase = loop {
            self.transition(FetchPhase::Fetching);

            if self.cancel.is_cancelled() {
                break FetchPhase::Cancelled;
            }

            if records.len() >= total_limit {
                break FetchPhase::LimitReached;
            }

            if !self.wait_for_budget().await {
                break FetchPhase::Cancelled;
            }

            let fetch_count = page_size.min(total_limit - records.len());
            let variables = page_variables(fetch_count, cursor.as_deref());

            match &cursor {
                Some(after) => tracing::debug!("Fetching page: first={}, after={}", fetch_count, after),
                None => tracing::debug!("Fetching page: first={}", fetch_count),
            }

            self.transition(FetchPhase::Calling);
            let response = match self.request_page(&variables, &mut stats).await {
                Ok(response) => response,
                Err(e) => {
                    tracing::error!("Fatal error after retries: {}", e);
                    break stop_phase(&e);
                }
            };

            stats.total_requests += 1;

            if let Some(observation) = decode_cost(&response.body) {
                self.tracker.observe(&observation);
            }

            self.transition(FetchPhase::Parsing);

            let errors = decode_error_messages(&response.body);
            if !errors.is_empty() {
                tracing::warn!("GraphQL errors:");
                for error in &errors {
                    tracing::warn!("  - {}", error);
                }
            }

            if response.body.get("data").map_or(true, Value::is_null) {
                tracing::error!("No data returned (HTTP {}); stopping", response.status);
                break FetchPhase::MissingData;
            }

            let page = match decode_response(&response) {
                Ok(page) => page,
                Err(e) => {
                    tracing::error!("Failed to parse page: {}", e);
                    break stop_phase(&e);
                }
            };

            if page.is_empty() {
                tracing::info!("Empty page received; stopping");
                break FetchPhase::EmptyPage;
            }

            let PageResult {
                records: mut page_records,
                last_cursor,
                has_next_page,
            } = page;

            let remaining = total_limit - records.len();
            if page_records.len() > remaining {
                tracing::warn!(
                    "Server returned {} records for first={}; keeping {}",
                    page_records.len(),
                    fetch_count,
                    remaining
                );
                page_records.truncate(remaining);
            }

            records.append(&mut page_records);
            tracing::info!("Fetched {} products so far", records.len());

            if !has_next_page {
                tracing::info!("No more pages");
                break FetchPhase::Completed;
            }

            match last_cursor {
                Some(next) => cursor = Some(next),
                None => {
                    tracing::warn!("Server reported more pages without a cursor; stopping");
                    break FetchPhase::MissingCursor;
                }
            }
        };

        self.transition(phase);

        stats.total_fetched = records.len();
        stats.total_sleep_seconds = self.tracker.total_sleep_seconds() - sleep_before;
        stats.avg_query_cost = self.tracker.average_cost();

        if phase.is_success() {
            tracing::info!(
                "Fetch finished ({}): {} products in {} requests",
                phase,
                stats.total_fetched,
                stats.total_requests
            );
        } else {
            tracing::warn!(
                "Fetch stopped early ({}): returning {} products",
                phase,
                stats.total_fetched
            );
        }

        FetchOutcome {
            records,
            stats,
            phase,
        }
    }

    fn transition(&mut self, next: FetchPhase) {
        if self.phase != next {
            tracing::trace!("Phase {} -> {}", self.phase, next);
            self.phase = next;
        }
    }

    /// Sleeps until the budget covers the next request
    ///
    /// Returns false if the run was cancelled while waiting.
    async fn wait_for_budget(&mut self) -> bool {
        let seconds = self.tracker.wait_seconds();
        if seconds <= 0.0 {
            return true;
        }
        let wait = self.tracker.wait_duration();

        let state = self.tracker.state();
        tracing::info!(
            "Rate-limit approaching: sleeping {}s (available={}, needed={}, restore_rate={})",
            seconds,
            state.currently_available,
            state.last_requested_cost + self.tracker.safety_margin(),
            state.restore_rate
        );

        let started = Instant::now();
        tokio::select! {
            _ = self.cancel.cancelled() => {
                self.tracker.record_sleep(started.elapsed().as_secs_f64());
                tracing::info!("Cancelled while waiting for budget");
                false
            }
            _ = tokio::time::sleep(wait) => {
                self.tracker.record_sleep(seconds);
                true
            }
        }
    }

    /// Sends one page request through the retry policy
    async fn request_page(
        &self,
        variables: &Value,
        stats: &mut FetchStats,
    ) -> crate::Result<GraphqlResponse> {
        let transport = &self.transport;

        let result = self
            .retry
            .execute_with_cancel(&self.cancel, move || transport.execute(PRODUCTS_QUERY, variables))
            .await;

        match result {
            Ok(output) => {
                stats.total_retries += output.retries as usize;
                Ok(output.response)
            }
            Err(e) => {
                stats.total_retries += e.retries() as usize;
                Err(e.into())
            }
        }
    }
}

fn decode_response(response: &GraphqlResponse) -> crate::Result<PageResult> {
    Ok(decode_page(&response.body)?)
}

/// Maps an unrecoverable error to the phase the run ends in
fn stop_phase(error: &SyncError) -> FetchPhase {
    match error {
        SyncError::Retry(RetryError::Cancelled { .. }) => FetchPhase::Cancelled,
        SyncError::Shape(_) => FetchPhase::MalformedPage,
        _ => FetchPhase::RequestFailed,
    }
}
