/// Statistics accumulated over one pagination run
///
/// Counters only ever grow during a run.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FetchStats {
    /// Records returned to the caller
    pub total_fetched: usize,

    /// Logical page requests that produced a response (retries not included)
    pub total_requests: usize,

    /// Retries across all pages
    pub total_retries: usize,

    /// Time spent waiting for the cost budget to refill
    pub total_sleep_seconds: f64,

    /// Mean requested query cost reported by the server
    pub avg_query_cost: f64,
}
