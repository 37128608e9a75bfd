//! Cursor pagination over a cost-limited GraphQL connection
//!
//! This module contains the fetch loop that ties the pieces together:
//! - Waiting on the budget tracker before each request
//! - Wrapping each request in the retry policy
//! - Decoding pages and following cursors until the connection is exhausted
//! - Accumulating records and run statistics

mod paginator;
mod phase;
mod query;
mod stats;

pub use paginator::{page_variables, FetchOutcome, Paginator};
pub use phase::FetchPhase;
pub use query::PRODUCTS_QUERY;
pub use stats::FetchStats;
