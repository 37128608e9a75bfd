//! Query-cost throttling
//!
//! The server reports a continuously replenishing cost budget with every
//! response. This module keeps the latest reported numbers and decides how long
//! the next request has to wait so it does not trip the limit.

mod budget;

pub use budget::{BudgetState, BudgetTracker, CostObservation, DEFAULT_SAFETY_MARGIN};
