//! Output module for reporting fetch results
//!
//! This module handles:
//! - Listing the fetched products
//! - Printing the end-of-run summary report

mod report;

pub use report::{print_outcome, write_products, write_summary};
