//! Response shape decoding
//!
//! The pagination engine treats response bodies as opaque JSON. This module
//! extracts the three things it needs from them:
//! - The page of records, its last cursor, and the next-page flag
//! - The query cost and throttle status
//! - Any server-reported GraphQL error messages

mod cost;
mod products;

pub use cost::decode_cost;
pub use products::{
    decode_error_messages, decode_page, decode_product, PageResult, Product, ShapeError,
    UNKNOWN_ERROR_MESSAGE,
};
