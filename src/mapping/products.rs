use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;

/// Message used when a GraphQL error entry has no `message` field
pub const UNKNOWN_ERROR_MESSAGE: &str = "Unknown GraphQL error";

/// A product record, the subset of fields the sync needs
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Product {
    /// Global ID, e.g. `gid://shopify/Product/1042`
    pub id: String,

    pub title: String,

    /// ISO-8601 timestamp as reported by the server
    pub updated_at: String,
}

/// One decoded page of the products connection
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PageResult {
    /// Records in server order
    pub records: Vec<Product>,

    /// Cursor of the last edge in the page, if any edge carried one
    pub last_cursor: Option<String>,

    /// `false` is terminal regardless of the cursor
    pub has_next_page: bool,
}

impl PageResult {
    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

/// Errors raised when a response body does not have the expected shape
#[derive(Debug, Error)]
pub enum ShapeError {
    #[error("Response missing 'data' field")]
    MissingData,

    #[error("Response missing 'data.{0}' field")]
    MissingConnection(&'static str),

    #[error("Edge cursor is not a string: {0}")]
    InvalidCursor(String),

    #[error("Malformed product node: {0}")]
    InvalidNode(#[from] serde_json::Error),
}

/// Maps a single product JSON node into a [`Product`]
///
/// Missing fields default to empty strings; fields of the wrong type are an
/// error.
pub fn decode_product(node: &Value) -> Result<Product, ShapeError> {
    Ok(Product::deserialize(node)?)
}

/// Decodes a full products-connection response into a [`PageResult`]
///
/// # Errors
///
/// * [`ShapeError::MissingData`] - the body has no `data` field
/// * [`ShapeError::MissingConnection`] - `data` has no `products` field
/// * [`ShapeError::InvalidCursor`] / [`ShapeError::InvalidNode`] - malformed edge
///
/// A `null` `data` (typical when top-level errors are present) is not an error
/// and yields an empty page.
pub fn decode_page(body: &Value) -> Result<PageResult, ShapeError> {
    let mut page = PageResult::default();

    let data = body.get("data").ok_or(ShapeError::MissingData)?;
    if data.is_null() {
        return Ok(page);
    }

    let products = data
        .get("products")
        .ok_or(ShapeError::MissingConnection("products"))?;

    if let Some(edges) = products.get("edges").and_then(Value::as_array) {
        for edge in edges {
            if let Some(node) = edge.get("node") {
                page.records.push(decode_product(node)?);
            }
            if let Some(cursor) = edge.get("cursor") {
                let cursor = cursor
                    .as_str()
                    .ok_or_else(|| ShapeError::InvalidCursor(cursor.to_string()))?;
                page.last_cursor = Some(cursor.to_string());
            }
        }
    }

    page.has_next_page = products
        .get("pageInfo")
        .and_then(|info| info.get("hasNextPage"))
        .and_then(Value::as_bool)
        .unwrap_or(false);

    Ok(page)
}

/// Returns the GraphQL error messages in a response, in order
pub fn decode_error_messages(body: &Value) -> Vec<String> {
    let Some(errors) = body.get("errors").and_then(Value::as_array) else {
        return Vec::new();
    };

    errors
        .iter()
        .map(|err| {
            err.get("message")
                .and_then(Value::as_str)
                .unwrap_or(UNKNOWN_ERROR_MESSAGE)
                .to_string()
        })
        .collect()
}
