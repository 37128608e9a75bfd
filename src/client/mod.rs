//! GraphQL transport
//!
//! This module contains everything needed to put one query on the wire:
//! - The [`Transport`] seam the pagination engine calls through
//! - A reqwest-backed HTTP implementation
//! - Error classification for network failures

mod http;
mod transport;

pub use http::{build_http_client, HttpTransport, DEFAULT_TIMEOUT_MS, USER_AGENT};
pub use transport::{GraphqlResponse, Transport, TransportError};
