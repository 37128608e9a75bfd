//! Pagination phase definitions
//!
//! A run moves through `Fetching → Calling → Parsing` once per page and ends
//! in exactly one terminal phase.

use std::fmt;

/// Where a pagination run is, or why it ended
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FetchPhase {
    // ===== Active Phases =====
    /// Waiting on the budget gate and preparing the next request
    Fetching,

    /// Request in flight, possibly retrying
    Calling,

    /// Decoding the response
    Parsing,

    // ===== Terminal Success Phases =====
    /// The server reported no further pages
    Completed,

    /// The requested number of records has been collected
    LimitReached,

    // ===== Terminal Early-Stop Phases =====
    /// The server returned a page with no records
    EmptyPage,

    /// Retries exhausted or the request could not be made
    RequestFailed,

    /// The response carried no `data`
    MissingData,

    /// The response body did not have the expected connection shape
    MalformedPage,

    /// The server claimed more pages but sent no cursor to continue from
    MissingCursor,

    /// The run was cancelled
    Cancelled,
}

impl FetchPhase {
    /// Returns true if the run has ended
    pub fn is_terminal(&self) -> bool {
        !matches!(self, Self::Fetching | Self::Calling | Self::Parsing)
    }

    /// Returns true if the run ended because there was nothing left to fetch
    pub fn is_success(&self) -> bool {
        matches!(self, Self::Completed | Self::LimitReached)
    }

    /// Returns true if the run stopped before enumeration was complete
    pub fn is_partial(&self) -> bool {
        self.is_terminal() && !self.is_success()
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Fetching => "fetching",
            Self::Calling => "calling",
            Self::Parsing => "parsing",
            Self::Completed => "completed",
            Self::LimitReached => "limit_reached",
            Self::EmptyPage => "empty_page",
            Self::RequestFailed => "request_failed",
            Self::MissingData => "missing_data",
            Self::MalformedPage => "malformed_page",
            Self::MissingCursor => "missing_cursor",
            Self::Cancelled => "cancelled",
        }
    }
}

impl fmt::Display for FetchPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
