//! Pagination helpers for the scan history endpoint
//!
//! The history endpoint paginates by `limit`/`offset` rather than page
//! tokens; these types keep the query-building and offset math in one place.

/// Default number of scans per history request
pub const DEFAULT_PAGE_SIZE: usize = 20;

/// Maximum page size accepted by the history endpoint
pub const MAX_PAGE_SIZE: usize = 100;

/// Limit/offset parameters for history requests.
///
/// # Example
/// ```ignore
/// let params = HistoryParams::new().limit(50).offset(100);
/// ```
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct HistoryParams {
    /// Number of items to return (default: 20, max: 100)
    pub limit: Option<usize>,
    /// Number of items to skip from the newest scan
    pub offset: Option<usize>,
}

impl HistoryParams {
    /// Create new history params with defaults.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the page size.
    pub fn limit(mut self, limit: usize) -> Self {
        self.limit = Some(limit.min(MAX_PAGE_SIZE));
        self
    }

    /// Set the starting offset.
    pub fn offset(mut self, offset: usize) -> Self {
        self.offset = Some(offset);
        self
    }

    /// Effective page size after defaulting.
    pub fn effective_limit(&self) -> usize {
        self.limit.unwrap_or(DEFAULT_PAGE_SIZE)
    }

    /// Convert to query string parameters.
    ///
    /// Both parameters are always sent so every request names its page
    /// explicitly instead of leaning on endpoint defaults.
    pub fn to_query_params(&self) -> Vec<(&'static str, String)> {
        vec![
            ("limit", self.effective_limit().to_string()),
            ("offset", self.offset.unwrap_or(0).to_string()),
        ]
    }
}

/// Offsets of the pages remaining after a first response.
///
/// Given the first page's offset and the server-reported `total`, returns the
/// offsets needed to fetch everything else at the same page size. Used by
/// `scan history --all` to fan the remaining requests out concurrently.
pub fn remaining_offsets(total: usize, page_size: usize, first_offset: usize) -> Vec<usize> {
    if page_size == 0 {
        return Vec::new();
    }

    (first_offset + page_size..total)
        .step_by(page_size)
        .collect()
}
