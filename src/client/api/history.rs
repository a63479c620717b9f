//! Scan history API trait

use async_trait::async_trait;

use crate::client::models::HistoryPage;
use crate::client::pagination::HistoryParams;
use crate::error::Result;

/// Paged access to the caller's past scans
#[async_trait]
pub trait HistoryApi: Send + Sync {
    /// Fetch one page of scan history, newest first
    async fn scan_history(&self, params: Option<&HistoryParams>) -> Result<HistoryPage>;
}
