//! Scan history wire model

use serde::{Deserialize, Serialize};

use super::ScanRecord;

/// One page of scan history, newest first
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HistoryPage {
    /// Scan records for this page
    pub scans: Vec<ScanRecord>,

    /// Total number of scans across all pages
    pub total: usize,

    /// Whether more pages exist past this one
    pub has_more: bool,
}
