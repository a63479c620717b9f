//! Single-scan API trait

use async_trait::async_trait;

use crate::client::models::{ScanRecord, UploadAck};
use crate::error::Result;

/// Operations on a single scan
///
/// The scan id is client-generated; the backend materializes the scan record
/// on first contact with an unknown id.
#[async_trait]
pub trait ScanApi: Send + Sync {
    /// Upload a captured label image for a scan
    ///
    /// Issues exactly one multipart POST; callers decide whether and when to
    /// retry a failed upload.
    async fn submit_scan_image(&self, scan_id: &str, image: &[u8]) -> Result<UploadAck>;

    /// Fetch the current status record for a scan
    async fn get_scan(&self, scan_id: &str) -> Result<ScanRecord>;

    /// Request a fresh analysis of an already-extracted scan
    ///
    /// Used after the user's preferences change (the previous result is
    /// reported with `is_stale: true`). Returns the updated record.
    async fn reanalyze_scan(&self, scan_id: &str) -> Result<ScanRecord>;
}
