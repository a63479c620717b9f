//! Mock LabelCheck API client for testing
//!
//! Provides a scripted implementation of the API traits for unit testing
//! without making real API calls. Poll responses are scripted per call so
//! tests can drive the session's polling loop through arbitrary sequences.

use std::collections::VecDeque;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use chrono::Utc;

use super::api::{AuthApi, HistoryApi, ScanApi};
use super::models::{HistoryPage, ScanRecord, SessionToken, UploadAck};
use super::pagination::HistoryParams;
use crate::error::{ApiError, Result};

/// Scripted outcome for one `get_scan` call
#[derive(Debug, Clone)]
pub enum PollStep {
    /// Return this record
    Record(ScanRecord),
    /// Fail with a transport error
    TransportError,
    /// Fail with a 5xx-style server error
    ServerError,
}

/// Scripted outcome for `submit_scan_image`
#[derive(Debug, Clone)]
pub enum UploadOutcome {
    /// Accept the image with this ack
    Ack(UploadAck),
    /// Reject with a server error carrying this body
    ServerError(String),
    /// Fail with a transport error
    TransportError,
}

/// Mock API client for testing.
///
/// Configure scripted responses via builder methods, then drive the code
/// under test. Call counts are tracked for verification. Locks are plain
/// std mutexes: nothing is held across an await point.
///
/// # Example
/// ```ignore
/// let mock = MockLabelCheckClient::new()
///     .with_poll_steps(vec![PollStep::Record(record)]);
///
/// let record = mock.get_scan("scan-1").await?;
/// assert_eq!(mock.counts().get_scan, 1);
/// ```
pub struct MockLabelCheckClient {
    /// Outcome for upload calls (shared by every call)
    upload_outcome: Arc<Mutex<UploadOutcome>>,
    /// Artificial latency before an upload resolves
    upload_delay: Arc<Mutex<Option<std::time::Duration>>>,
    /// Scripted get_scan outcomes, consumed front to back
    poll_steps: Arc<Mutex<VecDeque<PollStep>>>,
    /// Last record served; replayed once the script is exhausted
    last_served: Arc<Mutex<Option<ScanRecord>>>,
    /// Full history backing store; pages are sliced per request
    history: Arc<Mutex<Vec<ScanRecord>>>,
    /// Track number of calls for verification
    call_count: Arc<Mutex<CallCounts>>,
    /// Scan ids observed across all scan operations
    captured_scan_ids: Arc<Mutex<Vec<String>>>,
}

impl Default for MockLabelCheckClient {
    fn default() -> Self {
        Self {
            upload_outcome: Arc::new(Mutex::new(UploadOutcome::Ack(UploadAck {
                queued: true,
                queue_position: 1,
                content_hash: Some("cafebabe".to_string()),
            }))),
            upload_delay: Arc::new(Mutex::new(None)),
            poll_steps: Arc::new(Mutex::new(VecDeque::new())),
            last_served: Arc::new(Mutex::new(None)),
            history: Arc::new(Mutex::new(Vec::new())),
            call_count: Arc::new(Mutex::new(CallCounts::default())),
            captured_scan_ids: Arc::new(Mutex::new(Vec::new())),
        }
    }
}

/// Tracks API call counts for test verification
#[derive(Default, Debug, Clone)]
pub struct CallCounts {
    pub sign_in_anonymous: usize,
    pub submit_scan_image: usize,
    pub get_scan: usize,
    pub reanalyze_scan: usize,
    pub scan_history: usize,
}

impl MockLabelCheckClient {
    /// Create a new mock with default (successful, empty) behavior.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the outcome for upload calls.
    pub fn with_upload_outcome(self, outcome: UploadOutcome) -> Self {
        *self.upload_outcome.lock().unwrap() = outcome;
        self
    }

    /// Delay upload resolution, for tests that race a second call against an
    /// in-flight one.
    pub fn with_upload_delay(self, delay: std::time::Duration) -> Self {
        *self.upload_delay.lock().unwrap() = Some(delay);
        self
    }

    /// Script the sequence of get_scan outcomes.
    pub fn with_poll_steps(self, steps: Vec<PollStep>) -> Self {
        *self.poll_steps.lock().unwrap() = steps.into();
        self
    }

    /// Seed the history backing store.
    pub fn with_history(self, scans: Vec<ScanRecord>) -> Self {
        *self.history.lock().unwrap() = scans;
        self
    }

    /// Get a snapshot of the call counts.
    pub fn counts(&self) -> CallCounts {
        self.call_count.lock().unwrap().clone()
    }

    /// Scan ids observed across scan operations, in call order.
    pub fn captured_scan_ids(&self) -> Vec<String> {
        self.captured_scan_ids.lock().unwrap().clone()
    }
}

#[async_trait]
impl AuthApi for MockLabelCheckClient {
    async fn sign_in_anonymous(&self, _api_key: &str) -> Result<SessionToken> {
        self.call_count.lock().unwrap().sign_in_anonymous += 1;
        Ok(SessionToken {
            access_token: "mock-token".to_string(),
            refresh_token: None,
            expires_at: Utc::now() + chrono::Duration::hours(1),
        })
    }
}

#[async_trait]
impl ScanApi for MockLabelCheckClient {
    async fn submit_scan_image(&self, scan_id: &str, _image: &[u8]) -> Result<UploadAck> {
        self.call_count.lock().unwrap().submit_scan_image += 1;
        self.captured_scan_ids
            .lock()
            .unwrap()
            .push(scan_id.to_string());

        let delay = *self.upload_delay.lock().unwrap();
        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }

        let outcome = self.upload_outcome.lock().unwrap().clone();
        match outcome {
            UploadOutcome::Ack(ack) => Ok(ack),
            UploadOutcome::ServerError(body) => Err(ApiError::ServerError(body).into()),
            UploadOutcome::TransportError => {
                Err(ApiError::Network("simulated connection failure".to_string()).into())
            }
        }
    }

    async fn get_scan(&self, scan_id: &str) -> Result<ScanRecord> {
        self.call_count.lock().unwrap().get_scan += 1;
        self.captured_scan_ids
            .lock()
            .unwrap()
            .push(scan_id.to_string());

        let step = self.poll_steps.lock().unwrap().pop_front();
        match step {
            Some(PollStep::Record(record)) => {
                *self.last_served.lock().unwrap() = Some(record.clone());
                Ok(record)
            }
            Some(PollStep::TransportError) => {
                Err(ApiError::Network("simulated connection failure".to_string()).into())
            }
            Some(PollStep::ServerError) => {
                Err(ApiError::ServerError("simulated server error".to_string()).into())
            }
            None => {
                let last = self.last_served.lock().unwrap().clone();
                match last {
                    // Script exhausted: keep replaying the last record so an
                    // over-polling loop shows up in call counts, not a panic
                    Some(record) => Ok(record),
                    None => Err(ApiError::NotFound(format!("scan {}", scan_id)).into()),
                }
            }
        }
    }

    async fn reanalyze_scan(&self, scan_id: &str) -> Result<ScanRecord> {
        self.call_count.lock().unwrap().reanalyze_scan += 1;
        self.captured_scan_ids
            .lock()
            .unwrap()
            .push(scan_id.to_string());

        let last = self.last_served.lock().unwrap().clone();
        match last {
            Some(record) => Ok(record),
            None => Err(ApiError::NotFound(format!("scan {}", scan_id)).into()),
        }
    }
}

#[async_trait]
impl HistoryApi for MockLabelCheckClient {
    async fn scan_history(&self, params: Option<&HistoryParams>) -> Result<HistoryPage> {
        self.call_count.lock().unwrap().scan_history += 1;

        let params = params.copied().unwrap_or_default();
        let limit = params.effective_limit();
        let offset = params.offset.unwrap_or(0);

        let all = self.history.lock().unwrap();
        let total = all.len();
        let scans: Vec<ScanRecord> = all.iter().skip(offset).take(limit).cloned().collect();
        let has_more = offset + scans.len() < total;

        Ok(HistoryPage {
            scans,
            total,
            has_more,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::client::fixtures::ScanRecordBuilder;

    #[tokio::test]
    async fn test_mock_replays_last_record_after_script() {
        let mock = MockLabelCheckClient::new().with_poll_steps(vec![PollStep::Record(
            ScanRecordBuilder::new("scan-1").build(),
        )]);

        let first = mock.get_scan("scan-1").await.unwrap();
        let second = mock.get_scan("scan-1").await.unwrap();

        assert_eq!(first.id, second.id);
        assert_eq!(mock.counts().get_scan, 2);
    }

    #[tokio::test]
    async fn test_mock_history_slices_pages() {
        let records: Vec<_> = (0..45)
            .map(|i| ScanRecordBuilder::new(format!("scan-{}", i)).build())
            .collect();
        let mock = MockLabelCheckClient::new().with_history(records);

        let page = mock
            .scan_history(Some(&HistoryParams::new().limit(20)))
            .await
            .unwrap();
        assert_eq!(page.scans.len(), 20);
        assert_eq!(page.total, 45);
        assert!(page.has_more);

        let last = mock
            .scan_history(Some(&HistoryParams::new().limit(20).offset(40)))
            .await
            .unwrap();
        assert_eq!(last.scans.len(), 5);
        assert!(!last.has_more);
    }

    #[tokio::test]
    async fn test_mock_counts_cover_all_operations() {
        let mock = MockLabelCheckClient::new()
            .with_poll_steps(vec![PollStep::Record(ScanRecordBuilder::new("s").build())]);

        mock.sign_in_anonymous("key").await.unwrap();
        mock.get_scan("s").await.unwrap();
        mock.reanalyze_scan("s").await.unwrap();
        mock.scan_history(None).await.unwrap();

        let counts = mock.counts();
        assert_eq!(counts.sign_in_anonymous, 1);
        assert_eq!(counts.get_scan, 1);
        assert_eq!(counts.reanalyze_scan, 1);
        assert_eq!(counts.scan_history, 1);
        assert_eq!(mock.captured_scan_ids(), vec!["s", "s"]);
    }

    #[tokio::test]
    async fn test_mock_upload_failure() {
        let mock = MockLabelCheckClient::new()
            .with_upload_outcome(UploadOutcome::ServerError("boom".to_string()));

        let err = mock.submit_scan_image("scan-1", b"jpeg").await.unwrap_err();
        assert!(err.to_string().contains("boom"));
    }
}
