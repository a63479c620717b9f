//! Scan session: one image upload and the status-polling loop that follows.
//!
//! A [`ScanSession`] owns the client-side state for a single scan: the
//! client-generated scan id, the upload and polling state tags, the most
//! recently fetched [`ScanRecord`], and the last-seen error. The polling loop
//! runs as a spawned task; cancellation is cooperative through an epoch
//! counter so a superseded loop exits at its next checkpoint and its late
//! responses are discarded rather than resurrecting stale state.
//!
//! Session state sits behind an async RwLock. The lock enforces the
//! single-writer discipline the upload/poll methods assume, so a session can
//! be shared (`Arc<ScanSession>`) between a UI task and the polling task.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex as StdMutex};
use std::time::Duration;

use log::{debug, warn};
use tokio::sync::RwLock;
use tokio::task::JoinHandle;
use uuid::Uuid;

use crate::client::ScanApi;
use crate::client::models::{ScanRecord, UploadAck};
use crate::error::{Result, SessionError};

/// Default wait between status polls
pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_secs(2);

/// Upload lifecycle for a session
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum UploadState {
    #[default]
    NotStarted,
    Uploading,
    Uploaded,
    UploadFailed,
}

/// Polling lifecycle for a session
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PollState {
    #[default]
    Idle,
    Polling,
    Stopped,
}

/// Polling cadence and bounds.
///
/// The backend gives no completion estimate, so the default polls at a fixed
/// interval with no bound, matching the "poll while the screen is open"
/// behavior callers expect. Batch callers should set `max_attempts` or
/// `deadline`; whichever trips first stops the loop and records a timeout in
/// `last_error`.
#[derive(Debug, Clone, Copy)]
pub struct PollPolicy {
    /// Fixed wait between polls (no backoff, no jitter)
    pub interval: Duration,
    /// Stop after this many poll attempts
    pub max_attempts: Option<u32>,
    /// Stop once this much wall-clock time has elapsed
    pub deadline: Option<Duration>,
}

impl Default for PollPolicy {
    fn default() -> Self {
        Self {
            interval: DEFAULT_POLL_INTERVAL,
            max_attempts: None,
            deadline: None,
        }
    }
}

/// Point-in-time copy of session state, for display
#[derive(Debug, Clone, Default)]
pub struct SessionSnapshot {
    pub scan_id: Option<String>,
    pub upload_state: UploadState,
    pub poll_state: PollState,
    pub latest_record: Option<ScanRecord>,
    pub last_error: Option<String>,
}

/// Mutable session state behind the lock
#[derive(Debug, Default)]
struct SessionState {
    scan_id: Option<String>,
    upload_state: UploadState,
    poll_state: PollState,
    latest_record: Option<ScanRecord>,
    last_error: Option<String>,
}

/// Coordinates one scan: upload, then poll until analysis completes.
pub struct ScanSession {
    client: Arc<dyn ScanApi>,
    policy: PollPolicy,
    state: Arc<RwLock<SessionState>>,
    /// Current polling generation. Bumping it invalidates whichever loop was
    /// live; the loop re-checks before every request and before applying any
    /// response.
    epoch: Arc<AtomicU64>,
    poll_task: StdMutex<Option<JoinHandle<()>>>,
}

impl ScanSession {
    /// Create a session with the default polling policy.
    pub fn new(client: Arc<dyn ScanApi>) -> Self {
        Self::with_policy(client, PollPolicy::default())
    }

    /// Create a session with a custom polling policy.
    pub fn with_policy(client: Arc<dyn ScanApi>, policy: PollPolicy) -> Self {
        Self {
            client,
            policy,
            state: Arc::new(RwLock::new(SessionState::default())),
            epoch: Arc::new(AtomicU64::new(0)),
            poll_task: StdMutex::new(None),
        }
    }

    /// Begin a fresh scan: new id, clean state, any previous loop superseded.
    ///
    /// Purely local; the backend learns about the id on first upload. Returns
    /// the new scan id.
    pub async fn start_new_scan(&self) -> String {
        let scan_id = Uuid::new_v4().to_string();
        debug!("Starting new scan session {}", scan_id);
        self.reset_with_id(scan_id.clone()).await;
        scan_id
    }

    /// Attach this session to an existing scan (e.g. one picked from
    /// history) with the same clean-slate semantics as [`start_new_scan`].
    ///
    /// [`start_new_scan`]: Self::start_new_scan
    pub async fn resume_scan(&self, scan_id: impl Into<String>) {
        let scan_id = scan_id.into();
        debug!("Resuming scan session {}", scan_id);
        self.reset_with_id(scan_id).await;
    }

    async fn reset_with_id(&self, scan_id: String) {
        // Bump the epoch while holding the state lock: a live loop applies
        // responses only after re-checking the epoch under this same lock,
        // so it can never write past the reset.
        let mut state = self.state.write().await;
        self.epoch.fetch_add(1, Ordering::SeqCst);
        self.drop_poll_handle();
        *state = SessionState {
            scan_id: Some(scan_id),
            ..SessionState::default()
        };
    }

    /// The session's scan id, if a scan has been started.
    pub async fn scan_id(&self) -> Option<String> {
        self.state.read().await.scan_id.clone()
    }

    /// Copy the current state for display.
    pub async fn snapshot(&self) -> SessionSnapshot {
        let state = self.state.read().await;
        SessionSnapshot {
            scan_id: state.scan_id.clone(),
            upload_state: state.upload_state,
            poll_state: state.poll_state,
            latest_record: state.latest_record.clone(),
            last_error: state.last_error.clone(),
        }
    }

    /// Upload a captured label image, then start polling on success.
    ///
    /// Exactly one network attempt; a failed upload is terminal for this call
    /// and the caller decides whether to re-invoke. A second call while one
    /// is in flight is rejected rather than racing it.
    pub async fn upload_image(&self, image: &[u8]) -> Result<UploadAck> {
        let scan_id = {
            let mut state = self.state.write().await;
            let scan_id = state
                .scan_id
                .clone()
                .ok_or(SessionError::MissingScanId)?;
            if state.upload_state == UploadState::Uploading {
                return Err(SessionError::UploadInProgress.into());
            }
            state.upload_state = UploadState::Uploading;
            state.last_error = None;
            scan_id
        };

        let result = self.client.submit_scan_image(&scan_id, image).await;

        {
            let mut state = self.state.write().await;
            // The session may have been reset while the request was in
            // flight; the new scan owns the state now.
            if state.scan_id.as_deref() != Some(scan_id.as_str()) {
                debug!("Discarding upload result for superseded scan {}", scan_id);
                return result;
            }

            match &result {
                Ok(ack) => {
                    debug!(
                        "Upload accepted for {} (queued: {}, position: {})",
                        scan_id, ack.queued, ack.queue_position
                    );
                    state.upload_state = UploadState::Uploaded;
                    state.last_error = None;
                }
                Err(err) => {
                    warn!("Upload failed for {}: {}", scan_id, err);
                    state.upload_state = UploadState::UploadFailed;
                    state.last_error = Some(err.to_string());
                    return result;
                }
            }
        }

        // Successful upload hands off to the polling loop
        self.start_polling().await?;
        result
    }

    /// Start (or restart) the polling loop for this scan.
    ///
    /// At most one loop is live per session: starting bumps the epoch, which
    /// retires any previous loop at its next checkpoint.
    pub async fn start_polling(&self) -> Result<()> {
        let scan_id = {
            let mut state = self.state.write().await;
            let scan_id = state
                .scan_id
                .clone()
                .ok_or(SessionError::MissingScanId)?;
            state.poll_state = PollState::Polling;
            scan_id
        };

        let my_epoch = self.epoch.fetch_add(1, Ordering::SeqCst) + 1;
        debug!("Polling scan {} (epoch {})", scan_id, my_epoch);

        let handle = tokio::spawn(poll_loop(
            self.client.clone(),
            self.state.clone(),
            self.epoch.clone(),
            my_epoch,
            self.policy,
            scan_id,
        ));

        let mut slot = self.poll_task.lock().expect("poll task lock poisoned");
        *slot = Some(handle);

        Ok(())
    }

    /// Stop the polling loop, if one is active.
    ///
    /// Safe to call when idle. After this returns no further status requests
    /// are issued for the retired loop; a response already in flight is
    /// discarded when it lands.
    pub async fn stop_polling(&self) {
        let mut state = self.state.write().await;
        self.epoch.fetch_add(1, Ordering::SeqCst);
        if state.poll_state == PollState::Polling {
            debug!("Polling stopped for {:?}", state.scan_id);
            state.poll_state = PollState::Stopped;
        }
    }

    /// Wait for the current polling loop to finish (terminal record, bound
    /// exhausted, or cancellation observed).
    pub async fn join_polling(&self) {
        let handle = {
            let mut slot = self.poll_task.lock().expect("poll task lock poisoned");
            slot.take()
        };
        if let Some(handle) = handle {
            let _ = handle.await;
        }
    }

    fn drop_poll_handle(&self) {
        let mut slot = self.poll_task.lock().expect("poll task lock poisoned");
        // Detach rather than abort: the loop notices the epoch bump itself
        slot.take();
    }
}

/// The polling loop body, run as a spawned task.
///
/// Checkpoints: the epoch is checked before each request and again before a
/// response (or error) is applied, so a retired loop can neither issue new
/// requests nor write stale results. Request failures are recorded and
/// retried at the same cadence; only a terminal record or an exhausted bound
/// ends the loop.
async fn poll_loop(
    client: Arc<dyn ScanApi>,
    state: Arc<RwLock<SessionState>>,
    epoch: Arc<AtomicU64>,
    my_epoch: u64,
    policy: PollPolicy,
    scan_id: String,
) {
    let started = tokio::time::Instant::now();
    let mut attempts: u32 = 0;

    loop {
        if epoch.load(Ordering::SeqCst) != my_epoch {
            debug!("Poll loop for {} superseded, exiting", scan_id);
            return;
        }

        let attempts_exhausted = policy.max_attempts.is_some_and(|max| attempts >= max);
        let deadline_passed = policy
            .deadline
            .is_some_and(|deadline| started.elapsed() >= deadline);
        if attempts_exhausted || deadline_passed {
            warn!(
                "Giving up on scan {} after {} polls ({}s elapsed)",
                scan_id,
                attempts,
                started.elapsed().as_secs()
            );
            let mut s = state.write().await;
            if epoch.load(Ordering::SeqCst) != my_epoch {
                return;
            }
            s.poll_state = PollState::Stopped;
            s.last_error = Some(format!(
                "Polling gave up after {} attempts without a complete analysis",
                attempts
            ));
            return;
        }

        attempts += 1;
        match client.get_scan(&scan_id).await {
            Ok(record) => {
                let complete = record.analysis_complete();
                debug!(
                    "Poll {} for {}: status={}, analysis={:?}",
                    attempts, scan_id, record.status, record.analysis_status
                );

                // Epoch re-check under the lock: a session reset or restart
                // holds this lock while bumping, so a stale response can
                // never land in the successor's state
                let mut s = state.write().await;
                if epoch.load(Ordering::SeqCst) != my_epoch {
                    debug!("Discarding stale poll response for {}", scan_id);
                    return;
                }
                s.latest_record = Some(record);
                s.last_error = None;
                if complete {
                    s.poll_state = PollState::Stopped;
                    debug!("Analysis complete for {}", scan_id);
                    return;
                }
            }
            Err(err) => {
                let mut s = state.write().await;
                if epoch.load(Ordering::SeqCst) != my_epoch {
                    return;
                }
                // Transient by assumption: the user is waiting on this scan,
                // so the loop keeps trying at the same cadence
                warn!("Poll {} for {} failed: {}", attempts, scan_id, err);
                s.last_error = Some(err.to_string());
            }
        }

        tokio::time::sleep(policy.interval).await;
    }
}
