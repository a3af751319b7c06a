// Test doubles for the injected kernel services.
//
// Scripted extraction provider and recording connections, usable from unit
// tests and from the integration tests under tests/.

use async_trait::async_trait;
use std::collections::VecDeque;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Mutex;
use tokio::time::Instant;

use super::connection_registry::{Connection, DeliveryError};
use super::traits::{BaseExtractionProvider, ProviderError, ProviderJobStatus, SubmissionRequest};

// =============================================================================
// Mock Extraction Provider
// =============================================================================

/// Provider whose status answers are scripted in order.
///
/// Once the script runs out, every further poll answers with the fallback
/// (pending unless changed with `always_transient_error`).
pub struct MockExtractionProvider {
    job_id: String,
    submit_error: Option<ProviderError>,
    script: Mutex<VecDeque<Result<ProviderJobStatus, ProviderError>>>,
    fallback: Result<ProviderJobStatus, ProviderError>,
    submissions: Mutex<Vec<SubmissionRequest>>,
    poll_times: Mutex<Vec<Instant>>,
    hang_polls: bool,
}

impl MockExtractionProvider {
    pub fn new() -> Self {
        Self {
            job_id: "job-1".to_string(),
            submit_error: None,
            script: Mutex::new(VecDeque::new()),
            fallback: Ok(ProviderJobStatus::Pending),
            submissions: Mutex::new(Vec::new()),
            poll_times: Mutex::new(Vec::new()),
            hang_polls: false,
        }
    }

    pub fn with_job_id(mut self, job_id: &str) -> Self {
        self.job_id = job_id.to_string();
        self
    }

    pub fn reject_submission(mut self, message: &str) -> Self {
        self.submit_error = Some(ProviderError::rejected(message).with_status(401));
        self
    }

    pub fn then_poll(self, result: Result<ProviderJobStatus, ProviderError>) -> Self {
        self.script.lock().unwrap().push_back(result);
        self
    }

    pub fn then_pending(self, times: usize) -> Self {
        (0..times).fold(self, |mock, _| mock.then_poll(Ok(ProviderJobStatus::Pending)))
    }

    pub fn then_ready(self, data: serde_json::Value) -> Self {
        self.then_poll(Ok(ProviderJobStatus::Succeeded(data)))
    }

    pub fn then_failed(self, detail: &str) -> Self {
        self.then_poll(Ok(ProviderJobStatus::Failed(detail.to_string())))
    }

    pub fn then_transient_error(self, message: &str) -> Self {
        self.then_poll(Err(ProviderError::transient(message).with_status(503)))
    }

    pub fn always_transient_error(mut self, message: &str) -> Self {
        self.fallback = Err(ProviderError::transient(message).with_status(503));
        self
    }

    /// Status queries are recorded but never answered.
    pub fn hang_polls(mut self) -> Self {
        self.hang_polls = true;
        self
    }

    /// Every request passed to `submit`
    pub fn submissions(&self) -> Vec<SubmissionRequest> {
        self.submissions.lock().unwrap().clone()
    }

    pub fn poll_count(&self) -> usize {
        self.poll_times.lock().unwrap().len()
    }

    /// Clock readings at each poll
    pub fn poll_times(&self) -> Vec<Instant> {
        self.poll_times.lock().unwrap().clone()
    }
}

impl Default for MockExtractionProvider {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl BaseExtractionProvider for MockExtractionProvider {
    async fn submit(&self, request: SubmissionRequest) -> Result<String, ProviderError> {
        self.submissions.lock().unwrap().push(request);
        match &self.submit_error {
            Some(e) => Err(e.clone()),
            None => Ok(self.job_id.clone()),
        }
    }

    async fn poll(&self, _job_id: &str) -> Result<ProviderJobStatus, ProviderError> {
        self.poll_times.lock().unwrap().push(Instant::now());
        if self.hang_polls {
            std::future::pending::<()>().await;
        }
        self.script
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| self.fallback.clone())
    }

    fn name(&self) -> &str {
        "mock"
    }
}

// =============================================================================
// Recording Connection
// =============================================================================

/// Connection that keeps every message written to it.
pub struct RecordingConnection {
    messages: Mutex<Vec<String>>,
    open: AtomicBool,
    closed_by_server: AtomicBool,
    fail_writes: bool,
    stall_writes: bool,
    stall_close: bool,
}

impl RecordingConnection {
    pub fn new() -> Self {
        Self {
            messages: Mutex::new(Vec::new()),
            open: AtomicBool::new(true),
            closed_by_server: AtomicBool::new(false),
            fail_writes: false,
            stall_writes: false,
            stall_close: false,
        }
    }

    /// Writes fail with a transport error while the connection still looks open.
    pub fn failing(mut self) -> Self {
        self.fail_writes = true;
        self
    }

    /// Writes never complete.
    pub fn stalled(mut self) -> Self {
        self.stall_writes = true;
        self
    }

    /// The close handshake never completes, like a socket with a full send
    /// buffer.
    pub fn stalled_close(mut self) -> Self {
        self.stall_close = true;
        self
    }

    /// Simulate the client going away without a close handshake.
    pub fn close_remote(&self) {
        self.open.store(false, Ordering::SeqCst);
    }

    pub fn messages(&self) -> Vec<String> {
        self.messages.lock().unwrap().clone()
    }

    pub fn was_closed(&self) -> bool {
        self.closed_by_server.load(Ordering::SeqCst)
    }
}

impl Default for RecordingConnection {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Connection for RecordingConnection {
    async fn send_text(&self, text: String) -> Result<(), DeliveryError> {
        if self.stall_writes {
            std::future::pending::<()>().await;
        }
        if self.fail_writes {
            return Err(DeliveryError::Transport("broken pipe".to_string()));
        }
        if !self.is_open() {
            return Err(DeliveryError::Closed);
        }
        self.messages.lock().unwrap().push(text);
        Ok(())
    }

    fn is_open(&self) -> bool {
        self.open.load(Ordering::SeqCst)
    }

    async fn close(&self) {
        self.closed_by_server.store(true, Ordering::SeqCst);
        self.open.store(false, Ordering::SeqCst);
        if self.stall_close {
            std::future::pending::<()>().await;
        }
    }
}
