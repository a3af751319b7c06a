//! Extraction job orchestration.
//!
//! Drives one document through the external provider:
//!
//! ```text
//! SUBMITTING -> POLLING -> { SUCCEEDED | FAILED | TIMED_OUT }
//! ```
//!
//! Submission failures surface immediately. While polling, every status query
//! is classified as ready, not-ready, failed or transient-error. Not-ready and
//! transient errors both keep the loop going, and both spend the same wait
//! budget. The loop sleeps one poll interval before each query, so the
//! provider is never queried immediately after submission. The wait budget is
//! a hard bound: the last query is clamped to the deadline and a query still
//! outstanding when it passes is abandoned.
//!
//! Jobs share no state; independent orchestrations run fully in parallel.

use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;
use tokio::time::Instant;
use tracing::{debug, info, warn};

use super::mime::infer_mime_type;
use super::traits::{BaseExtractionProvider, ProviderError, ProviderJobStatus, SubmissionRequest};

/// Default wait budget for one job.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(120);

/// Default cadence between status queries.
pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_secs(2);

/// Terminal and non-terminal failures of an orchestration call.
#[derive(Debug, Error)]
pub enum ExtractionError {
    /// The provider refused the job (credentials, payload). Not retried.
    #[error("extraction submission rejected: {detail}")]
    Submission { detail: String },

    /// The wait budget ran out before the provider reached a terminal state.
    #[error("extraction job {job_id} timed out after {elapsed:?}")]
    Timeout { job_id: String, elapsed: Duration },

    /// The provider reported that the document could not be extracted.
    #[error("extraction job {job_id} failed: {detail}")]
    Failed { job_id: String, detail: String },
}

/// Lifecycle state of one extraction job.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum JobState {
    Submitting,
    Polling,
    Succeeded,
    Failed,
    TimedOut,
}

impl JobState {
    pub fn is_terminal(self) -> bool {
        matches!(self, JobState::Succeeded | JobState::Failed | JobState::TimedOut)
    }
}

/// Handle for a submitted job. Lives for one orchestration call only.
#[derive(Debug, Clone)]
pub struct ExtractionJob {
    job_id: String,
    file_name: String,
    mime_type: String,
    state: JobState,
    elapsed: Duration,
    poll_attempts: u32,
}

impl ExtractionJob {
    fn submitted(job_id: String, file_name: &str, mime_type: &str) -> Self {
        Self {
            job_id,
            file_name: file_name.to_string(),
            mime_type: mime_type.to_string(),
            state: JobState::Polling,
            elapsed: Duration::ZERO,
            poll_attempts: 0,
        }
    }

    pub fn job_id(&self) -> &str {
        &self.job_id
    }

    pub fn file_name(&self) -> &str {
        &self.file_name
    }

    pub fn mime_type(&self) -> &str {
        &self.mime_type
    }

    pub fn state(&self) -> JobState {
        self.state
    }

    pub fn elapsed(&self) -> Duration {
        self.elapsed
    }

    pub fn poll_attempts(&self) -> u32 {
        self.poll_attempts
    }

    fn transition(&mut self, next: JobState) {
        debug_assert!(
            !self.state.is_terminal(),
            "job {} already terminal ({:?})",
            self.job_id,
            self.state
        );
        debug!(job_id = %self.job_id, from = ?self.state, to = ?next, "Extraction job transition");
        self.state = next;
    }
}

/// Classification of one status query.
#[derive(Debug)]
enum PollOutcome {
    Ready(serde_json::Value),
    NotReady,
    Failed(String),
    TransientError(String),
}

impl From<Result<ProviderJobStatus, ProviderError>> for PollOutcome {
    fn from(result: Result<ProviderJobStatus, ProviderError>) -> Self {
        match result {
            Ok(ProviderJobStatus::Pending) => PollOutcome::NotReady,
            Ok(ProviderJobStatus::Succeeded(data)) => PollOutcome::Ready(data),
            Ok(ProviderJobStatus::Failed(detail)) => PollOutcome::Failed(detail),
            Err(e) if e.transient => PollOutcome::TransientError(e.message),
            Err(e) => PollOutcome::Failed(format!("status query rejected: {}", e)),
        }
    }
}

/// Submits documents to the extraction provider and waits for results.
pub struct ExtractionOrchestrator {
    provider: Arc<dyn BaseExtractionProvider>,
    timeout: Duration,
    poll_interval: Duration,
}

impl ExtractionOrchestrator {
    pub fn new(provider: Arc<dyn BaseExtractionProvider>) -> Self {
        Self {
            provider,
            timeout: DEFAULT_TIMEOUT,
            poll_interval: DEFAULT_POLL_INTERVAL,
        }
    }

    /// Set the default wait budget used by [`extract`](Self::extract).
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Set the default poll cadence used by [`extract`](Self::extract).
    pub fn with_poll_interval(mut self, poll_interval: Duration) -> Self {
        self.poll_interval = poll_interval;
        self
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    pub fn poll_interval(&self) -> Duration {
        self.poll_interval
    }

    /// Submit then wait with the configured defaults.
    pub async fn extract(
        &self,
        file_bytes: &[u8],
        file_name: &str,
        schema: &serde_json::Value,
    ) -> Result<serde_json::Value, ExtractionError> {
        let job = self.submit(file_bytes, file_name, schema).await?;
        self.await_completion(job, self.timeout, self.poll_interval)
            .await
    }

    /// Send the file to the provider and return the job handle.
    pub async fn submit(
        &self,
        file_bytes: &[u8],
        file_name: &str,
        schema: &serde_json::Value,
    ) -> Result<ExtractionJob, ExtractionError> {
        let mime_type = infer_mime_type(file_name);
        let request = SubmissionRequest {
            file_base64: STANDARD.encode(file_bytes),
            file_name: file_name.to_string(),
            mime_type: mime_type.to_string(),
            schema: schema.clone(),
        };

        debug!(
            provider = self.provider.name(),
            file_name,
            mime_type,
            bytes = file_bytes.len(),
            "Submitting extraction job"
        );

        let job_id = self.provider.submit(request).await.map_err(|e| {
            warn!(provider = self.provider.name(), file_name, error = %e, "Extraction submission rejected");
            ExtractionError::Submission {
                detail: e.to_string(),
            }
        })?;

        info!(job_id = %job_id, file_name, mime_type, "Extraction job submitted");
        Ok(ExtractionJob::submitted(job_id, file_name, mime_type))
    }

    /// Poll `job` every `poll_interval` until it reaches a terminal state or
    /// `timeout` has elapsed. A status query still in flight at the deadline
    /// is abandoned.
    pub async fn await_completion(
        &self,
        mut job: ExtractionJob,
        timeout: Duration,
        poll_interval: Duration,
    ) -> Result<serde_json::Value, ExtractionError> {
        let started = Instant::now();
        let deadline = started + timeout;

        loop {
            // The first query always waits a full interval; later waits stop
            // at the deadline so the final query lands inside the budget.
            let wake = Instant::now() + poll_interval;
            let wake = if job.poll_attempts == 0 {
                wake
            } else {
                wake.min(deadline)
            };
            tokio::time::sleep_until(wake).await;

            job.poll_attempts += 1;
            let polled =
                tokio::time::timeout_at(deadline, self.provider.poll(&job.job_id)).await;
            job.elapsed = started.elapsed();

            let outcome = match polled {
                Ok(result) => PollOutcome::from(result),
                Err(_) => {
                    debug!(job_id = %job.job_id, attempt = job.poll_attempts, "Status query outlived the wait budget");
                    return Err(Self::give_up(job));
                }
            };

            match outcome {
                PollOutcome::Ready(data) => {
                    job.transition(JobState::Succeeded);
                    info!(
                        job_id = %job.job_id,
                        attempts = job.poll_attempts,
                        elapsed_ms = job.elapsed.as_millis() as u64,
                        "Extraction job succeeded"
                    );
                    return Ok(data);
                }
                PollOutcome::Failed(detail) => {
                    job.transition(JobState::Failed);
                    warn!(job_id = %job.job_id, detail = %detail, "Extraction job failed");
                    return Err(ExtractionError::Failed {
                        job_id: job.job_id,
                        detail,
                    });
                }
                PollOutcome::NotReady => {
                    debug!(job_id = %job.job_id, attempt = job.poll_attempts, "Extraction not ready");
                }
                PollOutcome::TransientError(message) => {
                    warn!(
                        job_id = %job.job_id,
                        attempt = job.poll_attempts,
                        error = %message,
                        "Transient error polling extraction job, retrying"
                    );
                }
            }

            if job.elapsed >= timeout {
                return Err(Self::give_up(job));
            }
        }
    }

    fn give_up(mut job: ExtractionJob) -> ExtractionError {
        job.transition(JobState::TimedOut);
        warn!(
            job_id = %job.job_id,
            attempts = job.poll_attempts,
            elapsed_ms = job.elapsed.as_millis() as u64,
            "Gave up waiting for extraction job"
        );
        ExtractionError::Timeout {
            job_id: job.job_id,
            elapsed: job.elapsed,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::kernel::test_dependencies::MockExtractionProvider;
    use serde_json::json;

    const INTERVAL: Duration = Duration::from_secs(2);

    fn orchestrator(provider: Arc<MockExtractionProvider>) -> ExtractionOrchestrator {
        ExtractionOrchestrator::new(provider)
            .with_timeout(Duration::from_secs(30))
            .with_poll_interval(INTERVAL)
    }

    #[tokio::test(start_paused = true)]
    async fn ready_after_three_pending_polls() {
        let provider = Arc::new(
            MockExtractionProvider::new()
                .then_pending(3)
                .then_ready(json!({"full_name": "Jane Roe"})),
        );
        let orchestrator = orchestrator(provider.clone());

        let start = Instant::now();
        let data = orchestrator
            .extract(b"%PDF-1.7", "id.pdf", &json!({"type": "object"}))
            .await
            .unwrap();

        assert_eq!(data, json!({"full_name": "Jane Roe"}));
        assert_eq!(provider.poll_count(), 4);
        assert!(start.elapsed() >= INTERVAL * 3);
    }

    #[tokio::test(start_paused = true)]
    async fn first_poll_waits_one_interval() {
        let provider = Arc::new(MockExtractionProvider::new().then_ready(json!({})));
        let orchestrator = orchestrator(provider.clone());

        let start = Instant::now();
        orchestrator
            .extract(b"data", "scan.png", &json!({}))
            .await
            .unwrap();

        let polled_at = provider.poll_times();
        assert_eq!(polled_at.len(), 1);
        assert!(polled_at[0] - start >= INTERVAL);
    }

    #[tokio::test(start_paused = true)]
    async fn never_ready_times_out_no_earlier_than_budget() {
        let provider = Arc::new(MockExtractionProvider::new());
        let timeout = Duration::from_secs(10);
        let orchestrator = orchestrator(provider.clone());

        let start = Instant::now();
        let job = orchestrator
            .submit(b"data", "scan.jpg", &json!({}))
            .await
            .unwrap();
        let err = orchestrator
            .await_completion(job, timeout, INTERVAL)
            .await
            .unwrap_err();

        assert!(start.elapsed() >= timeout);
        match err {
            ExtractionError::Timeout { job_id, elapsed } => {
                assert_eq!(job_id, "job-1");
                assert!(elapsed >= timeout);
            }
            other => panic!("expected timeout, got {:?}", other),
        }
    }

    #[tokio::test(start_paused = true)]
    async fn hung_status_query_is_cut_off_at_the_deadline() {
        let provider = Arc::new(MockExtractionProvider::new().hang_polls());
        let timeout = Duration::from_secs(10);
        let orchestrator = orchestrator(provider.clone());

        let job = orchestrator
            .submit(b"data", "scan.pdf", &json!({}))
            .await
            .unwrap();
        let start = Instant::now();
        let err = tokio::time::timeout(
            Duration::from_secs(3600),
            orchestrator.await_completion(job, timeout, INTERVAL),
        )
        .await
        .expect("await_completion returns even if the provider never answers")
        .unwrap_err();

        match err {
            ExtractionError::Timeout { elapsed, .. } => {
                assert!(elapsed >= timeout);
                assert!(elapsed < timeout + INTERVAL);
            }
            other => panic!("expected timeout, got {:?}", other),
        }
        assert!(start.elapsed() < timeout + INTERVAL);
        assert_eq!(provider.poll_count(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn last_poll_lands_inside_the_budget() {
        let provider = Arc::new(MockExtractionProvider::new());
        let orchestrator = orchestrator(provider.clone());

        let job = orchestrator
            .submit(b"data", "scan.pdf", &json!({}))
            .await
            .unwrap();
        let start = Instant::now();
        let err = orchestrator
            .await_completion(job, Duration::from_secs(5), INTERVAL)
            .await
            .unwrap_err();

        assert!(matches!(err, ExtractionError::Timeout { .. }));
        // Queries at 2s, 4s, then one clamped to the 5s deadline.
        let offsets: Vec<Duration> = provider.poll_times().iter().map(|t| *t - start).collect();
        assert_eq!(
            offsets,
            vec![Duration::from_secs(2), Duration::from_secs(4), Duration::from_secs(5)]
        );
    }

    #[tokio::test(start_paused = true)]
    async fn transient_errors_are_retried() {
        let provider = Arc::new(
            MockExtractionProvider::new()
                .then_transient_error("502 bad gateway")
                .then_transient_error("connection reset")
                .then_pending(1)
                .then_ready(json!({"bill_no": "INV-7"})),
        );
        let orchestrator = orchestrator(provider.clone());

        let data = orchestrator
            .extract(b"data", "invoice.pdf", &json!({}))
            .await
            .unwrap();

        assert_eq!(data["bill_no"], "INV-7");
        assert_eq!(provider.poll_count(), 4);
    }

    #[tokio::test(start_paused = true)]
    async fn transient_errors_spend_the_wait_budget() {
        let provider = Arc::new(MockExtractionProvider::new().always_transient_error("503"));
        let orchestrator = orchestrator(provider.clone());

        let job = orchestrator
            .submit(b"data", "invoice.pdf", &json!({}))
            .await
            .unwrap();
        let err = orchestrator
            .await_completion(job, Duration::from_secs(6), INTERVAL)
            .await
            .unwrap_err();

        assert!(matches!(err, ExtractionError::Timeout { .. }));
        assert_eq!(provider.poll_count(), 3);
    }

    #[tokio::test(start_paused = true)]
    async fn provider_failure_is_distinct_from_timeout() {
        let provider = Arc::new(
            MockExtractionProvider::new()
                .then_pending(1)
                .then_failed("document is not an invoice"),
        );
        let orchestrator = orchestrator(provider.clone());

        let err = orchestrator
            .extract(b"data", "cat.png", &json!({}))
            .await
            .unwrap_err();

        match err {
            ExtractionError::Failed { job_id, detail } => {
                assert_eq!(job_id, "job-1");
                assert_eq!(detail, "document is not an invoice");
            }
            other => panic!("expected provider failure, got {:?}", other),
        }
    }

    #[tokio::test(start_paused = true)]
    async fn rejected_status_query_is_terminal() {
        let provider = Arc::new(
            MockExtractionProvider::new()
                .then_poll(Err(ProviderError::rejected("unknown job").with_status(404))),
        );
        let orchestrator = orchestrator(provider.clone());

        let err = orchestrator
            .extract(b"data", "id.pdf", &json!({}))
            .await
            .unwrap_err();

        assert!(matches!(err, ExtractionError::Failed { .. }));
        assert_eq!(provider.poll_count(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn submission_rejection_is_not_retried() {
        let provider = Arc::new(MockExtractionProvider::new().reject_submission("invalid api key"));
        let orchestrator = orchestrator(provider.clone());

        let err = orchestrator
            .extract(b"data", "id.pdf", &json!({}))
            .await
            .unwrap_err();

        match err {
            ExtractionError::Submission { detail } => assert!(detail.contains("invalid api key")),
            other => panic!("expected submission error, got {:?}", other),
        }
        assert_eq!(provider.submissions().len(), 1);
        assert_eq!(provider.poll_count(), 0);
    }

    #[tokio::test]
    async fn submit_encodes_payload_and_infers_mime_type() {
        let provider = Arc::new(MockExtractionProvider::new().with_job_id("llx-42"));
        let orchestrator = orchestrator(provider.clone());
        let schema = json!({"type": "object", "required": ["bill_no"]});

        let job = orchestrator
            .submit(b"hello", "Receipt.JPEG", &schema)
            .await
            .unwrap();

        assert_eq!(job.job_id(), "llx-42");
        assert_eq!(job.state(), JobState::Polling);
        assert_eq!(job.mime_type(), "image/jpeg");

        let submissions = provider.submissions();
        assert_eq!(submissions[0].file_base64, "aGVsbG8=");
        assert_eq!(submissions[0].mime_type, "image/jpeg");
        assert_eq!(submissions[0].file_name, "Receipt.JPEG");
        assert_eq!(submissions[0].schema, schema);
    }

    #[tokio::test(start_paused = true)]
    async fn independent_jobs_run_concurrently() {
        let provider = Arc::new(
            MockExtractionProvider::new()
                .then_pending(2)
                .then_ready(json!({"n": 1}))
                .then_ready(json!({"n": 2}))
                .then_ready(json!({"n": 3})),
        );
        let orchestrator = Arc::new(orchestrator(provider.clone()));

        let schema_a = json!({});
        let schema_b = json!({});
        let start = Instant::now();
        let (a, b) = tokio::join!(
            orchestrator.extract(b"a", "a.pdf", &schema_a),
            orchestrator.extract(b"b", "b.pdf", &schema_b),
        );

        assert!(a.is_ok());
        assert!(b.is_ok());
        // Both loops sleep concurrently, so together they finish well before
        // the sum of their individual waits.
        assert!(start.elapsed() < INTERVAL * 5);
    }

    #[test]
    fn terminal_states() {
        assert!(!JobState::Submitting.is_terminal());
        assert!(!JobState::Polling.is_terminal());
        assert!(JobState::Succeeded.is_terminal());
        assert!(JobState::Failed.is_terminal());
        assert!(JobState::TimedOut.is_terminal());
    }
}
