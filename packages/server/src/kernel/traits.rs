// Trait definitions for dependency injection
//
// Infrastructure traits only. Orchestration policy (polling cadence,
// deadlines, error classification) lives in the kernel services that
// consume these traits.

use async_trait::async_trait;
use thiserror::Error;

// =============================================================================
// Extraction Provider Trait (Infrastructure - asynchronous document extraction)
// =============================================================================

/// Everything the provider needs to start one extraction job.
#[derive(Debug, Clone)]
pub struct SubmissionRequest {
    /// File content in base64 transport encoding
    pub file_base64: String,
    pub file_name: String,
    pub mime_type: String,
    /// JSON schema the extracted data must follow
    pub schema: serde_json::Value,
}

/// Status of a provider job as seen by a single status query.
#[derive(Debug, Clone, PartialEq)]
pub enum ProviderJobStatus {
    /// No result yet
    Pending,
    /// Terminal success with the extracted data
    Succeeded(serde_json::Value),
    /// Terminal failure with the provider's error detail
    Failed(String),
}

/// A provider call that did not produce a status.
#[derive(Debug, Clone, Error)]
#[error("{message}")]
pub struct ProviderError {
    pub message: String,
    /// Network failure or 5xx: the same call may succeed later
    pub transient: bool,
    pub status: Option<u16>,
}

impl ProviderError {
    pub fn transient(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            transient: true,
            status: None,
        }
    }

    pub fn rejected(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            transient: false,
            status: None,
        }
    }

    pub fn with_status(mut self, status: u16) -> Self {
        self.status = Some(status);
        self
    }
}

#[async_trait]
pub trait BaseExtractionProvider: Send + Sync {
    /// Start a job. Returns the provider-issued job id.
    async fn submit(&self, request: SubmissionRequest) -> Result<String, ProviderError>;

    /// Query a job's status once.
    async fn poll(&self, job_id: &str) -> Result<ProviderJobStatus, ProviderError>;

    /// Provider name for logs
    fn name(&self) -> &str;
}
