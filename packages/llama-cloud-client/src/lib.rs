//! Pure LlamaCloud extraction REST API client.
//!
//! Covers the three calls needed to run a schema-driven extraction over an
//! inline file: start a run, read job status, fetch the job result. Polling
//! policy (cadence, deadlines, retry classification) belongs to the caller.
//!
//! # Example
//!
//! ```rust,ignore
//! use llama_cloud_client::{ExtractConfig, ExtractionRunRequest, FileData, LlamaCloudClient};
//!
//! let client = LlamaCloudClient::new("llx-...".into());
//! let job = client
//!     .run_extraction(&ExtractionRunRequest {
//!         data_schema: schema,
//!         config: ExtractConfig::default(),
//!         file: FileData { data: base64, mime_type: "application/pdf".into() },
//!     })
//!     .await?;
//! let status = client.get_job(&job.id).await?;
//! ```

pub mod error;
pub mod types;

pub use error::{LlamaCloudError, Result};
pub use types::{ExtractConfig, ExtractionJob, ExtractionRunRequest, FileData, JobResult, JobStatus};

use serde::de::DeserializeOwned;

pub const DEFAULT_BASE_URL: &str = "https://api.cloud.llamaindex.ai/api/v1";

pub struct LlamaCloudClient {
    client: reqwest::Client,
    api_key: String,
    base_url: String,
}

impl LlamaCloudClient {
    pub fn new(api_key: String) -> Self {
        Self::with_base_url(api_key, DEFAULT_BASE_URL)
    }

    /// Point the client at a different API root (self-hosted or regional).
    pub fn with_base_url(api_key: String, base_url: impl Into<String>) -> Self {
        let client = reqwest::Client::builder()
            .timeout(std::time::Duration::from_secs(60))
            .build()
            .unwrap_or_default();

        Self {
            client,
            api_key,
            base_url: base_url.into().trim_end_matches('/').to_string(),
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Start a stateless extraction run. Returns immediately with job metadata.
    pub async fn run_extraction(&self, request: &ExtractionRunRequest) -> Result<ExtractionJob> {
        let url = format!("{}/extraction/run", self.base_url);
        let resp = self
            .client
            .post(&url)
            .bearer_auth(&self.api_key)
            .json(request)
            .send()
            .await?;

        let job: ExtractionJob = Self::decode(resp).await?;
        tracing::debug!(job_id = %job.id, status = ?job.status, "Extraction run accepted");
        Ok(job)
    }

    /// Read the current status of an extraction job.
    pub async fn get_job(&self, job_id: &str) -> Result<ExtractionJob> {
        let url = format!("{}/extraction/jobs/{}", self.base_url, job_id);
        let resp = self
            .client
            .get(&url)
            .bearer_auth(&self.api_key)
            .send()
            .await?;

        Self::decode(resp).await
    }

    /// Fetch the extracted data of a finished job.
    pub async fn get_job_result(&self, job_id: &str) -> Result<JobResult> {
        let url = format!("{}/extraction/jobs/{}/result", self.base_url, job_id);
        let resp = self
            .client
            .get(&url)
            .bearer_auth(&self.api_key)
            .send()
            .await?;

        Self::decode(resp).await
    }

    async fn decode<T: DeserializeOwned>(resp: reqwest::Response) -> Result<T> {
        let status = resp.status();
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            return Err(LlamaCloudError::Api {
                status: status.as_u16(),
                message: body,
            });
        }

        Ok(resp.json().await?)
    }
}
