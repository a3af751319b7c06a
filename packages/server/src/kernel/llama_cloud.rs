//! LlamaCloud adapter for [`BaseExtractionProvider`].

use async_trait::async_trait;
use llama_cloud_client::{
    ExtractConfig, ExtractionRunRequest, FileData, JobStatus, LlamaCloudClient, LlamaCloudError,
};

use super::traits::{BaseExtractionProvider, ProviderError, ProviderJobStatus, SubmissionRequest};

impl From<LlamaCloudError> for ProviderError {
    fn from(e: LlamaCloudError) -> Self {
        ProviderError {
            transient: e.is_transient(),
            status: e.status(),
            message: e.to_string(),
        }
    }
}

/// Extraction provider backed by the LlamaCloud stateless extraction API.
pub struct LlamaCloudProvider {
    client: LlamaCloudClient,
    config: ExtractConfig,
}

impl LlamaCloudProvider {
    pub fn new(client: LlamaCloudClient) -> Self {
        Self {
            client,
            config: ExtractConfig::default(),
        }
    }

    pub fn with_config(mut self, config: ExtractConfig) -> Self {
        self.config = config;
        self
    }
}

#[async_trait]
impl BaseExtractionProvider for LlamaCloudProvider {
    async fn submit(&self, request: SubmissionRequest) -> Result<String, ProviderError> {
        let run = ExtractionRunRequest {
            data_schema: request.schema,
            config: self.config.clone(),
            file: FileData {
                data: request.file_base64,
                mime_type: request.mime_type,
            },
        };

        let job = self.client.run_extraction(&run).await?;
        Ok(job.id)
    }

    async fn poll(&self, job_id: &str) -> Result<ProviderJobStatus, ProviderError> {
        let job = self.client.get_job(job_id).await?;

        match job.status {
            JobStatus::Pending | JobStatus::Unknown => Ok(ProviderJobStatus::Pending),
            JobStatus::Success | JobStatus::PartialSuccess => {
                match self.client.get_job_result(job_id).await {
                    Ok(result) => Ok(ProviderJobStatus::Succeeded(unwrap_single_document(
                        result.data,
                    ))),
                    // Status can flip to SUCCESS before the result is readable
                    Err(LlamaCloudError::Api { status: 404, .. }) => Ok(ProviderJobStatus::Pending),
                    Err(e) => Err(e.into()),
                }
            }
            JobStatus::Error | JobStatus::Cancelled => Ok(ProviderJobStatus::Failed(
                job.error
                    .unwrap_or_else(|| format!("job ended with status {:?}", job.status)),
            )),
        }
    }

    fn name(&self) -> &str {
        "llama_cloud"
    }
}

/// PER_DOC runs can come back as a one-element array.
fn unwrap_single_document(data: serde_json::Value) -> serde_json::Value {
    match data {
        serde_json::Value::Array(mut items) if items.len() == 1 => items.remove(0),
        other => other,
    }
}
