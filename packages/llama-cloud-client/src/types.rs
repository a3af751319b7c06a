use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Body of `POST /extraction/run`.
#[derive(Debug, Clone, Serialize)]
pub struct ExtractionRunRequest {
    pub data_schema: serde_json::Value,
    pub config: ExtractConfig,
    pub file: FileData,
}

/// Extraction tuning knobs understood by the stateless run endpoint.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ExtractConfig {
    pub extraction_target: String,
    pub extraction_mode: String,
    pub chunk_mode: String,
}

impl Default for ExtractConfig {
    fn default() -> Self {
        Self {
            extraction_target: "PER_DOC".to_string(),
            extraction_mode: "BALANCED".to_string(),
            chunk_mode: "PAGE".to_string(),
        }
    }
}

/// Inline file payload, base64 encoded.
#[derive(Debug, Clone, Serialize)]
pub struct FileData {
    pub data: String,
    pub mime_type: String,
}

/// Lifecycle status reported for an extraction job.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum JobStatus {
    Pending,
    Success,
    PartialSuccess,
    Error,
    Cancelled,
    #[serde(other)]
    Unknown,
}

/// Extraction job metadata, returned by both submit and status calls.
#[derive(Debug, Clone, Deserialize)]
pub struct ExtractionJob {
    pub id: String,
    pub status: JobStatus,
    #[serde(default)]
    pub error: Option<String>,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
}

/// Result payload of a finished job (`GET /extraction/jobs/{id}/result`).
#[derive(Debug, Clone, Deserialize)]
pub struct JobResult {
    pub data: serde_json::Value,
    #[serde(default)]
    pub extraction_metadata: Option<serde_json::Value>,
}
