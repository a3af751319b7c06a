use thiserror::Error;

/// Errors returned by the LlamaCloud REST API client.
#[derive(Debug, Error)]
pub enum LlamaCloudError {
    /// Transport failure or an undecodable response body.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// The API answered with a non-success status.
    #[error("LlamaCloud API error ({status}): {message}")]
    Api { status: u16, message: String },
}

impl LlamaCloudError {
    /// Whether retrying the same request later could succeed.
    ///
    /// Network failures, 5xx responses and 429 rate limiting are transient.
    /// Other 4xx responses (bad credentials, malformed payloads, unknown job)
    /// and body decode failures are not.
    pub fn is_transient(&self) -> bool {
        match self {
            LlamaCloudError::Http(e) => !e.is_decode() && !e.is_builder(),
            LlamaCloudError::Api { status, .. } => *status >= 500 || *status == 429,
        }
    }

    /// HTTP status of an API error, if any.
    pub fn status(&self) -> Option<u16> {
        match self {
            LlamaCloudError::Http(e) => e.status().map(|s| s.as_u16()),
            LlamaCloudError::Api { status, .. } => Some(*status),
        }
    }
}

pub type Result<T> = std::result::Result<T, LlamaCloudError>;
