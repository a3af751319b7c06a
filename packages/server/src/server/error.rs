//! Mapping from domain failures to HTTP responses.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;
use tracing::{error, warn};

use crate::domains::documents::StorageError;
use crate::domains::extraction::ExtractDocumentError;
use crate::kernel::ExtractionError;

#[derive(Debug, Error)]
pub enum ApiError {
    #[error("{0}")]
    BadRequest(String),

    #[error("{0}")]
    NotFound(String),

    #[error(transparent)]
    Extraction(#[from] ExtractionError),

    #[error(transparent)]
    Storage(#[from] StorageError),
}

impl ApiError {
    pub fn document_not_found() -> Self {
        ApiError::NotFound("Document not found".to_string())
    }

    pub fn status_code(&self) -> StatusCode {
        match self {
            ApiError::BadRequest(_) => StatusCode::BAD_REQUEST,
            ApiError::NotFound(_) => StatusCode::NOT_FOUND,
            ApiError::Extraction(ExtractionError::Submission { .. }) => StatusCode::BAD_GATEWAY,
            ApiError::Extraction(ExtractionError::Failed { .. }) => {
                StatusCode::UNPROCESSABLE_ENTITY
            }
            ApiError::Extraction(ExtractionError::Timeout { .. }) => StatusCode::GATEWAY_TIMEOUT,
            ApiError::Storage(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl From<ExtractDocumentError> for ApiError {
    fn from(err: ExtractDocumentError) -> Self {
        match err {
            ExtractDocumentError::Extraction(e) => ApiError::Extraction(e),
            other => ApiError::BadRequest(other.to_string()),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status_code();

        // Storage details stay in the logs
        let detail = match &self {
            ApiError::Storage(e) => {
                error!(error = %e, "Storage failure");
                "Internal storage error".to_string()
            }
            ApiError::Extraction(e) => {
                warn!(error = %e, "Extraction failed");
                e.to_string()
            }
            other => other.to_string(),
        };

        (status, Json(json!({ "detail": detail }))).into_response()
    }
}
