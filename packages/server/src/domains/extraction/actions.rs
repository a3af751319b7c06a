use base64::Engine;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::info;

use super::schemas::schema_for;
use crate::domains::documents::{DocumentType, UnknownDocumentType};
use crate::kernel::{ExtractionError, ServerDeps};

/// Upload to extract. `file_data` is standard base64.
#[derive(Debug, Clone, Deserialize)]
pub struct ExtractionRequest {
    pub file_data: String,
    pub file_name: String,
    pub document_type: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct ExtractionResult {
    pub extracted_data: serde_json::Value,
    pub file_name: String,
}

#[derive(Debug, Error)]
pub enum ExtractDocumentError {
    #[error(transparent)]
    InvalidDocumentType(#[from] UnknownDocumentType),

    #[error("invalid base64 file data: {0}")]
    InvalidFileData(#[from] base64::DecodeError),

    #[error("file data is empty")]
    EmptyFile,

    #[error(transparent)]
    Extraction(#[from] ExtractionError),
}

/// Validate the request, pick the schema for its document type and run the
/// extraction to completion. Nothing is stored.
pub async fn extract_document(
    request: ExtractionRequest,
    deps: &ServerDeps,
) -> Result<ExtractionResult, ExtractDocumentError> {
    let document_type: DocumentType = request.document_type.parse()?;
    let file_bytes = base64::engine::general_purpose::STANDARD.decode(request.file_data.trim())?;
    if file_bytes.is_empty() {
        return Err(ExtractDocumentError::EmptyFile);
    }

    info!(
        file_name = %request.file_name,
        document_type = %document_type,
        size = file_bytes.len(),
        "Extracting document"
    );

    let schema = schema_for(document_type);
    let extracted_data = deps
        .orchestrator
        .extract(&file_bytes, &request.file_name, &schema)
        .await?;

    Ok(ExtractionResult {
        extracted_data,
        file_name: request.file_name,
    })
}
