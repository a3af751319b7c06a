use axum::{extract::Extension, Json};

use crate::domains::extraction::{extract_document, ExtractionRequest, ExtractionResult};
use crate::server::app::AxumAppState;
use crate::server::error::ApiError;

/// POST /api/v1/extract
///
/// Blocks until the provider finishes, fails, or the wait budget runs out.
/// The result is returned, not stored.
pub async fn extract_handler(
    Extension(state): Extension<AxumAppState>,
    Json(request): Json<ExtractionRequest>,
) -> Result<Json<ExtractionResult>, ApiError> {
    let result = extract_document(request, &state.server_deps).await?;
    Ok(Json(result))
}
