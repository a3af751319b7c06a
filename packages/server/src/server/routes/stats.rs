use axum::{extract::Extension, Json};
use serde::Serialize;

use crate::domains::documents::DocumentType;
use crate::server::app::AxumAppState;
use crate::server::error::ApiError;

#[derive(Debug, Serialize)]
pub struct StatsResponse {
    pub total: u64,
    pub government_id: u64,
    pub invoice: u64,
}

/// GET /api/v1/stats
pub async fn stats_handler(
    Extension(state): Extension<AxumAppState>,
) -> Result<Json<StatsResponse>, ApiError> {
    let counts = state.server_deps.document_store.count_by_type().await?;

    Ok(Json(StatsResponse {
        total: counts.total,
        government_id: counts.get(DocumentType::GovernmentId),
        invoice: counts.get(DocumentType::Invoice),
    }))
}
