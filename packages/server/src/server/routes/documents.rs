//! Document CRUD endpoints.

use axum::{
    extract::{Extension, Path, Query},
    http::StatusCode,
    Json,
};
use serde::{Deserialize, Serialize};

use crate::common::DocumentId;
use crate::domains::documents::{
    self, store::DEFAULT_LIST_LIMIT, CreateDocument, Document, DocumentType, ListQuery,
};
use crate::server::app::AxumAppState;
use crate::server::error::ApiError;

#[derive(Debug, Deserialize)]
pub struct ListDocumentsParams {
    document_type: Option<String>,
    limit: Option<i64>,
    offset: Option<i64>,
}

impl ListDocumentsParams {
    fn into_query(self) -> Result<ListQuery, ApiError> {
        let document_type = self
            .document_type
            .filter(|t| !t.is_empty())
            .map(|t| t.parse::<DocumentType>())
            .transpose()
            .map_err(|e| ApiError::BadRequest(e.to_string()))?;

        Ok(ListQuery {
            document_type,
            limit: non_negative("limit", self.limit.unwrap_or(i64::from(DEFAULT_LIST_LIMIT)))?,
            offset: non_negative("offset", self.offset.unwrap_or(0))?,
        })
    }
}

fn non_negative(name: &str, value: i64) -> Result<u32, ApiError> {
    u32::try_from(value)
        .map_err(|_| ApiError::BadRequest(format!("{name} must be between 0 and {}", u32::MAX)))
}

#[derive(Debug, Serialize)]
pub struct DocumentListResponse {
    pub documents: Vec<Document>,
    pub total: u64,
}

#[derive(Debug, Serialize)]
pub struct DeleteResponse {
    pub success: bool,
    pub message: String,
}

/// Ids that are not UUIDs cannot name a stored document.
fn parse_id(raw: &str) -> Result<DocumentId, ApiError> {
    DocumentId::parse(raw).map_err(|_| ApiError::document_not_found())
}

/// POST /api/v1/documents
pub async fn create_document_handler(
    Extension(state): Extension<AxumAppState>,
    Json(input): Json<CreateDocument>,
) -> Result<(StatusCode, Json<Document>), ApiError> {
    let document = documents::create_document(input, &state.server_deps).await?;
    Ok((StatusCode::CREATED, Json(document)))
}

/// GET /api/v1/documents
pub async fn list_documents_handler(
    Extension(state): Extension<AxumAppState>,
    Query(params): Query<ListDocumentsParams>,
) -> Result<Json<DocumentListResponse>, ApiError> {
    let query = params.into_query()?;
    let page = state.server_deps.document_store.list(&query).await?;

    Ok(Json(DocumentListResponse {
        documents: page.items,
        total: page.total,
    }))
}

/// GET /api/v1/documents/:id
pub async fn get_document_handler(
    Extension(state): Extension<AxumAppState>,
    Path(id): Path<String>,
) -> Result<Json<Document>, ApiError> {
    let id = parse_id(&id)?;
    state
        .server_deps
        .document_store
        .get(id)
        .await?
        .map(Json)
        .ok_or_else(ApiError::document_not_found)
}

/// DELETE /api/v1/documents/:id
pub async fn delete_document_handler(
    Extension(state): Extension<AxumAppState>,
    Path(id): Path<String>,
) -> Result<Json<DeleteResponse>, ApiError> {
    let id = parse_id(&id)?;
    if !documents::delete_document(id, &state.server_deps).await? {
        return Err(ApiError::document_not_found());
    }

    Ok(Json(DeleteResponse {
        success: true,
        message: "Document deleted successfully".to_string(),
    }))
}
