//! Document mutations.
//!
//! Every successful mutation is announced to live subscribers after it is
//! durable. A mutation that fails, or a delete that removed nothing, is not
//! announced.
//!
//! The write and its announcement run as one detached task. Dropping the
//! caller (a client hanging up mid-request) cannot leave a committed change
//! unannounced.

use serde::Deserialize;
use std::future::Future;
use tracing::{info, warn};

use super::events::DocumentEvent;
use super::models::{Document, DocumentType};
use super::store::{StorageError, StoreResult};
use crate::common::DocumentId;
use crate::kernel::ServerDeps;

#[derive(Debug, Clone, Deserialize)]
pub struct CreateDocument {
    pub document_type: DocumentType,
    pub file_name: String,
    pub extracted_data: serde_json::Value,
}

/// Store a new document and broadcast an INSERT event carrying it.
pub async fn create_document(input: CreateDocument, deps: &ServerDeps) -> StoreResult<Document> {
    let deps = deps.clone();
    detached(async move {
        let document = Document::new(input.document_type, input.file_name, input.extracted_data);

        deps.document_store.insert(&document).await.map_err(|e| {
            warn!(file_name = %document.file_name, error = %e, "Failed to store document");
            e
        })?;

        info!(
            document_id = %document.id,
            document_type = %document.document_type,
            file_name = %document.file_name,
            "Document stored"
        );

        deps.notifier
            .broadcast_event(&DocumentEvent::inserted(document.clone()))
            .await;

        Ok(document)
    })
    .await
}

/// Delete a document. Returns `false` when nothing was stored under `id`.
pub async fn delete_document(id: DocumentId, deps: &ServerDeps) -> StoreResult<bool> {
    let deps = deps.clone();
    detached(async move {
        let deleted = deps.document_store.delete(id).await?;

        if deleted {
            info!(document_id = %id, "Document deleted");
            deps.notifier
                .broadcast_event(&DocumentEvent::deleted(id))
                .await;
        }

        Ok(deleted)
    })
    .await
}

/// Run `mutation` on its own task and wait for it. The task keeps running if
/// the returned future is dropped.
async fn detached<T, F>(mutation: F) -> StoreResult<T>
where
    T: Send + 'static,
    F: Future<Output = StoreResult<T>> + Send + 'static,
{
    match tokio::spawn(mutation).await {
        Ok(result) => result,
        Err(e) if e.is_panic() => std::panic::resume_unwind(e.into_panic()),
        Err(e) => Err(StorageError::Interrupted(e.to_string())),
    }
}
