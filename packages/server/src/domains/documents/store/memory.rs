use async_trait::async_trait;
use std::collections::HashMap;
use tokio::sync::RwLock;

use super::{DocumentPage, DocumentStore, ListQuery, StorageError, StoreResult, TypeCounts};
use crate::common::DocumentId;
use crate::domains::documents::models::Document;

/// Process-local store backed by a map.
#[derive(Default)]
pub struct MemoryDocumentStore {
    documents: RwLock<HashMap<DocumentId, Document>>,
}

impl MemoryDocumentStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn len(&self) -> usize {
        self.documents.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.documents.read().await.is_empty()
    }
}

#[async_trait]
impl DocumentStore for MemoryDocumentStore {
    async fn insert(&self, document: &Document) -> StoreResult<DocumentId> {
        let mut documents = self.documents.write().await;
        if documents.contains_key(&document.id) {
            return Err(StorageError::Duplicate(document.id));
        }
        documents.insert(document.id, document.clone());
        Ok(document.id)
    }

    async fn get(&self, id: DocumentId) -> StoreResult<Option<Document>> {
        Ok(self.documents.read().await.get(&id).cloned())
    }

    async fn list(&self, query: &ListQuery) -> StoreResult<DocumentPage> {
        let documents = self.documents.read().await;
        let mut matching: Vec<&Document> = documents
            .values()
            .filter(|d| query.document_type.map_or(true, |t| d.document_type == t))
            .collect();
        matching.sort_by(|a, b| b.created_at.cmp(&a.created_at).then(b.id.cmp(&a.id)));

        let total = matching.len() as u64;
        let items = matching
            .into_iter()
            .skip(query.offset as usize)
            .take(query.limit as usize)
            .cloned()
            .collect();

        Ok(DocumentPage { items, total })
    }

    async fn delete(&self, id: DocumentId) -> StoreResult<bool> {
        Ok(self.documents.write().await.remove(&id).is_some())
    }

    async fn count_by_type(&self) -> StoreResult<TypeCounts> {
        let documents = self.documents.read().await;
        Ok(TypeCounts::from_counts(
            documents.values().map(|d| (d.document_type, 1)),
        ))
    }
}
