//! Document persistence.
//!
//! [`DocumentStore`] is the seam between domain actions and the database.
//! Production uses [`PostgresDocumentStore`]; tests and local runs without a
//! database use [`MemoryDocumentStore`].

mod memory;
mod postgres;

pub use memory::MemoryDocumentStore;
pub use postgres::PostgresDocumentStore;

use async_trait::async_trait;
use std::collections::BTreeMap;
use thiserror::Error;

use super::models::{Document, DocumentType};
use crate::common::DocumentId;

pub const DEFAULT_LIST_LIMIT: u32 = 100;

#[derive(Debug, Error)]
pub enum StorageError {
    #[error("document {0} already exists")]
    Duplicate(DocumentId),

    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("stored document {id} is unreadable: {reason}")]
    Corrupt { id: DocumentId, reason: String },

    /// The runtime shut down before the mutation finished.
    #[error("document mutation interrupted: {0}")]
    Interrupted(String),
}

pub type StoreResult<T> = Result<T, StorageError>;

/// Filter and page window for [`DocumentStore::list`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ListQuery {
    pub document_type: Option<DocumentType>,
    pub limit: u32,
    pub offset: u32,
}

impl Default for ListQuery {
    fn default() -> Self {
        Self {
            document_type: None,
            limit: DEFAULT_LIST_LIMIT,
            offset: 0,
        }
    }
}

impl ListQuery {
    pub fn of_type(document_type: DocumentType) -> Self {
        Self {
            document_type: Some(document_type),
            ..Self::default()
        }
    }
}

/// One page of a listing. `total` counts every match, ignoring the window.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DocumentPage {
    pub items: Vec<Document>,
    pub total: u64,
}

/// Per-type document counts. Every known type is present, zero or not.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TypeCounts {
    pub by_type: BTreeMap<DocumentType, u64>,
    pub total: u64,
}

impl TypeCounts {
    pub fn from_counts(counts: impl IntoIterator<Item = (DocumentType, u64)>) -> Self {
        let mut by_type: BTreeMap<DocumentType, u64> =
            DocumentType::ALL.iter().map(|t| (*t, 0)).collect();
        for (document_type, count) in counts {
            *by_type.entry(document_type).or_default() += count;
        }
        let total = by_type.values().sum();
        Self { by_type, total }
    }

    pub fn get(&self, document_type: DocumentType) -> u64 {
        self.by_type.get(&document_type).copied().unwrap_or(0)
    }
}

#[async_trait]
pub trait DocumentStore: Send + Sync {
    /// Persist a new document. Fails with [`StorageError::Duplicate`] if the
    /// id is taken.
    async fn insert(&self, document: &Document) -> StoreResult<DocumentId>;

    async fn get(&self, id: DocumentId) -> StoreResult<Option<Document>>;

    /// Newest first, optionally filtered by type.
    async fn list(&self, query: &ListQuery) -> StoreResult<DocumentPage>;

    /// Returns `false` if nothing was stored under `id`.
    async fn delete(&self, id: DocumentId) -> StoreResult<bool>;

    async fn count_by_type(&self) -> StoreResult<TypeCounts>;

    /// Cheap connectivity check for health probes.
    async fn ping(&self) -> StoreResult<()> {
        Ok(())
    }
}
