//! Extracted documents: persistence and change notifications.

pub mod actions;
pub mod events;
pub mod models;
pub mod store;

pub use actions::{create_document, delete_document, CreateDocument};
pub use events::{DocumentEvent, EventData, EventKind};
pub use models::{Document, DocumentType, UnknownDocumentType};
pub use store::{
    DocumentPage, DocumentStore, ListQuery, MemoryDocumentStore, PostgresDocumentStore,
    StorageError, TypeCounts,
};
