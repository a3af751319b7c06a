//! Typed ID definitions for domain entities.

pub use super::id::Id;

/// Marker type for extracted documents.
pub struct ExtractedDocument;

/// Typed ID for extracted documents.
pub type DocumentId = Id<ExtractedDocument>;
