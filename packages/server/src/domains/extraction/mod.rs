//! Document extraction: request validation and schema selection in front of
//! the orchestrator.

pub mod actions;
pub mod schemas;

pub use actions::{extract_document, ExtractDocumentError, ExtractionRequest, ExtractionResult};
pub use schemas::schema_for;
