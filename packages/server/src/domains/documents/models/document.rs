use chrono::{DateTime, SubsecRound, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

use crate::common::DocumentId;

/// Kinds of document the service knows how to extract.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DocumentType {
    GovernmentId,
    Invoice,
}

impl DocumentType {
    pub const ALL: [DocumentType; 2] = [DocumentType::GovernmentId, DocumentType::Invoice];

    pub fn as_str(&self) -> &'static str {
        match self {
            DocumentType::GovernmentId => "government_id",
            DocumentType::Invoice => "invoice",
        }
    }
}

impl fmt::Display for DocumentType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Error)]
#[error("invalid document type: {0}. Must be 'government_id' or 'invoice'")]
pub struct UnknownDocumentType(pub String);

impl FromStr for DocumentType {
    type Err = UnknownDocumentType;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "government_id" => Ok(DocumentType::GovernmentId),
            "invoice" => Ok(DocumentType::Invoice),
            other => Err(UnknownDocumentType(other.to_string())),
        }
    }
}

/// A stored extraction result.
///
/// `extracted_data` is opaque here; its shape is governed by the schema of
/// `document_type`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Document {
    pub id: DocumentId,
    pub document_type: DocumentType,
    pub file_name: String,
    pub extracted_data: serde_json::Value,
    pub created_at: DateTime<Utc>,
}

impl Document {
    /// New document with a fresh identity and creation time.
    ///
    /// The timestamp is truncated to microseconds so it survives a round trip
    /// through Postgres unchanged.
    pub fn new(
        document_type: DocumentType,
        file_name: impl Into<String>,
        extracted_data: serde_json::Value,
    ) -> Self {
        Self {
            id: DocumentId::new(),
            document_type,
            file_name: file_name.into(),
            extracted_data,
            created_at: Utc::now().trunc_subsecs(6),
        }
    }
}
