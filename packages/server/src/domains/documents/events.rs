//! Change notifications pushed to WebSocket subscribers.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::models::Document;
use crate::common::DocumentId;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum EventKind {
    Insert,
    Delete,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum EventData {
    Document(Document),
    Deleted { id: DocumentId },
}

/// `{"type": "INSERT" | "DELETE", "timestamp": ..., "data": ...}`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DocumentEvent {
    #[serde(rename = "type")]
    pub kind: EventKind,
    pub timestamp: DateTime<Utc>,
    pub data: EventData,
}

impl DocumentEvent {
    /// Carries the full stored record.
    pub fn inserted(document: Document) -> Self {
        Self {
            kind: EventKind::Insert,
            timestamp: Utc::now(),
            data: EventData::Document(document),
        }
    }

    /// Carries only the id of the removed record.
    pub fn deleted(id: DocumentId) -> Self {
        Self {
            kind: EventKind::Delete,
            timestamp: Utc::now(),
            data: EventData::Deleted { id },
        }
    }
}
