//! Server dependencies (using traits for testability)
//!
//! Central container handed to domain actions and the HTTP layer. Built once
//! at process start; every field is shared, so cloning is cheap.

use std::sync::Arc;

use crate::domains::documents::store::DocumentStore;
use crate::kernel::{ConnectionRegistry, ExtractionOrchestrator};

#[derive(Clone)]
pub struct ServerDeps {
    pub document_store: Arc<dyn DocumentStore>,
    /// Live WebSocket subscribers for document change events
    pub notifier: ConnectionRegistry,
    pub orchestrator: Arc<ExtractionOrchestrator>,
}

impl ServerDeps {
    pub fn new(
        document_store: Arc<dyn DocumentStore>,
        notifier: ConnectionRegistry,
        orchestrator: Arc<ExtractionOrchestrator>,
    ) -> Self {
        Self {
            document_store,
            notifier,
            orchestrator,
        }
    }
}
