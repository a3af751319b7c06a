//! Kernel module - server infrastructure and injected services.

pub mod connection_registry;
pub mod deps;
pub mod extraction_orchestrator;
pub mod llama_cloud;
pub mod mime;
pub mod test_dependencies;
pub mod traits;

pub use connection_registry::{
    BroadcastReport, ChannelConnection, Connection, ConnectionId, ConnectionRegistry,
    DeliveryError,
};
pub use deps::ServerDeps;
pub use extraction_orchestrator::{ExtractionError, ExtractionJob, ExtractionOrchestrator, JobState};
pub use llama_cloud::LlamaCloudProvider;
pub use mime::infer_mime_type;
pub use test_dependencies::{MockExtractionProvider, RecordingConnection};
pub use traits::*;
