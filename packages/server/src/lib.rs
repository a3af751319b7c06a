// Document Extraction Service - Core
//
// Uploaded documents are sent to an external extraction provider, the
// structured results are stored, and every change to the store is pushed to
// live WebSocket subscribers.

pub mod common;
pub mod config;
pub mod domains;
pub mod kernel;
pub mod server;

pub use config::*;
