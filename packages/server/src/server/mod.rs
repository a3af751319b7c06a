// HTTP server setup (Axum + WebSocket)
pub mod app;
pub mod error;
pub mod routes;

pub use app::*;
pub use error::ApiError;
