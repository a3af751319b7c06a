//! Application setup and server configuration.

use std::sync::Arc;

use axum::{
    extract::Extension,
    http::{header::CONTENT_TYPE, HeaderValue, Method},
    routing::get,
    Router,
};
use tower_http::cors::{AllowOrigin, Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing::warn;

use crate::kernel::ServerDeps;
use crate::server::routes::{
    create_document_handler, delete_document_handler, extract_handler, get_document_handler,
    health_handler, list_documents_handler, root_handler, stats_handler, ws_documents_handler,
};

/// Shared application state
#[derive(Clone)]
pub struct AxumAppState {
    pub server_deps: Arc<ServerDeps>,
}

/// CORS for the configured origins. An empty list allows any origin.
fn cors_layer(allowed_origins: &[String]) -> CorsLayer {
    let origins: Vec<HeaderValue> = allowed_origins
        .iter()
        .filter_map(|origin| match origin.parse::<HeaderValue>() {
            Ok(value) => Some(value),
            Err(_) => {
                warn!(origin = %origin, "Ignoring invalid CORS origin");
                None
            }
        })
        .collect();

    let allow_origin = if allowed_origins.is_empty() {
        AllowOrigin::from(Any)
    } else {
        AllowOrigin::list(origins)
    };

    CorsLayer::new()
        .allow_origin(allow_origin)
        .allow_methods([Method::GET, Method::POST, Method::DELETE])
        .allow_headers([CONTENT_TYPE])
}

/// Build the Axum application router
pub fn build_app(server_deps: ServerDeps, allowed_origins: &[String]) -> Router {
    let app_state = AxumAppState {
        server_deps: Arc::new(server_deps),
    };

    let api = Router::new()
        .route("/extract", axum::routing::post(extract_handler))
        .route(
            "/documents",
            get(list_documents_handler).post(create_document_handler),
        )
        .route("/documents/ws", get(ws_documents_handler))
        .route(
            "/documents/:id",
            get(get_document_handler).delete(delete_document_handler),
        )
        .route("/stats", get(stats_handler));

    Router::new()
        .route("/", get(root_handler))
        .route("/health", get(health_handler))
        .route("/ws/documents", get(ws_documents_handler))
        .nest("/api/v1", api)
        // Middleware layers (applied in reverse order - last added runs first)
        .layer(Extension(app_state))
        .layer(cors_layer(allowed_origins))
        .layer(TraceLayer::new_for_http())
}
