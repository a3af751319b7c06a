// Main entry point for API server

use std::sync::Arc;

use anyhow::{Context, Result};
use docextract_core::domains::documents::PostgresDocumentStore;
use docextract_core::kernel::{
    ConnectionRegistry, ExtractionOrchestrator, LlamaCloudProvider, ServerDeps,
};
use docextract_core::{server::build_app, Config};
use llama_cloud_client::LlamaCloudClient;
use sqlx::postgres::PgPoolOptions;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize logging
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info,docextract_core=debug,sqlx=warn".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    tracing::info!("Starting Document Extraction API");

    // Load configuration
    let config = Config::from_env().context("Failed to load configuration")?;
    tracing::info!("Configuration loaded");

    // Connect to database
    tracing::info!("Connecting to database...");
    let pool = PgPoolOptions::new()
        .max_connections(config.db_max_connections)
        .connect(&config.database_url)
        .await
        .context("Failed to connect to database")?;
    tracing::info!("Database connected");

    // Run migrations
    tracing::info!("Running database migrations...");
    sqlx::migrate!("./migrations")
        .run(&pool)
        .await
        .context("Failed to run migrations")?;
    tracing::info!("Migrations complete");

    // Build services
    let llama_cloud = LlamaCloudClient::with_base_url(
        config.llama_cloud_api_key.clone(),
        config.llama_cloud_base_url.clone(),
    );
    let orchestrator = ExtractionOrchestrator::new(Arc::new(LlamaCloudProvider::new(llama_cloud)))
        .with_timeout(config.extraction_timeout)
        .with_poll_interval(config.extraction_poll_interval);
    let notifier = ConnectionRegistry::with_send_timeout(config.ws_send_timeout);

    let server_deps = ServerDeps::new(
        Arc::new(PostgresDocumentStore::new(pool.clone())),
        notifier.clone(),
        Arc::new(orchestrator),
    );

    let app = build_app(server_deps, &config.allowed_origins);

    // Start server
    let addr = config.bind_address();
    tracing::info!("Starting server on {}", addr);
    tracing::info!("Health check: http://localhost:{}/health", config.port);
    tracing::info!("WebSocket: ws://localhost:{}/ws/documents", config.port);

    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .context("Failed to bind to address")?;

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("Server error")?;

    tracing::info!("Shutting down");
    notifier.close_all().await;
    pool.close().await;

    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "Failed to listen for shutdown signal");
        std::future::pending::<()>().await;
    }
}
