//! Test harnesses for integration testing.
//!
//! `TestHarness` drives the real router against an in-memory store and a
//! scripted extraction provider. `PostgresHarness` uses a shared
//! testcontainers Postgres; containers and migrations are initialized once on
//! first use, then reused.

#![allow(dead_code)]

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use axum::{
    body::Body,
    http::{header::CONTENT_TYPE, Method, Request, StatusCode},
    Router,
};
use docextract_core::domains::documents::{MemoryDocumentStore, PostgresDocumentStore};
use docextract_core::kernel::{
    ChannelConnection, ConnectionRegistry, ExtractionOrchestrator, MockExtractionProvider,
    ServerDeps,
};
use docextract_core::server::build_app;
use http_body_util::BodyExt;
use serde_json::Value;
use sqlx::PgPool;
use test_context::AsyncTestContext;
use testcontainers::runners::AsyncRunner;
use testcontainers::{ContainerAsync, ImageExt};
use testcontainers_modules::postgres::Postgres;
use tokio::sync::{mpsc, OnceCell};
use tower::ServiceExt;

pub const TEST_TIMEOUT: Duration = Duration::from_secs(10);
pub const TEST_POLL_INTERVAL: Duration = Duration::from_secs(1);

fn init_tracing() {
    // Run tests with: RUST_LOG=debug cargo test -- --nocapture
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

/// Status and parsed JSON body of one response.
#[derive(Debug)]
pub struct TestResponse {
    pub status: StatusCode,
    pub body: Value,
}

/// Router plus handles on every injected service.
pub struct TestHarness {
    pub app: Router,
    pub store: Arc<MemoryDocumentStore>,
    pub notifier: ConnectionRegistry,
    pub provider: Arc<MockExtractionProvider>,
}

impl TestHarness {
    pub fn new() -> Self {
        Self::with_provider(MockExtractionProvider::new())
    }

    pub fn with_provider(provider: MockExtractionProvider) -> Self {
        init_tracing();

        let store = Arc::new(MemoryDocumentStore::new());
        let notifier = ConnectionRegistry::new();
        let provider = Arc::new(provider);
        let orchestrator = ExtractionOrchestrator::new(provider.clone())
            .with_timeout(TEST_TIMEOUT)
            .with_poll_interval(TEST_POLL_INTERVAL);

        let deps = ServerDeps::new(store.clone(), notifier.clone(), Arc::new(orchestrator));
        let app = build_app(deps, &[]);

        Self {
            app,
            store,
            notifier,
            provider,
        }
    }

    pub async fn request(&self, method: Method, uri: &str, body: Option<Value>) -> TestResponse {
        let mut builder = Request::builder().method(method).uri(uri);
        let body = match body {
            Some(json) => {
                builder = builder.header(CONTENT_TYPE, "application/json");
                Body::from(json.to_string())
            }
            None => Body::empty(),
        };

        let response = self
            .app
            .clone()
            .oneshot(builder.body(body).expect("valid request"))
            .await
            .expect("router is infallible");

        let status = response.status();
        let bytes = response
            .into_body()
            .collect()
            .await
            .expect("readable body")
            .to_bytes();
        let body = serde_json::from_slice(&bytes).unwrap_or(Value::Null);

        TestResponse { status, body }
    }

    pub async fn get(&self, uri: &str) -> TestResponse {
        self.request(Method::GET, uri, None).await
    }

    pub async fn post(&self, uri: &str, body: Value) -> TestResponse {
        self.request(Method::POST, uri, Some(body)).await
    }

    pub async fn delete(&self, uri: &str) -> TestResponse {
        self.request(Method::DELETE, uri, None).await
    }

    /// Register an in-process subscriber and return its inbox.
    pub async fn subscribe(&self) -> mpsc::UnboundedReceiver<String> {
        let (connection, rx) = ChannelConnection::new();
        self.notifier.register(Arc::new(connection)).await;
        rx
    }

    /// Serve the router on an ephemeral local port.
    pub async fn serve(&self) -> SocketAddr {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
            .await
            .expect("bind ephemeral port");
        let addr = listener.local_addr().expect("local addr");
        let app = self.app.clone();
        tokio::spawn(async move {
            let _ = axum::serve(listener, app).await;
        });
        addr
    }
}

impl Default for TestHarness {
    fn default() -> Self {
        Self::new()
    }
}

/// Shared Postgres container that persists across all tests.
struct SharedTestInfra {
    db_url: String,
    // Keep the container alive for the entire test run
    _postgres: ContainerAsync<Postgres>,
}

static SHARED_INFRA: OnceCell<SharedTestInfra> = OnceCell::const_new();

impl SharedTestInfra {
    async fn init() -> Result<Self> {
        init_tracing();

        let postgres = Postgres::default()
            .with_tag("16")
            .start()
            .await
            .context("Failed to start Postgres container")?;

        let pg_host = postgres.get_host().await?;
        let pg_port = postgres.get_host_port_ipv4(5432).await?;
        let db_url = format!(
            "postgresql://postgres:postgres@{}:{}/postgres",
            pg_host, pg_port
        );

        // Run migrations once on the shared database
        let pool = PgPool::connect(&db_url)
            .await
            .context("Failed to connect to Postgres for migrations")?;

        sqlx::migrate!("./migrations")
            .run(&pool)
            .await
            .context("Failed to run migrations")?;

        Ok(Self {
            db_url,
            _postgres: postgres,
        })
    }

    async fn get() -> &'static Self {
        SHARED_INFRA
            .get_or_init(|| async {
                Self::init()
                    .await
                    .expect("Failed to initialize shared test infrastructure")
            })
            .await
    }
}

/// Postgres-backed store on the shared container.
///
/// Tests share one database, so assertions should be scoped to the
/// documents a test created itself.
pub struct PostgresHarness {
    pub db_pool: PgPool,
    pub store: PostgresDocumentStore,
}

impl AsyncTestContext for PostgresHarness {
    async fn setup() -> Self {
        Self::new()
            .await
            .expect("Failed to create Postgres harness")
    }

    async fn teardown(self) {
        self.db_pool.close().await;
    }
}

impl PostgresHarness {
    pub async fn new() -> Result<Self> {
        let infra = SharedTestInfra::get().await;

        let db_pool = PgPool::connect(&infra.db_url)
            .await
            .context("Failed to connect to test database")?;

        Ok(Self {
            store: PostgresDocumentStore::new(db_pool.clone()),
            db_pool,
        })
    }
}
