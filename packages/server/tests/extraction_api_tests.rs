//! Integration tests for POST /api/v1/extract.
//!
//! The provider is scripted and the clock is paused, so waits of several
//! poll intervals complete instantly.

mod common;

use crate::common::{extract_body, TestHarness, TEST_POLL_INTERVAL, TEST_TIMEOUT};
use axum::http::StatusCode;
use docextract_core::domains::extraction::schema_for;
use docextract_core::domains::documents::DocumentType;
use docextract_core::kernel::MockExtractionProvider;
use serde_json::json;
use tokio::time::Instant;

#[tokio::test(start_paused = true)]
async fn returns_extracted_data_once_the_job_is_ready() {
    let ctx = TestHarness::with_provider(
        MockExtractionProvider::new()
            .then_pending(3)
            .then_ready(json!({ "full_name": "Jane Doe" })),
    );
    let started = Instant::now();

    let res = ctx
        .post(
            "/api/v1/extract",
            extract_body("government_id", "id.JPG", b"jpeg bytes"),
        )
        .await;

    assert_eq!(res.status, StatusCode::OK);
    assert_eq!(
        res.body,
        json!({ "extracted_data": { "full_name": "Jane Doe" }, "file_name": "id.JPG" })
    );
    assert!(started.elapsed() >= TEST_POLL_INTERVAL * 3);
    assert_eq!(ctx.provider.poll_count(), 4);

    let submissions = ctx.provider.submissions();
    assert_eq!(submissions[0].mime_type, "image/jpeg");
    assert_eq!(submissions[0].schema, schema_for(DocumentType::GovernmentId));
}

#[tokio::test(start_paused = true)]
async fn extraction_results_are_not_stored_or_broadcast() {
    let ctx = TestHarness::with_provider(MockExtractionProvider::new().then_ready(json!({})));
    let mut events = ctx.subscribe().await;

    let res = ctx
        .post("/api/v1/extract", extract_body("invoice", "a.pdf", b"%PDF"))
        .await;

    assert_eq!(res.status, StatusCode::OK);
    assert!(ctx.store.is_empty().await);
    assert!(events.try_recv().is_err());
}

#[tokio::test]
async fn unknown_document_type_is_a_bad_request() {
    let ctx = TestHarness::new();

    let res = ctx
        .post("/api/v1/extract", extract_body("passport", "p.pdf", b"data"))
        .await;

    assert_eq!(res.status, StatusCode::BAD_REQUEST);
    assert!(res.body["detail"].as_str().unwrap().contains("passport"));
    assert!(ctx.provider.submissions().is_empty());
}

#[tokio::test]
async fn malformed_base64_is_a_bad_request() {
    let ctx = TestHarness::new();

    let res = ctx
        .post(
            "/api/v1/extract",
            json!({ "file_data": "%%%", "file_name": "a.pdf", "document_type": "invoice" }),
        )
        .await;

    assert_eq!(res.status, StatusCode::BAD_REQUEST);
    assert!(ctx.provider.submissions().is_empty());
}

#[tokio::test(start_paused = true)]
async fn provider_failure_is_unprocessable() {
    let ctx = TestHarness::with_provider(
        MockExtractionProvider::new()
            .then_pending(1)
            .then_failed("document is blank"),
    );

    let res = ctx
        .post("/api/v1/extract", extract_body("invoice", "a.pdf", b"%PDF"))
        .await;

    assert_eq!(res.status, StatusCode::UNPROCESSABLE_ENTITY);
    assert!(res.body["detail"]
        .as_str()
        .unwrap()
        .contains("document is blank"));
}

#[tokio::test(start_paused = true)]
async fn never_ready_job_times_out_after_the_budget() {
    let ctx = TestHarness::new();
    let started = Instant::now();

    let res = ctx
        .post("/api/v1/extract", extract_body("invoice", "a.pdf", b"%PDF"))
        .await;

    assert_eq!(res.status, StatusCode::GATEWAY_TIMEOUT);
    assert!(started.elapsed() >= TEST_TIMEOUT);
    assert!(res.body["detail"].as_str().unwrap().contains("job-1"));
}

#[tokio::test]
async fn rejected_submission_is_a_bad_gateway() {
    let ctx = TestHarness::with_provider(
        MockExtractionProvider::new().reject_submission("invalid api key"),
    );

    let res = ctx
        .post("/api/v1/extract", extract_body("invoice", "a.pdf", b"%PDF"))
        .await;

    assert_eq!(res.status, StatusCode::BAD_GATEWAY);
    assert_eq!(ctx.provider.submissions().len(), 1);
    assert_eq!(ctx.provider.poll_count(), 0);
}
