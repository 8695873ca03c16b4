mod common;

use axum::http::StatusCode;
use common::TestApp;

#[tokio::test]
async fn health_check_works() {
    let app = TestApp::spawn();

    let response = app.get("/health").await;

    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(response.body["status"], "ok");
    assert_eq!(response.body["service"], "gst-invoicing");
}

#[tokio::test]
async fn readiness_check_works_without_a_database() {
    let app = TestApp::spawn();

    let response = app.get("/ready").await;

    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(response.body["status"], "ready");
}

#[tokio::test]
async fn metrics_endpoint_renders_text() {
    gst_invoicing::services::init_metrics();
    let app = TestApp::with_company().await;
    app.create_invoice(common::intra_state_invoice()).await;

    let response = app.get("/metrics").await;

    assert_eq!(response.status, StatusCode::OK);
    let text = response.body.as_str().unwrap_or_default().to_string();
    assert!(text.contains("invoicing_invoices_total"), "{}", text);
}

#[tokio::test]
async fn failed_reads_are_counted_by_kind() {
    use gst_invoicing::services::metrics::ERRORS_TOTAL;

    let app = TestApp::spawn();
    let not_found = || ERRORS_TOTAL.with_label_values(&["not_found"]).get();
    let bad_request = || ERRORS_TOTAL.with_label_values(&["bad_request"]).get();
    let (missing_before, bad_before) = (not_found(), bad_request());

    let id = uuid::Uuid::new_v4();
    assert_eq!(
        app.get(&format!("/invoices/{}", id)).await.status,
        StatusCode::NOT_FOUND
    );
    assert_eq!(
        app.get(&format!("/quotations/{}", id)).await.status,
        StatusCode::NOT_FOUND
    );
    assert_eq!(
        app.get("/invoices?sort=buyer").await.status,
        StatusCode::BAD_REQUEST
    );

    assert!(not_found() >= missing_before + 2.0);
    assert!(bad_request() >= bad_before + 1.0);
}
