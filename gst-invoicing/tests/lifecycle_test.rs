mod common;

use axum::http::StatusCode;
use common::{intra_state_invoice, TestApp};
use serde_json::json;

async fn draft_invoice(app: &TestApp) -> String {
    let invoice = app.create_invoice(intra_state_invoice()).await;
    invoice["_id"].as_str().unwrap().to_string()
}

#[tokio::test]
async fn draft_is_approved_then_paid() {
    let app = TestApp::with_company().await;
    let id = draft_invoice(&app).await;

    let approved = app.post(&format!("/invoices/{}/approve", id), json!({})).await;
    assert_eq!(approved.status, StatusCode::OK);
    assert_eq!(approved.body["status"], "approved");
    assert_eq!(approved.body["paymentStatus"], "unpaid");

    let paid = app.post(&format!("/invoices/{}/mark-paid", id), json!({})).await;
    assert_eq!(paid.status, StatusCode::OK);
    assert_eq!(paid.body["status"], "paid");
    assert_eq!(paid.body["paymentStatus"], "paid");

    let actions: Vec<_> = paid.body["auditLog"]
        .as_array()
        .unwrap()
        .iter()
        .map(|entry| entry["action"].as_str().unwrap().to_string())
        .collect();
    assert_eq!(actions, vec!["create", "approve", "markPaid"]);
}

#[tokio::test]
async fn draft_cannot_be_marked_paid() {
    let app = TestApp::with_company().await;
    let id = draft_invoice(&app).await;

    let response = app.post(&format!("/invoices/{}/mark-paid", id), json!({})).await;

    assert_eq!(response.status, StatusCode::BAD_REQUEST);
    assert_eq!(response.body["error"], "A draft invoice cannot be marked paid");
}

#[tokio::test]
async fn approving_twice_is_rejected() {
    let app = TestApp::with_company().await;
    let id = draft_invoice(&app).await;

    app.post(&format!("/invoices/{}/approve", id), json!({})).await;
    let again = app.post(&format!("/invoices/{}/approve", id), json!({})).await;

    assert_eq!(again.status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn paid_invoice_cannot_be_voided() {
    let app = TestApp::with_company().await;
    let id = draft_invoice(&app).await;
    app.post(&format!("/invoices/{}/approve", id), json!({})).await;
    app.post(&format!("/invoices/{}/mark-paid", id), json!({})).await;

    let response = app.post(&format!("/invoices/{}/void", id), json!({})).await;

    assert_eq!(response.status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn void_invoice_is_frozen() {
    let app = TestApp::with_company().await;
    let id = draft_invoice(&app).await;

    let voided = app.post(&format!("/invoices/{}/void", id), json!({})).await;
    assert_eq!(voided.status, StatusCode::OK);
    assert_eq!(voided.body["status"], "void");

    let edit = app
        .patch(&format!("/invoices/{}", id), json!({ "notes": "too late" }))
        .await;
    assert_eq!(edit.status, StatusCode::BAD_REQUEST);

    let approve = app.post(&format!("/invoices/{}/approve", id), json!({})).await;
    assert_eq!(approve.status, StatusCode::BAD_REQUEST);

    let payment = app
        .patch(
            &format!("/invoices/{}/payment-status", id),
            json!({ "paymentStatus": "paid" }),
        )
        .await;
    assert_eq!(payment.status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn payment_status_moves_independently_of_status() {
    let app = TestApp::with_company().await;
    let id = draft_invoice(&app).await;
    let uri = format!("/invoices/{}/payment-status", id);

    let partial = app.patch(&uri, json!({ "paymentStatus": "partial" })).await;
    assert_eq!(partial.status, StatusCode::OK);
    assert_eq!(partial.body["status"], "draft");
    assert_eq!(partial.body["paymentStatus"], "partial");

    let back = app.patch(&uri, json!({ "paymentStatus": "unpaid" })).await;
    assert_eq!(back.body["paymentStatus"], "unpaid");

    let invalid = app.patch(&uri, json!({ "paymentStatus": "refunded" })).await;
    assert_eq!(invalid.status, StatusCode::BAD_REQUEST);

    let audit = back.body["auditLog"].as_array().unwrap();
    assert_eq!(audit.last().unwrap()["action"], "paymentStatus");
    assert_eq!(audit.last().unwrap()["changes"]["paymentStatus"], "unpaid");
}

#[tokio::test]
async fn approved_invoice_can_still_be_edited() {
    let app = TestApp::with_company().await;
    let id = draft_invoice(&app).await;
    app.post(&format!("/invoices/{}/approve", id), json!({})).await;

    let edit = app
        .patch(&format!("/invoices/{}", id), json!({ "poNumber": "PO-778" }))
        .await;

    assert_eq!(edit.status, StatusCode::OK);
    assert_eq!(edit.body["status"], "approved");
    assert_eq!(edit.body["poNumber"], "PO-778");
}

#[tokio::test]
async fn unknown_invoice_is_not_found() {
    let app = TestApp::with_company().await;

    let response = app
        .post(&format!("/invoices/{}/approve", uuid::Uuid::new_v4()), json!({}))
        .await;

    assert_eq!(response.status, StatusCode::NOT_FOUND);
}
