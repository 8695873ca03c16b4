mod common;

use axum::http::StatusCode;
use common::{amount, TestApp};
use regex::Regex;
use serde_json::{json, Value};

fn quotation_body() -> Value {
    json!({
        "customer": { "name": "Lotus Interiors", "stateCode": "29" },
        "validUntil": "2030-12-31",
        "columns": [
            { "key": "item", "label": "Item", "type": "text" },
            { "key": "quantity", "label": "Qty", "type": "number" },
            { "key": "rate", "label": "Rate", "type": "currency" }
        ],
        "rows": [
            { "item": "Design", "quantity": 2, "rate": 1500 },
            { "item": "Site visit", "total": "500" }
        ],
        "notes": "Prices exclusive of GST"
    })
}

async fn create_quotation(app: &TestApp) -> Value {
    let response = app.post("/quotations", quotation_body()).await;
    assert_eq!(response.status, StatusCode::CREATED, "{}", response.body);
    response.body
}

#[tokio::test]
async fn create_quotation_computes_row_totals() {
    let app = TestApp::with_company().await;

    let quotation = create_quotation(&app).await;

    assert_eq!(quotation["status"], "draft");
    assert_eq!(amount(&quotation["rows"][0]["total"]), 3000.0);
    assert_eq!(amount(&quotation["rows"][1]["total"]), 500.0);
    assert_eq!(amount(&quotation["total"]), 3500.0);
    assert_eq!(
        quotation["amountInWords"],
        "Three Thousand Five Hundred Rupees Only"
    );
    assert_eq!(quotation["rows"][0]["values"]["item"], "Design");

    let number = Regex::new(r"^QUO-\d{4}-1$").unwrap();
    let quotation_no = quotation["quotationNo"].as_str().unwrap();
    assert!(number.is_match(quotation_no), "{}", quotation_no);
}

#[tokio::test]
async fn quotation_numbers_count_up() {
    let app = TestApp::with_company().await;

    let first = create_quotation(&app).await;
    let second = create_quotation(&app).await;

    let first_no = first["quotationNo"].as_str().unwrap();
    let second_no = second["quotationNo"].as_str().unwrap();
    assert!(first_no.ends_with("-1"));
    assert!(second_no.ends_with("-2"));
}

#[tokio::test]
async fn total_override_can_be_set_and_cleared() {
    let app = TestApp::with_company().await;
    let quotation = create_quotation(&app).await;
    let uri = format!("/quotations/{}", quotation["_id"].as_str().unwrap());

    let overridden = app.patch(&uri, json!({ "totalOverride": 3000 })).await;
    assert_eq!(overridden.status, StatusCode::OK, "{}", overridden.body);
    assert_eq!(amount(&overridden.body["total"]), 3000.0);

    let untouched = app.patch(&uri, json!({ "notes": "Revised" })).await;
    assert_eq!(amount(&untouched.body["total"]), 3000.0);
    assert_eq!(untouched.body["notes"], "Revised");

    let cleared = app.patch(&uri, json!({ "totalOverride": null })).await;
    assert_eq!(amount(&cleared.body["total"]), 3500.0);
    assert!(cleared.body.get("totalOverride").is_none());

    let negative = app.patch(&uri, json!({ "totalOverride": -1 })).await;
    assert_eq!(negative.status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn replacing_rows_recomputes_totals() {
    let app = TestApp::with_company().await;
    let quotation = create_quotation(&app).await;

    let response = app
        .patch(
            &format!("/quotations/{}", quotation["_id"].as_str().unwrap()),
            json!({ "rows": [{ "item": "Design", "quantity": 3, "rate": 1500 }] }),
        )
        .await;

    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(response.body["rows"].as_array().unwrap().len(), 1);
    assert_eq!(amount(&response.body["total"]), 4500.0);
    assert_eq!(response.body["auditLog"][1]["action"], "update");
}

#[tokio::test]
async fn duplicate_column_keys_are_rejected() {
    let app = TestApp::with_company().await;

    let mut body = quotation_body();
    body["columns"] = json!([
        { "key": "item", "label": "Item" },
        { "key": "item", "label": "Item again" }
    ]);
    let response = app.post("/quotations", body).await;

    assert_eq!(response.status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn oversized_row_amount_is_rejected() {
    let app = TestApp::with_company().await;

    let mut body = quotation_body();
    body["rows"] = json!([{ "item": "Bulk", "quantity": 1e20, "rate": 1e15 }]);
    let response = app.post("/quotations", body).await;

    assert_eq!(response.status, StatusCode::BAD_REQUEST);
    assert_eq!(response.body["error"], "Line amount out of range");
    assert_eq!(app.get("/customers").await.body["total"], 0);
}

#[tokio::test]
async fn rejected_quotation_is_frozen() {
    let app = TestApp::with_company().await;
    let quotation = create_quotation(&app).await;
    let id = quotation["_id"].as_str().unwrap();

    let rejected = app.post(&format!("/quotations/{}/reject", id), json!({})).await;
    assert_eq!(rejected.status, StatusCode::OK);
    assert_eq!(rejected.body["status"], "rejected");

    let approve = app.post(&format!("/quotations/{}/approve", id), json!({})).await;
    assert_eq!(approve.status, StatusCode::BAD_REQUEST);

    let edit = app
        .patch(&format!("/quotations/{}", id), json!({ "notes": "reconsider" }))
        .await;
    assert_eq!(edit.status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn approved_quotation_is_listed_by_status() {
    let app = TestApp::with_company().await;
    let approved = create_quotation(&app).await;
    create_quotation(&app).await;
    app.post(
        &format!("/quotations/{}/approve", approved["_id"].as_str().unwrap()),
        json!({}),
    )
    .await;

    let response = app.get("/quotations?status=approved").await;

    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(response.body["total"], 1);
    assert_eq!(response.body["items"][0]["_id"], approved["_id"]);

    let all = app.get("/quotations?sort=quotationNo").await;
    assert_eq!(all.body["total"], 2);
}

#[tokio::test]
async fn search_finds_quotations_by_customer() {
    let app = TestApp::with_company().await;
    create_quotation(&app).await;

    let hits = app.get("/quotations/search?q=LOTUS").await;
    assert_eq!(hits.body.as_array().unwrap().len(), 1);

    let misses = app.get("/quotations/search?q=acme").await;
    assert_eq!(misses.body, json!([]));
}

#[tokio::test]
async fn quotation_pdf_snapshot_is_recorded() {
    let app = TestApp::with_company().await;
    let quotation = create_quotation(&app).await;

    let response = app
        .post(
            &format!("/quotations/{}/pdf-snapshots", quotation["_id"].as_str().unwrap()),
            json!({ "url": "https://files.example.com/quo.pdf", "generator": "chromium" }),
        )
        .await;

    assert_eq!(response.status, StatusCode::CREATED);
    assert_eq!(response.body["pdfSnapshots"][0]["version"], 1);
    assert_eq!(response.body["auditLog"][1]["action"], "pdfSnapshot");
}
