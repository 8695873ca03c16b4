mod common;

use axum::http::StatusCode;
use common::{amount, TestApp};
use serde_json::json;

#[tokio::test]
async fn company_profile_round_trips() {
    let app = TestApp::with_company().await;

    let response = app.get("/company").await;

    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(response.body["name"], "Acme Traders");
    assert_eq!(response.body["stateCode"], "29");
    assert_eq!(response.body["bankDetails"]["ifsc"], "HDFC0000123");
}

#[tokio::test]
async fn missing_company_profile_is_not_found() {
    let app = TestApp::spawn();

    let response = app.get("/company").await;

    assert_eq!(response.status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn company_profile_requires_a_name() {
    let app = TestApp::spawn();

    let response = app.put("/company", json!({ "gstin": "29ABCDE1234F1Z5" })).await;

    assert_eq!(response.status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn customers_are_created_listed_and_deactivated() {
    let app = TestApp::spawn();

    let created = app
        .post(
            "/customers",
            json!({ "name": "Zenith Labs", "gstin": "07aaacz1234f1z1" }),
        )
        .await;
    assert_eq!(created.status, StatusCode::CREATED);
    assert_eq!(created.body["gstin"], "07AAACZ1234F1Z1");
    assert_eq!(created.body["stateCode"], "07");

    app.post("/customers", json!({ "name": "Alpha Foods" })).await;

    let listed = app.get("/customers").await;
    assert_eq!(listed.body["total"], 2);
    assert_eq!(listed.body["items"][0]["name"], "Alpha Foods");

    let searched = app.get("/customers?q=zenith").await;
    assert_eq!(searched.body["total"], 1);

    let id = created.body["_id"].as_str().unwrap();
    let deleted = app.delete(&format!("/customers/{}", id)).await;
    assert_eq!(deleted.status, StatusCode::NO_CONTENT);

    let gone = app.get(&format!("/customers/{}", id)).await;
    assert_eq!(gone.status, StatusCode::NOT_FOUND);
    assert_eq!(app.get("/customers").await.body["total"], 1);

    let again = app.delete(&format!("/customers/{}", id)).await;
    assert_eq!(again.status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn customer_without_name_is_rejected() {
    let app = TestApp::spawn();

    let response = app.post("/customers", json!({ "email": "a@b.in" })).await;

    assert_eq!(response.status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn invoice_can_reference_a_catalog_customer_by_id() {
    let app = TestApp::with_company().await;
    let customer = app
        .post(
            "/customers",
            json!({ "name": "Delhi Mart", "gstin": "07AAACD1234F1Z1" }),
        )
        .await;
    let customer_id = customer.body["_id"].as_str().unwrap();

    let invoice = app
        .create_invoice(json!({
            "customer": customer_id,
            "items": [{ "name": "Crate", "hsn": "4415", "quantity": 1, "rate": 1000, "gstRate": 12 }]
        }))
        .await;

    assert_eq!(invoice["customerId"], customer_id);
    assert_eq!(invoice["buyer"]["name"], "Delhi Mart");
    assert_eq!(amount(&invoice["totalIgst"]), 120.0);

    let unknown = app
        .post(
            "/invoices",
            json!({
                "customer": uuid::Uuid::new_v4().to_string(),
                "items": [{ "name": "Crate", "hsn": "4415", "quantity": 1, "rate": 1000 }]
            }),
        )
        .await;
    assert_eq!(unknown.status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn products_are_created_and_validated() {
    let app = TestApp::spawn();

    let created = app
        .post(
            "/products",
            json!({ "name": "Copper Wire", "hsn": "7408", "unit": "m", "sellPrice": 45.5, "gstRate": 18 }),
        )
        .await;
    assert_eq!(created.status, StatusCode::CREATED);
    assert_eq!(amount(&created.body["sellPrice"]), 45.5);

    let id = created.body["_id"].as_str().unwrap();
    let fetched = app.get(&format!("/products/{}", id)).await;
    assert_eq!(fetched.body["name"], "Copper Wire");

    let bad_rate = app
        .post("/products", json!({ "name": "Mystery", "gstRate": 180 }))
        .await;
    assert_eq!(bad_rate.status, StatusCode::BAD_REQUEST);

    let no_name = app.post("/products", json!({ "name": "" })).await;
    assert_eq!(no_name.status, StatusCode::UNPROCESSABLE_ENTITY);

    let deleted = app.delete(&format!("/products/{}", id)).await;
    assert_eq!(deleted.status, StatusCode::NO_CONTENT);
    assert_eq!(app.get("/products").await.body["total"], 0);
}

#[tokio::test]
async fn catalog_pagination_is_clamped() {
    let app = TestApp::spawn();
    for name in ["A", "B", "C"] {
        app.post("/customers", json!({ "name": name })).await;
    }

    let page = app.get("/customers?page=2&limit=2").await;
    assert_eq!(page.body["total"], 3);
    assert_eq!(page.body["page"], 2);
    assert_eq!(page.body["items"].as_array().unwrap().len(), 1);
    assert_eq!(page.body["items"][0]["name"], "C");

    let huge = app.get("/customers?limit=5000").await;
    assert_eq!(huge.body["limit"], 100);
}
