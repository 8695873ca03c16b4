//! Common helpers for gst-invoicing integration tests.
//!
//! Requests go straight through the router backed by the in-memory store.

#![allow(dead_code)]

use axum::body::Body;
use axum::http::{Request, StatusCode};
use axum::Router;
use gst_invoicing::{router, AppState};
use http_body_util::BodyExt;
use serde_json::{json, Value};
use std::sync::Once;
use tower::ServiceExt;

pub const TEST_USER_ID: &str = "test-user";

static INIT: Once = Once::new();

pub fn init_tracing() {
    INIT.call_once(|| {
        tracing_subscriber::fmt()
            .with_env_filter("info,gst_invoicing=debug")
            .with_test_writer()
            .try_init()
            .ok();
    });
}

pub struct TestApp {
    pub router: Router,
    pub company_id: String,
}

pub struct TestResponse {
    pub status: StatusCode,
    pub body: Value,
}

impl TestApp {
    /// Fresh in-memory app with a unique tenant and no company profile.
    pub fn spawn() -> Self {
        init_tracing();
        TestApp {
            router: router(AppState::in_memory()),
            company_id: format!("company-{}", uuid::Uuid::new_v4()),
        }
    }

    /// App whose tenant has a Karnataka (29) seller profile.
    pub async fn with_company() -> Self {
        let app = Self::spawn();
        let response = app
            .put(
                "/company",
                json!({
                    "name": "Acme Traders",
                    "gstin": "29ABCDE1234F1Z5",
                    "address": "12 MG Road",
                    "city": "Bengaluru",
                    "pan": "ABCDE1234F",
                    "bankDetails": {
                        "accountName": "Acme Traders",
                        "accountNumber": "000123456789",
                        "ifsc": "HDFC0000123"
                    }
                }),
            )
            .await;
        assert_eq!(response.status, StatusCode::OK, "{}", response.body);
        app
    }

    pub async fn send(&self, request: Request<Body>) -> TestResponse {
        let response = self
            .router
            .clone()
            .oneshot(request)
            .await
            .expect("router is infallible");

        let status = response.status();
        let bytes = response
            .into_body()
            .collect()
            .await
            .expect("Failed to read body")
            .to_bytes();
        let body = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap_or_else(|_| {
                Value::String(String::from_utf8_lossy(&bytes).into_owned())
            })
        };

        TestResponse { status, body }
    }

    fn request(&self, method: &str, uri: &str, body: Option<Value>) -> Request<Body> {
        let builder = Request::builder()
            .method(method)
            .uri(uri)
            .header("X-Company-ID", &self.company_id)
            .header("X-User-ID", TEST_USER_ID);

        match body {
            Some(body) => builder
                .header("content-type", "application/json")
                .body(Body::from(body.to_string()))
                .expect("Failed to build request"),
            None => builder.body(Body::empty()).expect("Failed to build request"),
        }
    }

    pub async fn get(&self, uri: &str) -> TestResponse {
        self.send(self.request("GET", uri, None)).await
    }

    pub async fn post(&self, uri: &str, body: Value) -> TestResponse {
        self.send(self.request("POST", uri, Some(body))).await
    }

    pub async fn put(&self, uri: &str, body: Value) -> TestResponse {
        self.send(self.request("PUT", uri, Some(body))).await
    }

    pub async fn patch(&self, uri: &str, body: Value) -> TestResponse {
        self.send(self.request("PATCH", uri, Some(body))).await
    }

    pub async fn delete(&self, uri: &str) -> TestResponse {
        self.send(self.request("DELETE", uri, None)).await
    }

    /// Same router, different tenant.
    pub fn as_company(&self, company_id: &str) -> TestApp {
        TestApp {
            router: self.router.clone(),
            company_id: company_id.to_string(),
        }
    }

    pub async fn create_invoice(&self, body: Value) -> Value {
        let response = self.post("/invoices", body).await;
        assert_eq!(response.status, StatusCode::CREATED, "{}", response.body);
        response.body
    }
}

/// Buyer in the seller's state, two units at 500 with 12% GST.
pub fn intra_state_invoice() -> Value {
    json!({
        "customer": {
            "name": "Bharat Stores",
            "gstin": "29AAACB1234F1Z9",
            "email": "Accounts@BharatStores.in"
        },
        "items": [{
            "name": "Steel Bracket",
            "hsn": "7326",
            "unit": "pcs",
            "quantity": 2,
            "rate": 500,
            "gstRate": 12
        }]
    })
}

pub fn amount(value: &Value) -> f64 {
    value
        .as_f64()
        .unwrap_or_else(|| panic!("expected a number, got {}", value))
}
