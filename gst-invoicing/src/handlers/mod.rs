//! HTTP handlers for gst-invoicing.

pub mod company;
pub mod customers;
pub mod invoices;
pub mod products;
pub mod quotations;
pub mod reports;

use axum::{extract::State, http::StatusCode, response::IntoResponse, Json};
use serde_json::json;

use service_core::error::AppError;

use crate::services::{get_metrics, metrics::record_error};
use crate::AppState;

/// Count a failed operation by error kind before handing it to axum.
pub(crate) trait Tracked<T> {
    fn tracked(self) -> Result<T, AppError>;
}

impl<T, E> Tracked<T> for Result<T, E>
where
    E: Into<AppError>,
{
    fn tracked(self) -> Result<T, AppError> {
        self.map_err(|err| {
            let err = err.into();
            record_error(err.kind());
            err
        })
    }
}

pub async fn health_check() -> impl IntoResponse {
    (
        StatusCode::OK,
        Json(json!({
            "status": "ok",
            "service": "gst-invoicing",
            "version": env!("CARGO_PKG_VERSION")
        })),
    )
}

/// Ready once the document store answers a ping.
pub async fn readiness_check(State(state): State<AppState>) -> impl IntoResponse {
    match &state.mongo {
        Some(mongo) => match mongo.health_check().await {
            Ok(()) => (StatusCode::OK, Json(json!({ "status": "ready" }))),
            Err(e) => {
                tracing::warn!(error = %e, "Readiness check failed");
                (
                    StatusCode::SERVICE_UNAVAILABLE,
                    Json(json!({ "status": "unavailable" })),
                )
            }
        },
        None => (StatusCode::OK, Json(json!({ "status": "ready" }))),
    }
}

pub async fn metrics() -> impl IntoResponse {
    (
        StatusCode::OK,
        [("content-type", "text/plain; charset=utf-8")],
        get_metrics(),
    )
}
