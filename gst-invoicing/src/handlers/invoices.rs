//! Invoice endpoints.

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use serde_json::Value;
use service_core::error::AppError;
use uuid::Uuid;

use super::Tracked;
use crate::{
    dtos::{
        CreateInvoiceRequest, InvoiceListParams, PaymentStatusRequest, PdfSnapshotRequest,
        SearchParams, UpdateInvoiceRequest, SEARCH_LIMIT,
    },
    middleware::TenantContext,
    models::Invoice,
    store::{Page, Sort},
    AppState,
};

const SORT_FIELDS: &[&str] = &["createdAt", "invoiceDate", "invoiceNo", "grandTotal"];

const DEFAULT_SORT: Sort = Sort {
    field: "createdAt",
    descending: true,
};

pub async fn create_invoice(
    State(state): State<AppState>,
    tenant: TenantContext,
    Json(payload): Json<CreateInvoiceRequest>,
) -> Result<(StatusCode, Json<Invoice>), AppError> {
    let invoice = state
        .invoices
        .create(&tenant, payload)
        .await
        .tracked()?;
    Ok((StatusCode::CREATED, Json(invoice)))
}

pub async fn list_invoices(
    State(state): State<AppState>,
    tenant: TenantContext,
    Query(params): Query<InvoiceListParams>,
) -> Result<Json<Page<Invoice>>, AppError> {
    let page = params.pagination().page_request(SORT_FIELDS, DEFAULT_SORT).tracked()?;
    let filter = params.filter().tracked()?;
    let invoices = state.invoices.list(&tenant, &filter, &page).await.tracked()?;
    Ok(Json(invoices))
}

/// Case-insensitive match on invoice number or buyer name/GSTIN, newest first.
pub async fn search_invoices(
    State(state): State<AppState>,
    tenant: TenantContext,
    Query(params): Query<SearchParams>,
) -> Result<Json<Vec<Invoice>>, AppError> {
    let invoices = state
        .invoices
        .search(&tenant, &params.q, SEARCH_LIMIT)
        .await
        .tracked()?;
    Ok(Json(invoices))
}

pub async fn get_invoice(
    State(state): State<AppState>,
    tenant: TenantContext,
    Path(invoice_id): Path<Uuid>,
) -> Result<Json<Invoice>, AppError> {
    Ok(Json(state.invoices.get(&tenant, invoice_id).await.tracked()?))
}

/// The raw body is kept for the audit entry, so it is parsed here rather than by the extractor.
pub async fn update_invoice(
    State(state): State<AppState>,
    tenant: TenantContext,
    Path(invoice_id): Path<Uuid>,
    Json(raw): Json<Value>,
) -> Result<Json<Invoice>, AppError> {
    let request: UpdateInvoiceRequest = serde_json::from_value(raw.clone())
        .map_err(|e| AppError::bad_request(format!("Invalid invoice update: {}", e)))
        .tracked()?;
    let invoice = state
        .invoices
        .update(&tenant, invoice_id, request, raw)
        .await
        .tracked()?;
    Ok(Json(invoice))
}

pub async fn approve_invoice(
    State(state): State<AppState>,
    tenant: TenantContext,
    Path(invoice_id): Path<Uuid>,
) -> Result<Json<Invoice>, AppError> {
    let invoice = state
        .invoices
        .approve(&tenant, invoice_id)
        .await
        .tracked()?;
    Ok(Json(invoice))
}

pub async fn mark_invoice_paid(
    State(state): State<AppState>,
    tenant: TenantContext,
    Path(invoice_id): Path<Uuid>,
) -> Result<Json<Invoice>, AppError> {
    let invoice = state
        .invoices
        .mark_paid(&tenant, invoice_id)
        .await
        .tracked()?;
    Ok(Json(invoice))
}

pub async fn void_invoice(
    State(state): State<AppState>,
    tenant: TenantContext,
    Path(invoice_id): Path<Uuid>,
) -> Result<Json<Invoice>, AppError> {
    let invoice = state
        .invoices
        .void(&tenant, invoice_id)
        .await
        .tracked()?;
    Ok(Json(invoice))
}

pub async fn update_payment_status(
    State(state): State<AppState>,
    tenant: TenantContext,
    Path(invoice_id): Path<Uuid>,
    Json(payload): Json<PaymentStatusRequest>,
) -> Result<Json<Invoice>, AppError> {
    let payment_status = payload.parse().tracked()?;
    let invoice = state
        .invoices
        .set_payment_status(&tenant, invoice_id, payment_status)
        .await
        .tracked()?;
    Ok(Json(invoice))
}

pub async fn add_pdf_snapshot(
    State(state): State<AppState>,
    tenant: TenantContext,
    Path(invoice_id): Path<Uuid>,
    Json(payload): Json<PdfSnapshotRequest>,
) -> Result<(StatusCode, Json<Invoice>), AppError> {
    let invoice = state
        .invoices
        .add_pdf_snapshot(&tenant, invoice_id, payload)
        .await
        .tracked()?;
    Ok((StatusCode::CREATED, Json(invoice)))
}
