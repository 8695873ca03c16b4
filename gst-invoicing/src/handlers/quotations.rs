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
        CreateQuotationRequest, PdfSnapshotRequest, QuotationListParams, SearchParams,
        UpdateQuotationRequest, SEARCH_LIMIT,
    },
    middleware::TenantContext,
    models::Quotation,
    store::{Page, Sort},
    AppState,
};

const SORT_FIELDS: &[&str] = &["createdAt", "quotationDate", "quotationNo", "total"];

const DEFAULT_SORT: Sort = Sort {
    field: "createdAt",
    descending: true,
};

pub async fn create_quotation(
    State(state): State<AppState>,
    tenant: TenantContext,
    Json(payload): Json<CreateQuotationRequest>,
) -> Result<(StatusCode, Json<Quotation>), AppError> {
    let quotation = state
        .quotations
        .create(&tenant, payload)
        .await
        .tracked()?;
    Ok((StatusCode::CREATED, Json(quotation)))
}

pub async fn list_quotations(
    State(state): State<AppState>,
    tenant: TenantContext,
    Query(params): Query<QuotationListParams>,
) -> Result<Json<Page<Quotation>>, AppError> {
    let page = params.pagination().page_request(SORT_FIELDS, DEFAULT_SORT).tracked()?;
    let filter = params.filter().tracked()?;
    Ok(Json(state.quotations.list(&tenant, &filter, &page).await.tracked()?))
}

pub async fn search_quotations(
    State(state): State<AppState>,
    tenant: TenantContext,
    Query(params): Query<SearchParams>,
) -> Result<Json<Vec<Quotation>>, AppError> {
    let quotations = state
        .quotations
        .search(&tenant, &params.q, SEARCH_LIMIT)
        .await
        .tracked()?;
    Ok(Json(quotations))
}

pub async fn get_quotation(
    State(state): State<AppState>,
    tenant: TenantContext,
    Path(quotation_id): Path<Uuid>,
) -> Result<Json<Quotation>, AppError> {
    Ok(Json(state.quotations.get(&tenant, quotation_id).await.tracked()?))
}

pub async fn update_quotation(
    State(state): State<AppState>,
    tenant: TenantContext,
    Path(quotation_id): Path<Uuid>,
    Json(raw): Json<Value>,
) -> Result<Json<Quotation>, AppError> {
    let request: UpdateQuotationRequest = serde_json::from_value(raw.clone())
        .map_err(|e| AppError::bad_request(format!("Invalid quotation update: {}", e)))
        .tracked()?;
    let quotation = state
        .quotations
        .update(&tenant, quotation_id, request, raw)
        .await
        .tracked()?;
    Ok(Json(quotation))
}

pub async fn approve_quotation(
    State(state): State<AppState>,
    tenant: TenantContext,
    Path(quotation_id): Path<Uuid>,
) -> Result<Json<Quotation>, AppError> {
    let quotation = state
        .quotations
        .approve(&tenant, quotation_id)
        .await
        .tracked()?;
    Ok(Json(quotation))
}

pub async fn reject_quotation(
    State(state): State<AppState>,
    tenant: TenantContext,
    Path(quotation_id): Path<Uuid>,
) -> Result<Json<Quotation>, AppError> {
    let quotation = state
        .quotations
        .reject(&tenant, quotation_id)
        .await
        .tracked()?;
    Ok(Json(quotation))
}

pub async fn add_pdf_snapshot(
    State(state): State<AppState>,
    tenant: TenantContext,
    Path(quotation_id): Path<Uuid>,
    Json(payload): Json<PdfSnapshotRequest>,
) -> Result<(StatusCode, Json<Quotation>), AppError> {
    let quotation = state
        .quotations
        .add_pdf_snapshot(&tenant, quotation_id, payload)
        .await
        .tracked()?;
    Ok((StatusCode::CREATED, Json(quotation)))
}
