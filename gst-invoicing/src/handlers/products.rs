//! Product catalog handlers. Deletion is a soft delete.

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use service_core::error::AppError;
use uuid::Uuid;
use validator::Validate;

use crate::{
    dtos::{CatalogListParams, CreateProductRequest},
    middleware::TenantContext,
    models::Product,
    store::{Page, Sort},
    AppState,
};

use super::Tracked;

const SORT_FIELDS: &[&str] = &["createdAt", "name"];

pub async fn create_product(
    State(state): State<AppState>,
    tenant: TenantContext,
    Json(payload): Json<CreateProductRequest>,
) -> Result<(StatusCode, Json<Product>), AppError> {
    payload.validate().tracked()?;
    payload.check().tracked()?;

    let mut product = Product::new(&tenant.company_id, &payload.name, &payload.hsn);
    product.unit = payload.unit;
    product.purchase_price = payload.purchase_price;
    product.sell_price = payload.sell_price;
    product.gst_rate = payload.gst_rate;

    let product = state.store.insert_product(product).await.tracked()?;
    tracing::info!(product_id = %product.id, name = %product.name, "Product created");
    Ok((StatusCode::CREATED, Json(product)))
}

pub async fn list_products(
    State(state): State<AppState>,
    tenant: TenantContext,
    Query(params): Query<CatalogListParams>,
) -> Result<Json<Page<Product>>, AppError> {
    let page = params
        .pagination()
        .page_request(
            SORT_FIELDS,
            Sort {
                field: "name",
                descending: false,
            },
        )
        .tracked()?;
    let products = state
        .store
        .list_products(&tenant.company_id, params.search(), &page)
        .await
        .tracked()?;
    Ok(Json(products))
}

pub async fn get_product(
    State(state): State<AppState>,
    tenant: TenantContext,
    Path(product_id): Path<Uuid>,
) -> Result<Json<Product>, AppError> {
    let product = state
        .store
        .get_product(&tenant.company_id, product_id)
        .await
        .tracked()?
        .ok_or_else(|| AppError::not_found("Product not found"))
        .tracked()?;
    Ok(Json(product))
}

pub async fn delete_product(
    State(state): State<AppState>,
    tenant: TenantContext,
    Path(product_id): Path<Uuid>,
) -> Result<StatusCode, AppError> {
    if !state
        .store
        .deactivate_product(&tenant.company_id, product_id)
        .await
        .tracked()?
    {
        return Err(AppError::not_found("Product not found"));
    }
    tracing::info!(product_id = %product_id, "Product deactivated");
    Ok(StatusCode::NO_CONTENT)
}
