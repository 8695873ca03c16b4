//! Customer catalog handlers. Deletion is a soft delete.

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use service_core::error::AppError;
use uuid::Uuid;

use crate::{
    dtos::{CatalogListParams, CreateCustomerRequest},
    middleware::TenantContext,
    models::{Customer, CustomerMatch},
    store::{Page, Sort},
    AppState,
};

use super::Tracked;

const SORT_FIELDS: &[&str] = &["createdAt", "name"];

pub async fn create_customer(
    State(state): State<AppState>,
    tenant: TenantContext,
    Json(payload): Json<CreateCustomerRequest>,
) -> Result<(StatusCode, Json<Customer>), AppError> {
    payload.check().tracked()?;

    let mut details = payload.details;
    let contact = CustomerMatch::from_snapshot(&details);
    details.gstin = contact.gstin;
    details.email = contact.email;
    details.state_code = details.effective_state_code();

    let customer = state
        .store
        .insert_customer(Customer::new(&tenant.company_id, details))
        .await
        .tracked()?;

    tracing::info!(
        customer_id = %customer.id,
        company_id = %tenant.company_id,
        "Customer created"
    );
    Ok((StatusCode::CREATED, Json(customer)))
}

pub async fn list_customers(
    State(state): State<AppState>,
    tenant: TenantContext,
    Query(params): Query<CatalogListParams>,
) -> Result<Json<Page<Customer>>, AppError> {
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
    let customers = state
        .store
        .list_customers(&tenant.company_id, params.search(), &page)
        .await
        .tracked()?;
    Ok(Json(customers))
}

pub async fn get_customer(
    State(state): State<AppState>,
    tenant: TenantContext,
    Path(customer_id): Path<Uuid>,
) -> Result<Json<Customer>, AppError> {
    let customer = state
        .store
        .get_customer(&tenant.company_id, customer_id)
        .await
        .tracked()?
        .ok_or_else(|| AppError::not_found("Customer not found"))
        .tracked()?;
    Ok(Json(customer))
}

pub async fn delete_customer(
    State(state): State<AppState>,
    tenant: TenantContext,
    Path(customer_id): Path<Uuid>,
) -> Result<StatusCode, AppError> {
    if !state
        .store
        .deactivate_customer(&tenant.company_id, customer_id)
        .await
        .tracked()?
    {
        return Err(AppError::not_found("Customer not found"));
    }
    tracing::info!(customer_id = %customer_id, "Customer deactivated");
    Ok(StatusCode::NO_CONTENT)
}
