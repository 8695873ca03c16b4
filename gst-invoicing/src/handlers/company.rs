//! Tenant company profile, used as the seller on every invoice.

use axum::{extract::State, Json};
use chrono::Utc;
use service_core::error::AppError;

use crate::{dtos::CompanyRequest, middleware::TenantContext, models::Company, AppState};

use super::Tracked;

pub async fn get_company(
    State(state): State<AppState>,
    tenant: TenantContext,
) -> Result<Json<Company>, AppError> {
    let company = state
        .store
        .get_company(&tenant.company_id)
        .await
        .tracked()?
        .ok_or_else(|| AppError::not_found("Company profile not found"))
        .tracked()?;
    Ok(Json(company))
}

/// Create or replace the profile. The state code is derived from the GSTIN when omitted.
pub async fn put_company(
    State(state): State<AppState>,
    tenant: TenantContext,
    Json(payload): Json<CompanyRequest>,
) -> Result<Json<Company>, AppError> {
    payload.check().tracked()?;

    let mut profile = payload.profile;
    profile.state_code = profile.effective_state_code();
    profile.gstin = profile.gstin.map(|g| g.trim().to_uppercase());

    tracing::info!(company_id = %tenant.company_id, "Saving company profile");

    let company = state
        .store
        .upsert_company(Company {
            company_id: tenant.company_id.clone(),
            profile,
            pan: payload.pan,
            bank_details: payload.bank_details,
            updated_at: Utc::now(),
        })
        .await
        .tracked()?;
    Ok(Json(company))
}
