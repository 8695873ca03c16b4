use axum::{
    extract::{Query, State},
    Json,
};
use chrono::NaiveDate;
use serde::Deserialize;
use service_core::error::AppError;

use crate::{middleware::TenantContext, services::SalesReport, AppState};

use super::Tracked;

#[derive(Debug, Default, Deserialize)]
pub struct SalesReportParams {
    pub from: Option<NaiveDate>,
    pub to: Option<NaiveDate>,
}

/// Totals over non-void invoices dated within the optional range.
pub async fn sales_report(
    State(state): State<AppState>,
    tenant: TenantContext,
    Query(params): Query<SalesReportParams>,
) -> Result<Json<SalesReport>, AppError> {
    let report = state
        .reports
        .sales(&tenant.company_id, params.from, params.to)
        .await
        .tracked()?;
    Ok(Json(report))
}
