//! Quotation orchestration.

use chrono::Utc;
use rust_decimal::Decimal;
use serde_json::{json, Value};
use service_core::error::AppError;
use std::collections::{BTreeMap, HashSet};
use std::sync::Arc;
use tracing::{info, instrument};
use uuid::Uuid;
use validator::Validate;

use super::catalog::resolve_customer;
use super::metrics::{QUOTATIONS_TOTAL, SEQUENCE_ALLOCATIONS_TOTAL};
use crate::dtos::{
    CreateQuotationRequest, CustomerRef, PdfSnapshotRequest, UpdateQuotationRequest,
};
use crate::engine::lifecycle::{next_quotation_status, quotation_is_editable, QuotationAction};
use crate::engine::numbering::local_date;
use crate::engine::quotation::{build_rows, quotation_total};
use crate::engine::{amount_in_words, next_quotation_number, round_currency};
use crate::middleware::TenantContext;
use crate::models::{
    AuditAction, AuditEntry, PdfSnapshot, Quotation, QuotationColumn, QuotationFilter,
    QuotationStatus, QuotationTransition, QuotationUpdate,
};
use crate::store::{BillingStore, Page, PageRequest};

fn check_columns(columns: &[QuotationColumn]) -> Result<(), AppError> {
    let mut seen = HashSet::new();
    for column in columns {
        let key = column.key.trim();
        if key.is_empty() {
            return Err(AppError::bad_request("Quotation column keys cannot be empty"));
        }
        if !seen.insert(key) {
            return Err(AppError::bad_request(format!(
                "Duplicate quotation column '{}'",
                key
            )));
        }
    }
    Ok(())
}

fn check_override(total_override: Option<Decimal>) -> Result<(), AppError> {
    if total_override.is_some_and(|t| t < Decimal::ZERO) {
        return Err(AppError::bad_request("Quotation total cannot be negative"));
    }
    Ok(())
}

#[derive(Clone)]
pub struct QuotationService {
    store: Arc<dyn BillingStore>,
}

impl QuotationService {
    pub fn new(store: Arc<dyn BillingStore>) -> Self {
        Self { store }
    }

    async fn load(&self, tenant: &TenantContext, id: Uuid) -> Result<Quotation, AppError> {
        self.store
            .get_quotation(&tenant.company_id, id)
            .await?
            .ok_or_else(|| AppError::not_found("Quotation not found"))
    }

    #[instrument(skip(self, tenant, request), fields(company_id = %tenant.company_id))]
    pub async fn create(
        &self,
        tenant: &TenantContext,
        request: CreateQuotationRequest,
    ) -> Result<Quotation, AppError> {
        let company_id = tenant.company_id.as_str();
        check_columns(&request.columns)?;
        check_override(request.total_override)?;

        let rows = build_rows(&request.columns, request.rows)?;
        let total = quotation_total(&rows, request.total_override)?;
        let customer = resolve_customer(self.store.as_ref(), company_id, &request.customer).await?;

        let now = Utc::now();
        let quotation_no = next_quotation_number(self.store.as_ref(), company_id, now).await?;
        SEQUENCE_ALLOCATIONS_TOTAL
            .with_label_values(&["quotation"])
            .inc();

        let quotation = Quotation {
            id: Uuid::new_v4(),
            company_id: company_id.to_string(),
            quotation_no,
            quotation_date: request.quotation_date.unwrap_or_else(|| local_date(now)),
            valid_until: request.valid_until,
            status: QuotationStatus::Draft,
            customer_id: customer.customer_id,
            customer: customer.snapshot,
            columns: request.columns,
            rows,
            total_override: request.total_override,
            total,
            amount_in_words: amount_in_words(round_currency(total)),
            notes: request.notes,
            terms: request.terms,
            audit_log: vec![AuditEntry::new(AuditAction::Create, tenant.actor())],
            pdf_snapshots: Vec::new(),
            created_by: tenant.user_id.clone(),
            created_at: now,
            updated_at: now,
        };

        let quotation = self.store.insert_quotation(quotation).await?;
        QUOTATIONS_TOTAL.with_label_values(&["draft"]).inc();
        info!(
            quotation_id = %quotation.id,
            quotation_no = %quotation.quotation_no,
            total = %quotation.total,
            "Quotation created"
        );
        Ok(quotation)
    }

    pub async fn get(&self, tenant: &TenantContext, id: Uuid) -> Result<Quotation, AppError> {
        self.load(tenant, id).await
    }

    pub async fn list(
        &self,
        tenant: &TenantContext,
        filter: &QuotationFilter,
        page: &PageRequest,
    ) -> Result<Page<Quotation>, AppError> {
        self.store
            .list_quotations(&tenant.company_id, filter, page)
            .await
    }

    pub async fn search(
        &self,
        tenant: &TenantContext,
        query: &str,
        limit: u64,
    ) -> Result<Vec<Quotation>, AppError> {
        let query = query.trim();
        if query.is_empty() {
            return Ok(Vec::new());
        }
        self.store
            .search_quotations(&tenant.company_id, query, limit)
            .await
    }

    /// Partial edit. Row totals and the overall total are always recomputed.
    #[instrument(skip(self, tenant, request, raw), fields(company_id = %tenant.company_id))]
    pub async fn update(
        &self,
        tenant: &TenantContext,
        id: Uuid,
        request: UpdateQuotationRequest,
        raw: Value,
    ) -> Result<Quotation, AppError> {
        let company_id = tenant.company_id.as_str();
        let existing = self.load(tenant, id).await?;
        if !quotation_is_editable(existing.status) {
            return Err(AppError::bad_request(format!(
                "A {} quotation cannot be edited",
                existing.status.as_str()
            )));
        }

        let mut customer_id = None;
        let customer = match &request.customer {
            CustomerRef::ById(customer) => {
                let found = self
                    .store
                    .get_customer(company_id, *customer)
                    .await?
                    .ok_or_else(|| AppError::not_found("Customer not found"))?;
                customer_id = Some(found.id);
                found.snapshot()
            }
            CustomerRef::Inline(input) => input.details.merged_over(&existing.customer),
            CustomerRef::Unresolved => existing.customer.clone(),
        };

        let columns = request.columns.unwrap_or(existing.columns);
        check_columns(&columns)?;
        let values: Vec<BTreeMap<String, Value>> = match request.rows {
            Some(rows) => rows,
            None => existing.rows.into_iter().map(|row| row.values).collect(),
        };
        let rows = build_rows(&columns, values)?;

        let total_override = request.total_override.unwrap_or(existing.total_override);
        check_override(total_override)?;
        let total = quotation_total(&rows, total_override)?;

        let update = QuotationUpdate {
            customer_id,
            customer,
            valid_until: request.valid_until.or(existing.valid_until),
            columns,
            rows,
            total_override,
            total,
            amount_in_words: amount_in_words(round_currency(total)),
            notes: request.notes.or(existing.notes),
            terms: request.terms.or(existing.terms),
            updated_at: Utc::now(),
        };
        let audit = AuditEntry::new(AuditAction::Update, tenant.actor()).with_changes(raw);

        self.store
            .update_quotation(company_id, id, &update, audit)
            .await?
            .ok_or_else(|| AppError::not_found("Quotation not found"))
    }

    async fn transition(
        &self,
        tenant: &TenantContext,
        id: Uuid,
        action: QuotationAction,
    ) -> Result<Quotation, AppError> {
        let existing = self.load(tenant, id).await?;
        let status = next_quotation_status(existing.status, action)?;
        let transition = QuotationTransition {
            expected: existing.status,
            status,
            audit: AuditEntry::new(action.audit_action(), tenant.actor()),
        };

        let quotation = self
            .store
            .transition_quotation(&tenant.company_id, id, transition)
            .await?
            .ok_or_else(|| {
                AppError::Conflict(anyhow::anyhow!(
                    "Quotation {} changed while being updated; reload and retry",
                    existing.quotation_no
                ))
            })?;

        QUOTATIONS_TOTAL.with_label_values(&[status.as_str()]).inc();
        info!(quotation_id = %quotation.id, to = status.as_str(), "Quotation status changed");
        Ok(quotation)
    }

    #[instrument(skip(self, tenant), fields(company_id = %tenant.company_id))]
    pub async fn approve(&self, tenant: &TenantContext, id: Uuid) -> Result<Quotation, AppError> {
        self.transition(tenant, id, QuotationAction::Approve).await
    }

    #[instrument(skip(self, tenant), fields(company_id = %tenant.company_id))]
    pub async fn reject(&self, tenant: &TenantContext, id: Uuid) -> Result<Quotation, AppError> {
        self.transition(tenant, id, QuotationAction::Reject).await
    }

    #[instrument(skip(self, tenant, request), fields(company_id = %tenant.company_id))]
    pub async fn add_pdf_snapshot(
        &self,
        tenant: &TenantContext,
        id: Uuid,
        request: PdfSnapshotRequest,
    ) -> Result<Quotation, AppError> {
        request.validate()?;
        let existing = self.load(tenant, id).await?;
        let count = existing.pdf_snapshots.len();
        let snapshot = PdfSnapshot {
            version: count as u32 + 1,
            url: request.url,
            generator: request.generator.unwrap_or_else(|| "external".to_string()),
            created_at: Utc::now(),
        };
        let audit = AuditEntry::new(AuditAction::PdfSnapshot, tenant.actor())
            .with_changes(json!({ "version": snapshot.version }));

        self.store
            .append_quotation_pdf_snapshot(&tenant.company_id, id, count, snapshot, audit)
            .await?
            .ok_or_else(|| {
                AppError::Conflict(anyhow::anyhow!(
                    "Another PDF snapshot was recorded for quotation {}; retry",
                    existing.quotation_no
                ))
            })
    }
}
