//! Invoice orchestration: create, edit, status transitions and PDF snapshot records.

use chrono::Utc;
use serde_json::{json, Value};
use service_core::error::AppError;
use std::sync::Arc;
use tracing::{info, instrument};
use uuid::Uuid;
use validator::Validate;

use super::catalog::{resolve_customer, resolve_product};
use super::metrics::{INVOICES_TOTAL, SEQUENCE_ALLOCATIONS_TOTAL};
use crate::dtos::{CreateInvoiceRequest, CustomerRef, PdfSnapshotRequest, UpdateInvoiceRequest};
use crate::engine::lifecycle::{
    check_payment_status_change, invoice_is_editable, next_invoice_status, InvoiceAction,
};
use crate::engine::numbering::local_date;
use crate::engine::{
    amount_in_words, enrich_line, hsn_summary, invoice_totals, next_invoice_number,
    round_currency, to_raw_line,
};
use crate::middleware::TenantContext;
use crate::models::{
    AuditAction, AuditEntry, HsnSummaryRow, Invoice, InvoiceFilter, InvoiceStatus, InvoiceTotals,
    InvoiceTransition, InvoiceUpdate, LineItem, LineItemInput, PartySnapshot, PaymentStatus,
    PdfSnapshot,
};
use crate::store::{BillingStore, Page, PageRequest};

const DEFAULT_PDF_GENERATOR: &str = "external";

/// Lines plus everything derived from them.
struct Computed {
    items: Vec<LineItem>,
    hsn_summary: Vec<HsnSummaryRow>,
    totals: InvoiceTotals,
    amount_in_words: String,
}

fn compute(items: Vec<LineItem>) -> Result<Computed, AppError> {
    let totals = invoice_totals(&items)?;
    Ok(Computed {
        hsn_summary: hsn_summary(&items)?,
        amount_in_words: amount_in_words(round_currency(totals.grand_total)),
        totals,
        items,
    })
}

/// Ship-to defaults to the buyer field by field.
///
/// Its state comes from its own state code or GSTIN before the buyer's.
fn ship_to_snapshot(ship_to: Option<&PartySnapshot>, buyer: &PartySnapshot) -> PartySnapshot {
    match ship_to {
        Some(ship_to) => {
            let own_state = ship_to.effective_state_code();
            let mut merged = ship_to.merged_over(buyer);
            merged.state_code = own_state.or_else(|| merged.effective_state_code());
            merged
        }
        None => buyer.clone(),
    }
}

/// Place of supply: ship-to state when known, else the buyer's.
fn destination_state_code(ship_to: &PartySnapshot, buyer: &PartySnapshot) -> Option<String> {
    ship_to
        .effective_state_code()
        .or_else(|| buyer.effective_state_code())
}

fn check_items(items: &[LineItemInput]) -> Result<(), AppError> {
    if items.is_empty() {
        return Err(AppError::bad_request("At least one line item is required"));
    }
    for item in items {
        item.validate()?;
    }
    // Tax magnitude is the same for either split, so an unsplit preview bounds the amounts.
    let preview = items
        .iter()
        .map(|item| enrich_line(item, None, None, None))
        .collect::<Result<Vec<_>, _>>()?;
    invoice_totals(&preview)?;
    Ok(())
}

#[derive(Clone)]
pub struct InvoiceService {
    store: Arc<dyn BillingStore>,
}

impl InvoiceService {
    pub fn new(store: Arc<dyn BillingStore>) -> Self {
        Self { store }
    }

    /// Resolve products for raw lines and enrich them against the given states.
    async fn enrich_new_lines(
        &self,
        company_id: &str,
        lines: &[LineItemInput],
        seller_state_code: Option<&str>,
        dest_state_code: Option<&str>,
    ) -> Result<Vec<LineItem>, AppError> {
        let mut items = Vec::with_capacity(lines.len());
        for line in lines {
            let product_id = resolve_product(self.store.as_ref(), company_id, line).await?;
            items.push(enrich_line(
                line,
                product_id,
                seller_state_code,
                dest_state_code,
            )?);
        }
        Ok(items)
    }

    async fn load(&self, tenant: &TenantContext, id: Uuid) -> Result<Invoice, AppError> {
        self.store
            .get_invoice(&tenant.company_id, id)
            .await?
            .ok_or_else(|| AppError::not_found("Invoice not found"))
    }

    /// Build and persist a draft invoice.
    ///
    /// Input and company profile are checked before any catalog write or
    /// number allocation happens.
    #[instrument(skip(self, tenant, request), fields(company_id = %tenant.company_id))]
    pub async fn create(
        &self,
        tenant: &TenantContext,
        request: CreateInvoiceRequest,
    ) -> Result<Invoice, AppError> {
        let company_id = tenant.company_id.as_str();
        check_items(&request.items)?;

        let company = self
            .store
            .get_company(company_id)
            .await?
            .ok_or_else(|| AppError::bad_request("Company profile is not configured"))?;
        let seller = company.seller_snapshot();

        let customer = resolve_customer(self.store.as_ref(), company_id, &request.customer).await?;
        let buyer = customer.snapshot;
        let ship_to = ship_to_snapshot(request.ship_to.as_ref(), &buyer);
        let dest_state_code = destination_state_code(&ship_to, &buyer);

        let items = self
            .enrich_new_lines(
                company_id,
                &request.items,
                seller.state_code.as_deref(),
                dest_state_code.as_deref(),
            )
            .await?;
        let computed = compute(items)?;

        let now = Utc::now();
        let invoice_no = next_invoice_number(self.store.as_ref(), company_id, now).await?;
        SEQUENCE_ALLOCATIONS_TOTAL
            .with_label_values(&["invoice"])
            .inc();

        let invoice = Invoice {
            id: Uuid::new_v4(),
            company_id: company_id.to_string(),
            invoice_no,
            meta: request.meta.into_meta(local_date(now)),
            status: InvoiceStatus::Draft,
            payment_status: PaymentStatus::Unpaid,
            customer_id: customer.customer_id,
            seller,
            buyer,
            ship_to,
            items: computed.items,
            hsn_summary: computed.hsn_summary,
            totals: computed.totals,
            amount_in_words: computed.amount_in_words,
            audit_log: vec![AuditEntry::new(AuditAction::Create, tenant.actor())],
            pdf_snapshots: Vec::new(),
            created_by: tenant.user_id.clone(),
            created_at: now,
            updated_at: now,
        };

        let invoice = self.store.insert_invoice(invoice).await?;
        INVOICES_TOTAL.with_label_values(&["draft"]).inc();
        info!(
            invoice_id = %invoice.id,
            invoice_no = %invoice.invoice_no,
            grand_total = %invoice.totals.grand_total,
            "Invoice created"
        );
        Ok(invoice)
    }

    pub async fn get(&self, tenant: &TenantContext, id: Uuid) -> Result<Invoice, AppError> {
        self.load(tenant, id).await
    }

    pub async fn list(
        &self,
        tenant: &TenantContext,
        filter: &InvoiceFilter,
        page: &PageRequest,
    ) -> Result<Page<Invoice>, AppError> {
        self.store
            .list_invoices(&tenant.company_id, filter, page)
            .await
    }

    pub async fn search(
        &self,
        tenant: &TenantContext,
        query: &str,
        limit: u64,
    ) -> Result<Vec<Invoice>, AppError> {
        let query = query.trim();
        if query.is_empty() {
            return Ok(Vec::new());
        }
        self.store
            .search_invoices(&tenant.company_id, query, limit)
            .await
    }

    /// Apply a partial edit and recompute lines, tax split and totals.
    ///
    /// Without new `items` the stored lines are projected back to raw lines and
    /// re-enriched, so a changed buyer or ship-to state still flips the split.
    /// `raw` is recorded verbatim in the audit entry.
    #[instrument(skip(self, tenant, request, raw), fields(company_id = %tenant.company_id))]
    pub async fn update(
        &self,
        tenant: &TenantContext,
        id: Uuid,
        request: UpdateInvoiceRequest,
        raw: Value,
    ) -> Result<Invoice, AppError> {
        let company_id = tenant.company_id.as_str();
        let existing = self.load(tenant, id).await?;
        if !invoice_is_editable(existing.status) {
            return Err(AppError::bad_request(format!(
                "A {} invoice cannot be edited",
                existing.status.as_str()
            )));
        }
        if let Some(items) = &request.items {
            check_items(items)?;
        }

        let mut customer_id = None;
        let mut buyer = existing.buyer.clone();
        match &request.customer {
            CustomerRef::ById(customer) => {
                let found = self
                    .store
                    .get_customer(company_id, *customer)
                    .await?
                    .ok_or_else(|| AppError::not_found("Customer not found"))?;
                buyer = found.snapshot();
                customer_id = Some(found.id);
            }
            CustomerRef::Inline(input) => buyer = input.details.merged_over(&buyer),
            CustomerRef::Unresolved => {}
        }
        if let Some(patch) = &request.buyer {
            buyer = patch.merged_over(&buyer);
        }

        // A ship-to that was defaulted from the buyer keeps following it.
        let ship_to = match &request.ship_to {
            Some(patch) => ship_to_snapshot(Some(patch), &existing.ship_to),
            None if existing.ship_to == existing.buyer => buyer.clone(),
            None => existing.ship_to.clone(),
        };
        let seller = match &request.seller {
            Some(patch) => patch.merged_over(&existing.seller),
            None => existing.seller.clone(),
        };

        let seller_state_code = seller.effective_state_code();
        let dest_state_code = destination_state_code(&ship_to, &buyer);

        let items = match &request.items {
            Some(lines) => {
                self.enrich_new_lines(
                    company_id,
                    lines,
                    seller_state_code.as_deref(),
                    dest_state_code.as_deref(),
                )
                .await?
            }
            None => existing
                .items
                .iter()
                .map(|line| -> Result<LineItem, AppError> {
                    let raw_line = to_raw_line(line)?;
                    enrich_line(
                        &raw_line,
                        raw_line.product_id,
                        seller_state_code.as_deref(),
                        dest_state_code.as_deref(),
                    )
                })
                .collect::<Result<Vec<_>, _>>()?,
        };
        let computed = compute(items)?;

        let update = InvoiceUpdate {
            meta: request.meta.applied_to(existing.meta.clone()),
            customer_id,
            seller,
            buyer,
            ship_to,
            items: computed.items,
            hsn_summary: computed.hsn_summary,
            totals: computed.totals,
            amount_in_words: computed.amount_in_words,
            updated_at: Utc::now(),
        };
        let audit = AuditEntry::new(AuditAction::Update, tenant.actor()).with_changes(raw);

        let invoice = self
            .store
            .update_invoice(company_id, id, &update, audit)
            .await?
            .ok_or_else(|| AppError::not_found("Invoice not found"))?;
        info!(invoice_id = %invoice.id, grand_total = %invoice.totals.grand_total, "Invoice updated");
        Ok(invoice)
    }

    async fn transition(
        &self,
        tenant: &TenantContext,
        id: Uuid,
        action: InvoiceAction,
    ) -> Result<Invoice, AppError> {
        let existing = self.load(tenant, id).await?;
        let status = next_invoice_status(existing.status, action)?;
        let transition = InvoiceTransition {
            expected: existing.status,
            status,
            payment_status: (action == InvoiceAction::MarkPaid).then_some(PaymentStatus::Paid),
            audit: AuditEntry::new(action.audit_action(), tenant.actor()),
        };

        let invoice = self
            .store
            .transition_invoice(&tenant.company_id, id, transition)
            .await?
            .ok_or_else(|| {
                AppError::Conflict(anyhow::anyhow!(
                    "Invoice {} changed while being updated; reload and retry",
                    existing.invoice_no
                ))
            })?;

        INVOICES_TOTAL.with_label_values(&[status.as_str()]).inc();
        info!(
            invoice_id = %invoice.id,
            from = existing.status.as_str(),
            to = status.as_str(),
            "Invoice status changed"
        );
        Ok(invoice)
    }

    #[instrument(skip(self, tenant), fields(company_id = %tenant.company_id))]
    pub async fn approve(&self, tenant: &TenantContext, id: Uuid) -> Result<Invoice, AppError> {
        self.transition(tenant, id, InvoiceAction::Approve).await
    }

    /// Approved to paid; payment status follows.
    #[instrument(skip(self, tenant), fields(company_id = %tenant.company_id))]
    pub async fn mark_paid(&self, tenant: &TenantContext, id: Uuid) -> Result<Invoice, AppError> {
        self.transition(tenant, id, InvoiceAction::MarkPaid).await
    }

    #[instrument(skip(self, tenant), fields(company_id = %tenant.company_id))]
    pub async fn void(&self, tenant: &TenantContext, id: Uuid) -> Result<Invoice, AppError> {
        self.transition(tenant, id, InvoiceAction::Void).await
    }

    #[instrument(skip(self, tenant), fields(company_id = %tenant.company_id))]
    pub async fn set_payment_status(
        &self,
        tenant: &TenantContext,
        id: Uuid,
        payment_status: PaymentStatus,
    ) -> Result<Invoice, AppError> {
        let existing = self.load(tenant, id).await?;
        check_payment_status_change(existing.status, payment_status)?;

        let transition = InvoiceTransition {
            expected: existing.status,
            status: existing.status,
            payment_status: Some(payment_status),
            audit: AuditEntry::new(AuditAction::PaymentStatus, tenant.actor())
                .with_changes(json!({ "paymentStatus": payment_status.as_str() })),
        };

        self.store
            .transition_invoice(&tenant.company_id, id, transition)
            .await?
            .ok_or_else(|| {
                AppError::Conflict(anyhow::anyhow!(
                    "Invoice {} changed while being updated; reload and retry",
                    existing.invoice_no
                ))
            })
    }

    /// Record a rendered PDF. Versions count up from 1.
    #[instrument(skip(self, tenant, request), fields(company_id = %tenant.company_id))]
    pub async fn add_pdf_snapshot(
        &self,
        tenant: &TenantContext,
        id: Uuid,
        request: PdfSnapshotRequest,
    ) -> Result<Invoice, AppError> {
        request.validate()?;
        let existing = self.load(tenant, id).await?;
        let count = existing.pdf_snapshots.len();
        let snapshot = PdfSnapshot {
            version: count as u32 + 1,
            url: request.url,
            generator: request
                .generator
                .unwrap_or_else(|| DEFAULT_PDF_GENERATOR.to_string()),
            created_at: Utc::now(),
        };
        let audit = AuditEntry::new(AuditAction::PdfSnapshot, tenant.actor())
            .with_changes(json!({ "version": snapshot.version }));

        self.store
            .append_invoice_pdf_snapshot(&tenant.company_id, id, count, snapshot, audit)
            .await?
            .ok_or_else(|| {
                AppError::Conflict(anyhow::anyhow!(
                    "Another PDF snapshot was recorded for invoice {}; retry",
                    existing.invoice_no
                ))
            })
    }
}
