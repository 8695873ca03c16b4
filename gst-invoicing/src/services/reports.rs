//! Cross-invoice sales reporting.

use chrono::NaiveDate;
use serde::Serialize;
use service_core::error::AppError;
use std::collections::BTreeMap;
use std::sync::Arc;
use tracing::instrument;

use crate::engine::{checked_total, hsn_summary};
use crate::models::{HsnSummaryRow, InvoiceFilter, InvoiceStatus, InvoiceTotals};
use crate::store::BillingStore;

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SalesReport {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub from: Option<NaiveDate>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub to: Option<NaiveDate>,
    /// Invoices contributing to the totals (void excluded).
    pub invoice_count: u64,
    /// Count per status over every invoice in range, void included.
    pub by_status: BTreeMap<String, u64>,
    #[serde(flatten)]
    pub totals: InvoiceTotals,
    pub hsn_summary: Vec<HsnSummaryRow>,
}

#[derive(Clone)]
pub struct ReportService {
    store: Arc<dyn BillingStore>,
}

impl ReportService {
    pub fn new(store: Arc<dyn BillingStore>) -> Self {
        Self { store }
    }

    /// Sum the tenant's non-void invoices dated within `[from, to]`.
    #[instrument(skip(self))]
    pub async fn sales(
        &self,
        company_id: &str,
        from: Option<NaiveDate>,
        to: Option<NaiveDate>,
    ) -> Result<SalesReport, AppError> {
        if let (Some(from), Some(to)) = (from, to) {
            if from > to {
                return Err(AppError::bad_request("'from' must not be after 'to'"));
            }
        }

        let filter = InvoiceFilter {
            from,
            to,
            ..Default::default()
        };
        let invoices = self.store.find_invoices(company_id, &filter).await?;

        let mut by_status = BTreeMap::new();
        let mut totals = InvoiceTotals::default();
        let mut rows: Vec<HsnSummaryRow> = Vec::new();
        let mut invoice_count = 0;

        for invoice in &invoices {
            *by_status
                .entry(invoice.status.as_str().to_string())
                .or_insert(0) += 1;
            if invoice.status == InvoiceStatus::Void {
                continue;
            }
            invoice_count += 1;
            let sum = &invoice.totals;
            totals.taxable_value = checked_total(totals.taxable_value, sum.taxable_value)?;
            totals.total_cgst = checked_total(totals.total_cgst, sum.total_cgst)?;
            totals.total_sgst = checked_total(totals.total_sgst, sum.total_sgst)?;
            totals.total_igst = checked_total(totals.total_igst, sum.total_igst)?;
            totals.total_tax = checked_total(totals.total_tax, sum.total_tax)?;
            totals.grand_total = checked_total(totals.grand_total, sum.grand_total)?;
            rows.extend(invoice.hsn_summary.iter().cloned());
        }

        Ok(SalesReport {
            from,
            to,
            invoice_count,
            by_status,
            totals,
            // Summary rows group exactly like lines, so regrouping merges across invoices.
            hsn_summary: hsn_summary(&rows)?,
        })
    }
}
