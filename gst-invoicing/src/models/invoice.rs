//! Invoice model for gst-invoicing.

use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::{AuditEntry, HsnSummaryRow, LineItem, PartySnapshot, PdfSnapshot};

/// Invoice type.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum InvoiceType {
    #[default]
    TaxInvoice,
    BillOfSupply,
    Proforma,
    CreditNote,
}

/// Invoice status.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum InvoiceStatus {
    #[default]
    Draft,
    Approved,
    Paid,
    Void,
}

impl InvoiceStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            InvoiceStatus::Draft => "draft",
            InvoiceStatus::Approved => "approved",
            InvoiceStatus::Paid => "paid",
            InvoiceStatus::Void => "void",
        }
    }
}

impl std::str::FromStr for InvoiceStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "draft" => Ok(InvoiceStatus::Draft),
            "approved" => Ok(InvoiceStatus::Approved),
            "paid" => Ok(InvoiceStatus::Paid),
            "void" => Ok(InvoiceStatus::Void),
            other => Err(format!("Invalid invoice status: {}", other)),
        }
    }
}

/// Payment status, tracked independently of [`InvoiceStatus`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum PaymentStatus {
    #[default]
    Unpaid,
    Partial,
    Paid,
}

impl PaymentStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            PaymentStatus::Unpaid => "unpaid",
            PaymentStatus::Partial => "partial",
            PaymentStatus::Paid => "paid",
        }
    }
}

impl std::str::FromStr for PaymentStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "unpaid" => Ok(PaymentStatus::Unpaid),
            "partial" => Ok(PaymentStatus::Partial),
            "paid" => Ok(PaymentStatus::Paid),
            other => Err(format!("Invalid payment status: {}", other)),
        }
    }
}

/// Aggregate monetary totals of an invoice.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InvoiceTotals {
    pub taxable_value: Decimal,
    pub total_cgst: Decimal,
    pub total_sgst: Decimal,
    pub total_igst: Decimal,
    pub total_tax: Decimal,
    pub grand_total: Decimal,
}

/// Editable invoice header fields.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InvoiceMeta {
    #[serde(default)]
    pub invoice_type: InvoiceType,
    pub invoice_date: NaiveDate,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub due_date: Option<NaiveDate>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub po_number: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub place_of_supply: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub place_of_delivery: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
}

/// Invoice document.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Invoice {
    #[serde(rename = "_id")]
    pub id: Uuid,
    pub company_id: String,
    pub invoice_no: String,
    #[serde(flatten)]
    pub meta: InvoiceMeta,
    pub status: InvoiceStatus,
    pub payment_status: PaymentStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub customer_id: Option<Uuid>,
    pub seller: PartySnapshot,
    pub buyer: PartySnapshot,
    pub ship_to: PartySnapshot,
    pub items: Vec<LineItem>,
    pub hsn_summary: Vec<HsnSummaryRow>,
    #[serde(flatten)]
    pub totals: InvoiceTotals,
    pub amount_in_words: String,
    pub audit_log: Vec<AuditEntry>,
    #[serde(default)]
    pub pdf_snapshots: Vec<PdfSnapshot>,
    pub created_by: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Recomputed fields written by an edit. Sequence, status and audit fields are absent on purpose.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct InvoiceUpdate {
    #[serde(flatten)]
    pub meta: InvoiceMeta,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub customer_id: Option<Uuid>,
    pub seller: PartySnapshot,
    pub buyer: PartySnapshot,
    pub ship_to: PartySnapshot,
    pub items: Vec<LineItem>,
    pub hsn_summary: Vec<HsnSummaryRow>,
    #[serde(flatten)]
    pub totals: InvoiceTotals,
    pub amount_in_words: String,
    pub updated_at: DateTime<Utc>,
}

/// A conditional status change: applied only while the stored status still equals `expected`.
#[derive(Debug, Clone)]
pub struct InvoiceTransition {
    pub expected: InvoiceStatus,
    pub status: InvoiceStatus,
    pub payment_status: Option<PaymentStatus>,
    pub audit: AuditEntry,
}

/// Filter parameters for listing invoices.
#[derive(Debug, Clone, Default)]
pub struct InvoiceFilter {
    pub status: Option<InvoiceStatus>,
    pub payment_status: Option<PaymentStatus>,
    pub customer_id: Option<Uuid>,
    pub from: Option<NaiveDate>,
    pub to: Option<NaiveDate>,
    pub exclude_void: bool,
}

impl InvoiceFilter {
    pub fn matches(&self, invoice: &Invoice) -> bool {
        self.status.map_or(true, |s| invoice.status == s)
            && self
                .payment_status
                .map_or(true, |p| invoice.payment_status == p)
            && self
                .customer_id
                .map_or(true, |c| invoice.customer_id == Some(c))
            && self.from.map_or(true, |d| invoice.meta.invoice_date >= d)
            && self.to.map_or(true, |d| invoice.meta.invoice_date <= d)
            && !(self.exclude_void && invoice.status == InvoiceStatus::Void)
    }
}
