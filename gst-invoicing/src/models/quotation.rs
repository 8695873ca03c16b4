//! Quotation model for gst-invoicing.

use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use uuid::Uuid;

use super::{AuditEntry, PartySnapshot, PdfSnapshot};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ColumnType {
    #[default]
    Text,
    Number,
    Currency,
}

/// Tenant-defined column of a quotation table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QuotationColumn {
    pub key: String,
    pub label: String,
    #[serde(default, rename = "type")]
    pub column_type: ColumnType,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QuotationRow {
    pub values: BTreeMap<String, serde_json::Value>,
    pub total: Decimal,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum QuotationStatus {
    #[default]
    Draft,
    Approved,
    Rejected,
}

impl QuotationStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            QuotationStatus::Draft => "draft",
            QuotationStatus::Approved => "approved",
            QuotationStatus::Rejected => "rejected",
        }
    }
}

impl std::str::FromStr for QuotationStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "draft" => Ok(QuotationStatus::Draft),
            "approved" => Ok(QuotationStatus::Approved),
            "rejected" => Ok(QuotationStatus::Rejected),
            other => Err(format!("Invalid quotation status: {}", other)),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Quotation {
    #[serde(rename = "_id")]
    pub id: Uuid,
    pub company_id: String,
    pub quotation_no: String,
    pub quotation_date: NaiveDate,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub valid_until: Option<NaiveDate>,
    pub status: QuotationStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub customer_id: Option<Uuid>,
    pub customer: PartySnapshot,
    pub columns: Vec<QuotationColumn>,
    pub rows: Vec<QuotationRow>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub total_override: Option<Decimal>,
    pub total: Decimal,
    pub amount_in_words: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub terms: Option<String>,
    pub audit_log: Vec<AuditEntry>,
    #[serde(default)]
    pub pdf_snapshots: Vec<PdfSnapshot>,
    pub created_by: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Whitelisted fields written by a quotation edit.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct QuotationUpdate {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub customer_id: Option<Uuid>,
    pub customer: PartySnapshot,
    pub valid_until: Option<NaiveDate>,
    pub columns: Vec<QuotationColumn>,
    pub rows: Vec<QuotationRow>,
    pub total_override: Option<Decimal>,
    pub total: Decimal,
    pub amount_in_words: String,
    pub notes: Option<String>,
    pub terms: Option<String>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone)]
pub struct QuotationTransition {
    pub expected: QuotationStatus,
    pub status: QuotationStatus,
    pub audit: AuditEntry,
}

#[derive(Debug, Clone, Default)]
pub struct QuotationFilter {
    pub status: Option<QuotationStatus>,
    pub customer_id: Option<Uuid>,
    pub from: Option<NaiveDate>,
    pub to: Option<NaiveDate>,
}

impl QuotationFilter {
    pub fn matches(&self, quotation: &Quotation) -> bool {
        self.status.map_or(true, |s| quotation.status == s)
            && self
                .customer_id
                .map_or(true, |c| quotation.customer_id == Some(c))
            && self.from.map_or(true, |d| quotation.quotation_date >= d)
            && self.to.map_or(true, |d| quotation.quotation_date <= d)
    }
}
