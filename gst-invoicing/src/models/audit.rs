//! Append-only audit and PDF snapshot records shared by invoices and quotations.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum AuditAction {
    Create,
    Update,
    Approve,
    Reject,
    MarkPaid,
    Void,
    PaymentStatus,
    PdfSnapshot,
}

impl AuditAction {
    pub fn as_str(&self) -> &'static str {
        match self {
            AuditAction::Create => "create",
            AuditAction::Update => "update",
            AuditAction::Approve => "approve",
            AuditAction::Reject => "reject",
            AuditAction::MarkPaid => "markPaid",
            AuditAction::Void => "void",
            AuditAction::PaymentStatus => "paymentStatus",
            AuditAction::PdfSnapshot => "pdfSnapshot",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AuditEntry {
    pub action: AuditAction,
    pub actor: String,
    pub at: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub changes: Option<serde_json::Value>,
}

impl AuditEntry {
    pub fn new(action: AuditAction, actor: impl Into<String>) -> Self {
        Self {
            action,
            actor: actor.into(),
            at: Utc::now(),
            changes: None,
        }
    }

    pub fn with_changes(mut self, changes: serde_json::Value) -> Self {
        self.changes = Some(changes);
        self
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PdfSnapshot {
    pub version: u32,
    pub url: String,
    pub generator: String,
    pub created_at: DateTime<Utc>,
}
