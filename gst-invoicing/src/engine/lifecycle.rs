//! Invoice and quotation status machines.
//!
//! Invoice: `draft → approved → paid`, with `void` reachable from `draft` or `approved`.
//! `paid` and `void` are terminal. Payment status moves freely between
//! `unpaid`, `partial` and `paid` unless the invoice is void.
//!
//! Quotation: `draft → approved` or `draft → rejected`; both outcomes are terminal.

use service_core::error::AppError;

use crate::models::{AuditAction, InvoiceStatus, PaymentStatus, QuotationStatus};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InvoiceAction {
    Approve,
    MarkPaid,
    Void,
}

impl InvoiceAction {
    pub fn audit_action(&self) -> AuditAction {
        match self {
            InvoiceAction::Approve => AuditAction::Approve,
            InvoiceAction::MarkPaid => AuditAction::MarkPaid,
            InvoiceAction::Void => AuditAction::Void,
        }
    }

    fn verb(&self) -> &'static str {
        match self {
            InvoiceAction::Approve => "approved",
            InvoiceAction::MarkPaid => "marked paid",
            InvoiceAction::Void => "voided",
        }
    }
}

/// Next status for `action`, or a client error naming the illegal transition.
pub fn next_invoice_status(
    current: InvoiceStatus,
    action: InvoiceAction,
) -> Result<InvoiceStatus, AppError> {
    use InvoiceStatus::*;

    match (current, action) {
        (Draft, InvoiceAction::Approve) => Ok(Approved),
        (Approved, InvoiceAction::MarkPaid) => Ok(Paid),
        (Draft | Approved, InvoiceAction::Void) => Ok(Void),
        (from, action) => Err(AppError::bad_request(format!(
            "A {} invoice cannot be {}",
            from.as_str(),
            action.verb()
        ))),
    }
}

/// Payment status may change unless the invoice is void.
pub fn check_payment_status_change(
    status: InvoiceStatus,
    payment_status: PaymentStatus,
) -> Result<(), AppError> {
    if status == InvoiceStatus::Void {
        return Err(AppError::bad_request(format!(
            "Payment status of a void invoice cannot be set to {}",
            payment_status.as_str()
        )));
    }
    Ok(())
}

/// Whether an invoice in `status` accepts field edits.
pub fn invoice_is_editable(status: InvoiceStatus) -> bool {
    status != InvoiceStatus::Void
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QuotationAction {
    Approve,
    Reject,
}

impl QuotationAction {
    pub fn audit_action(&self) -> AuditAction {
        match self {
            QuotationAction::Approve => AuditAction::Approve,
            QuotationAction::Reject => AuditAction::Reject,
        }
    }
}

pub fn next_quotation_status(
    current: QuotationStatus,
    action: QuotationAction,
) -> Result<QuotationStatus, AppError> {
    match (current, action) {
        (QuotationStatus::Draft, QuotationAction::Approve) => Ok(QuotationStatus::Approved),
        (QuotationStatus::Draft, QuotationAction::Reject) => Ok(QuotationStatus::Rejected),
        (from, _) => Err(AppError::bad_request(format!(
            "A {} quotation can no longer change status",
            from.as_str()
        ))),
    }
}

pub fn quotation_is_editable(status: QuotationStatus) -> bool {
    status != QuotationStatus::Rejected
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn happy_path_draft_to_paid() {
        let approved = next_invoice_status(InvoiceStatus::Draft, InvoiceAction::Approve).unwrap();
        assert_eq!(approved, InvoiceStatus::Approved);
        let paid = next_invoice_status(approved, InvoiceAction::MarkPaid).unwrap();
        assert_eq!(paid, InvoiceStatus::Paid);
    }

    #[test]
    fn void_is_reachable_from_draft_and_approved_only() {
        assert_eq!(
            next_invoice_status(InvoiceStatus::Draft, InvoiceAction::Void).unwrap(),
            InvoiceStatus::Void
        );
        assert_eq!(
            next_invoice_status(InvoiceStatus::Approved, InvoiceAction::Void).unwrap(),
            InvoiceStatus::Void
        );
        assert!(next_invoice_status(InvoiceStatus::Paid, InvoiceAction::Void).is_err());
    }

    #[test]
    fn terminal_states_reject_everything() {
        for action in [
            InvoiceAction::Approve,
            InvoiceAction::MarkPaid,
            InvoiceAction::Void,
        ] {
            assert!(next_invoice_status(InvoiceStatus::Void, action).is_err());
            assert!(next_invoice_status(InvoiceStatus::Paid, action).is_err());
        }
    }

    #[test]
    fn draft_cannot_skip_approval() {
        let err = next_invoice_status(InvoiceStatus::Draft, InvoiceAction::MarkPaid).unwrap_err();
        assert_eq!(err.to_string(), "Bad request: A draft invoice cannot be marked paid");
    }

    #[test]
    fn payment_status_is_blocked_only_when_void() {
        assert!(check_payment_status_change(InvoiceStatus::Draft, PaymentStatus::Partial).is_ok());
        assert!(check_payment_status_change(InvoiceStatus::Paid, PaymentStatus::Unpaid).is_ok());
        assert!(check_payment_status_change(InvoiceStatus::Void, PaymentStatus::Paid).is_err());
    }

    #[test]
    fn quotation_outcomes_are_terminal() {
        let approved =
            next_quotation_status(QuotationStatus::Draft, QuotationAction::Approve).unwrap();
        assert!(next_quotation_status(approved, QuotationAction::Reject).is_err());
        assert!(
            next_quotation_status(QuotationStatus::Rejected, QuotationAction::Approve).is_err()
        );
    }
}
