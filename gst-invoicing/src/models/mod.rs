//! Domain models for gst-invoicing.

mod audit;
mod company;
mod customer;
mod invoice;
mod line_item;
mod party;
mod product;
mod quotation;

pub use audit::{AuditAction, AuditEntry, PdfSnapshot};
pub use company::{BankDetails, Company};
pub use customer::{Customer, CustomerMatch};
pub use invoice::{
    Invoice, InvoiceFilter, InvoiceMeta, InvoiceStatus, InvoiceTotals, InvoiceTransition,
    InvoiceType, InvoiceUpdate, PaymentStatus,
};
pub use line_item::{HsnSummaryRow, LineItem, LineItemInput, TaxableLine};
pub use party::PartySnapshot;
pub use product::{Product, ProductBackfill};
pub use quotation::{
    ColumnType, Quotation, QuotationColumn, QuotationFilter, QuotationRow, QuotationStatus,
    QuotationTransition, QuotationUpdate,
};
