//! Services module for gst-invoicing.

pub mod catalog;
pub mod invoicing;
pub mod metrics;
pub mod quotations;
pub mod reports;

pub use invoicing::InvoiceService;
pub use metrics::{get_metrics, init_metrics};
pub use quotations::QuotationService;
pub use reports::{ReportService, SalesReport};
