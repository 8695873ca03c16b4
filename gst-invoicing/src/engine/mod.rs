//! Pure billing rules: tax split, line enrichment, numbering, totals and words.

use service_core::error::AppError;

pub mod lifecycle;
pub mod lines;
pub mod numbering;
pub mod quotation;
pub mod summary;
pub mod tax;
pub mod words;

pub use lines::{enrich_line, taxable_value, to_raw_line};
pub use numbering::{financial_year_label, next_invoice_number, next_quotation_number};
pub use summary::{checked_total, hsn_summary, invoice_totals, round_currency};
pub use tax::{split_tax, SupplyKind, TaxSplit};
pub use words::{amount_in_words, amount_in_words_str};

pub(crate) fn out_of_range() -> AppError {
    AppError::bad_request("Line amount out of range")
}
