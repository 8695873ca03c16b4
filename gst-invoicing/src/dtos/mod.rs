//! Request and query shapes for the REST surface.

mod catalog;
mod invoices;
mod quotations;

pub use catalog::{CompanyRequest, CreateCustomerRequest, CreateProductRequest};
pub use invoices::{
    CreateInvoiceRequest, CustomerInput, CustomerRef, InvoiceListParams, InvoiceMetaInput,
    PaymentStatusRequest, PdfSnapshotRequest, UpdateInvoiceRequest,
};
pub use quotations::{CreateQuotationRequest, QuotationListParams, UpdateQuotationRequest};

use serde::Deserialize;
use service_core::error::AppError;

use crate::store::{PageRequest, Sort};

pub const DEFAULT_PAGE_SIZE: u64 = 20;
pub const MAX_PAGE_SIZE: u64 = 100;
/// Search endpoints return at most this many documents, without paging metadata.
pub const SEARCH_LIMIT: u64 = 50;

/// `page`, `limit` and `sort` query parameters shared by list endpoints.
///
/// `sort` names a whitelisted field; a leading `-` sorts descending.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Pagination {
    pub page: Option<u64>,
    pub limit: Option<u64>,
    pub sort: Option<String>,
}

impl Pagination {
    pub fn page_request(
        &self,
        allowed: &[&'static str],
        default_sort: Sort,
    ) -> Result<PageRequest, AppError> {
        let sort = match self.sort.as_deref().map(str::trim).filter(|s| !s.is_empty()) {
            None => default_sort,
            Some(raw) => {
                let (name, descending) = match raw.strip_prefix('-') {
                    Some(name) => (name, true),
                    None => (raw, false),
                };
                let field = allowed
                    .iter()
                    .copied()
                    .find(|f| *f == name)
                    .ok_or_else(|| AppError::bad_request(format!("Cannot sort by '{}'", name)))?;
                Sort { field, descending }
            }
        };

        Ok(PageRequest {
            page: self.page.unwrap_or(1).max(1),
            limit: self.limit.unwrap_or(DEFAULT_PAGE_SIZE).clamp(1, MAX_PAGE_SIZE),
            sort,
        })
    }
}

/// `q` plus pagination, for catalog listings.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct CatalogListParams {
    pub q: Option<String>,
    pub page: Option<u64>,
    pub limit: Option<u64>,
    pub sort: Option<String>,
}

impl CatalogListParams {
    pub fn pagination(&self) -> Pagination {
        Pagination {
            page: self.page,
            limit: self.limit,
            sort: self.sort.clone(),
        }
    }

    pub fn search(&self) -> Option<&str> {
        self.q.as_deref().map(str::trim).filter(|q| !q.is_empty())
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct SearchParams {
    #[serde(default)]
    pub q: String,
}

/// Parse an optional query enum, reporting unknown values as client errors.
pub(crate) fn parse_enum<T>(value: Option<&str>) -> Result<Option<T>, AppError>
where
    T: std::str::FromStr<Err = String>,
{
    value
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(|v| v.parse::<T>().map_err(AppError::bad_request))
        .transpose()
}
