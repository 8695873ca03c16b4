//! Document store seam.
//!
//! Every read and write is scoped by `company_id`; a record owned by another
//! tenant is indistinguishable from a missing one.

mod memory;
mod mongo;

pub use memory::MemoryStore;
pub use mongo::MongoStore;

use async_trait::async_trait;
use serde::Serialize;
use service_core::error::AppError;
use uuid::Uuid;

use crate::models::{
    AuditEntry, Company, Customer, CustomerMatch, Invoice, InvoiceFilter, InvoiceTransition,
    InvoiceUpdate, PdfSnapshot, Product, ProductBackfill, Quotation, QuotationFilter,
    QuotationTransition, QuotationUpdate,
};

/// Sort order over a whitelisted camelCase document field.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Sort {
    pub field: &'static str,
    pub descending: bool,
}

#[derive(Debug, Clone)]
pub struct PageRequest {
    /// 1-based page number.
    pub page: u64,
    pub limit: u64,
    pub sort: Sort,
}

impl PageRequest {
    /// Rows before this page, saturating at the largest skip the database accepts.
    pub fn skip(&self) -> u64 {
        self.page
            .saturating_sub(1)
            .saturating_mul(self.limit)
            .min(i64::MAX as u64)
    }
}

/// `{items, total, page, limit}` list envelope.
#[derive(Debug, Clone, Serialize)]
pub struct Page<T> {
    pub items: Vec<T>,
    pub total: u64,
    pub page: u64,
    pub limit: u64,
}

/// Keyed counter whose increment-or-create is a single atomic store operation.
///
/// The first allocation for a key returns 1. Values are never handed out twice,
/// and a value allocated by a request that later fails is simply skipped.
#[async_trait]
pub trait SequenceAllocator: Send + Sync {
    async fn allocate(&self, key: &str) -> Result<i64, AppError>;
}

#[async_trait]
pub trait CompanyStore: Send + Sync {
    async fn get_company(&self, company_id: &str) -> Result<Option<Company>, AppError>;
    async fn upsert_company(&self, company: Company) -> Result<Company, AppError>;
}

/// Customer catalog. Lookups only see active customers.
///
/// Resolve-or-create is read-then-write: concurrent identical requests may each
/// create a row. Callers get at-least-one, not uniqueness.
#[async_trait]
pub trait CustomerStore: Send + Sync {
    async fn get_customer(&self, company_id: &str, id: Uuid) -> Result<Option<Customer>, AppError>;
    /// First active customer matching GSTIN, then email, then phone.
    async fn find_customer_by_contact(
        &self,
        company_id: &str,
        contact: &CustomerMatch,
    ) -> Result<Option<Customer>, AppError>;
    async fn insert_customer(&self, customer: Customer) -> Result<Customer, AppError>;
    async fn list_customers(
        &self,
        company_id: &str,
        search: Option<&str>,
        page: &PageRequest,
    ) -> Result<Page<Customer>, AppError>;
    async fn deactivate_customer(&self, company_id: &str, id: Uuid) -> Result<bool, AppError>;
}

#[async_trait]
pub trait ProductStore: Send + Sync {
    async fn get_product(&self, company_id: &str, id: Uuid) -> Result<Option<Product>, AppError>;
    /// Active product with this exact name and HSN code.
    async fn find_product(
        &self,
        company_id: &str,
        name: &str,
        hsn: &str,
    ) -> Result<Option<Product>, AppError>;
    async fn insert_product(&self, product: Product) -> Result<Product, AppError>;
    /// Set only the fields present in `backfill`.
    async fn backfill_product(
        &self,
        company_id: &str,
        id: Uuid,
        backfill: &ProductBackfill,
    ) -> Result<(), AppError>;
    async fn list_products(
        &self,
        company_id: &str,
        search: Option<&str>,
        page: &PageRequest,
    ) -> Result<Page<Product>, AppError>;
    async fn deactivate_product(&self, company_id: &str, id: Uuid) -> Result<bool, AppError>;
}

#[async_trait]
pub trait InvoiceStore: Send + Sync {
    async fn insert_invoice(&self, invoice: Invoice) -> Result<Invoice, AppError>;
    async fn get_invoice(&self, company_id: &str, id: Uuid) -> Result<Option<Invoice>, AppError>;
    async fn list_invoices(
        &self,
        company_id: &str,
        filter: &InvoiceFilter,
        page: &PageRequest,
    ) -> Result<Page<Invoice>, AppError>;
    /// Case-insensitive match on invoice number, buyer name or buyer GSTIN, newest first.
    async fn search_invoices(
        &self,
        company_id: &str,
        query: &str,
        limit: u64,
    ) -> Result<Vec<Invoice>, AppError>;
    /// All invoices matching `filter`, unpaginated, for reporting.
    async fn find_invoices(
        &self,
        company_id: &str,
        filter: &InvoiceFilter,
    ) -> Result<Vec<Invoice>, AppError>;
    /// Write the recomputed fields and append `audit`. `None` when the invoice is gone.
    async fn update_invoice(
        &self,
        company_id: &str,
        id: Uuid,
        update: &InvoiceUpdate,
        audit: AuditEntry,
    ) -> Result<Option<Invoice>, AppError>;
    /// Apply the transition if the stored status still equals `transition.expected`.
    async fn transition_invoice(
        &self,
        company_id: &str,
        id: Uuid,
        transition: InvoiceTransition,
    ) -> Result<Option<Invoice>, AppError>;
    /// Append a PDF snapshot if the invoice still has exactly `expected_count` of them.
    async fn append_invoice_pdf_snapshot(
        &self,
        company_id: &str,
        id: Uuid,
        expected_count: usize,
        snapshot: PdfSnapshot,
        audit: AuditEntry,
    ) -> Result<Option<Invoice>, AppError>;
}

#[async_trait]
pub trait QuotationStore: Send + Sync {
    async fn insert_quotation(&self, quotation: Quotation) -> Result<Quotation, AppError>;
    async fn get_quotation(
        &self,
        company_id: &str,
        id: Uuid,
    ) -> Result<Option<Quotation>, AppError>;
    async fn list_quotations(
        &self,
        company_id: &str,
        filter: &QuotationFilter,
        page: &PageRequest,
    ) -> Result<Page<Quotation>, AppError>;
    async fn search_quotations(
        &self,
        company_id: &str,
        query: &str,
        limit: u64,
    ) -> Result<Vec<Quotation>, AppError>;
    async fn update_quotation(
        &self,
        company_id: &str,
        id: Uuid,
        update: &QuotationUpdate,
        audit: AuditEntry,
    ) -> Result<Option<Quotation>, AppError>;
    async fn transition_quotation(
        &self,
        company_id: &str,
        id: Uuid,
        transition: QuotationTransition,
    ) -> Result<Option<Quotation>, AppError>;
    async fn append_quotation_pdf_snapshot(
        &self,
        company_id: &str,
        id: Uuid,
        expected_count: usize,
        snapshot: PdfSnapshot,
        audit: AuditEntry,
    ) -> Result<Option<Quotation>, AppError>;
}

/// Everything the billing core needs from persistence.
pub trait BillingStore:
    SequenceAllocator + CompanyStore + CustomerStore + ProductStore + InvoiceStore + QuotationStore
{
}

impl<T> BillingStore for T where
    T: SequenceAllocator
        + CompanyStore
        + CustomerStore
        + ProductStore
        + InvoiceStore
        + QuotationStore
{
}
