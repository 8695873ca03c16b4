//! In-memory implementation of the billing store for tests and local development.

use async_trait::async_trait;
use chrono::Utc;
use dashmap::DashMap;
use service_core::error::AppError;
use std::cmp::Ordering;
use std::collections::HashMap;
use std::sync::{Arc, RwLock};
use uuid::Uuid;

use super::{
    CompanyStore, CustomerStore, InvoiceStore, Page, PageRequest, ProductStore, QuotationStore,
    SequenceAllocator, Sort,
};
use crate::models::{
    AuditEntry, Company, Customer, CustomerMatch, Invoice, InvoiceFilter, InvoiceTransition,
    InvoiceUpdate, PartySnapshot, PdfSnapshot, Product, ProductBackfill, Quotation,
    QuotationFilter, QuotationTransition, QuotationUpdate,
};

fn lock_error(e: impl std::fmt::Display) -> AppError {
    AppError::InternalError(anyhow::anyhow!("Failed to acquire store lock: {}", e))
}

fn contains_ci(haystack: Option<&str>, needle: &str) -> bool {
    haystack.is_some_and(|h| h.to_lowercase().contains(needle))
}

fn eq_ci(value: &Option<String>, expected: &str) -> bool {
    value
        .as_deref()
        .is_some_and(|v| v.trim().eq_ignore_ascii_case(expected))
}

fn paginate<T>(mut items: Vec<T>, page: &PageRequest) -> Page<T> {
    let total = items.len() as u64;
    let skip = page.skip().min(total) as usize;
    let items: Vec<T> = items.drain(skip..).take(page.limit as usize).collect();
    Page {
        items,
        total,
        page: page.page,
        limit: page.limit,
    }
}

fn directed(ordering: Ordering, sort: &Sort) -> Ordering {
    if sort.descending {
        ordering.reverse()
    } else {
        ordering
    }
}

fn compare_invoices(a: &Invoice, b: &Invoice, sort: &Sort) -> Ordering {
    let ordering = match sort.field {
        "invoiceDate" => a.meta.invoice_date.cmp(&b.meta.invoice_date),
        "invoiceNo" => a.invoice_no.cmp(&b.invoice_no),
        "grandTotal" => a.totals.grand_total.cmp(&b.totals.grand_total),
        _ => a.created_at.cmp(&b.created_at),
    };
    directed(ordering, sort)
}

fn compare_quotations(a: &Quotation, b: &Quotation, sort: &Sort) -> Ordering {
    let ordering = match sort.field {
        "quotationDate" => a.quotation_date.cmp(&b.quotation_date),
        "quotationNo" => a.quotation_no.cmp(&b.quotation_no),
        "total" => a.total.cmp(&b.total),
        _ => a.created_at.cmp(&b.created_at),
    };
    directed(ordering, sort)
}

fn party_matches(party: &PartySnapshot, needle: &str) -> bool {
    contains_ci(party.name.as_deref(), needle)
        || contains_ci(party.gstin.as_deref(), needle)
        || contains_ci(party.email.as_deref(), needle)
        || contains_ci(party.phone.as_deref(), needle)
}

/// Billing store held in process memory.
///
/// Counters live in a `DashMap` so increment-or-create happens under one shard
/// lock. Documents are kept in `RwLock`-guarded maps.
#[derive(Clone, Default)]
pub struct MemoryStore {
    counters: Arc<DashMap<String, i64>>,
    companies: Arc<RwLock<HashMap<String, Company>>>,
    customers: Arc<RwLock<HashMap<Uuid, Customer>>>,
    products: Arc<RwLock<HashMap<Uuid, Product>>>,
    invoices: Arc<RwLock<HashMap<Uuid, Invoice>>>,
    quotations: Arc<RwLock<HashMap<Uuid, Quotation>>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl SequenceAllocator for MemoryStore {
    async fn allocate(&self, key: &str) -> Result<i64, AppError> {
        let mut counter = self.counters.entry(key.to_string()).or_insert(0);
        *counter += 1;
        Ok(*counter)
    }
}

#[async_trait]
impl CompanyStore for MemoryStore {
    async fn get_company(&self, company_id: &str) -> Result<Option<Company>, AppError> {
        let companies = self.companies.read().map_err(lock_error)?;
        Ok(companies.get(company_id).cloned())
    }

    async fn upsert_company(&self, company: Company) -> Result<Company, AppError> {
        let mut companies = self.companies.write().map_err(lock_error)?;
        companies.insert(company.company_id.clone(), company.clone());
        Ok(company)
    }
}

#[async_trait]
impl CustomerStore for MemoryStore {
    async fn get_customer(&self, company_id: &str, id: Uuid) -> Result<Option<Customer>, AppError> {
        let customers = self.customers.read().map_err(lock_error)?;
        Ok(customers
            .get(&id)
            .filter(|c| c.company_id == company_id && c.is_active)
            .cloned())
    }

    async fn find_customer_by_contact(
        &self,
        company_id: &str,
        contact: &CustomerMatch,
    ) -> Result<Option<Customer>, AppError> {
        let customers = self.customers.read().map_err(lock_error)?;
        let mut active: Vec<&Customer> = customers
            .values()
            .filter(|c| c.company_id == company_id && c.is_active)
            .collect();
        active.sort_by_key(|c| c.created_at);

        let by_gstin = contact
            .gstin
            .as_deref()
            .and_then(|g| active.iter().find(|c| eq_ci(&c.details.gstin, g)));
        let by_email = || {
            contact
                .email
                .as_deref()
                .and_then(|e| active.iter().find(|c| eq_ci(&c.details.email, e)))
        };
        let by_phone = || {
            contact.phone.as_deref().and_then(|p| {
                active
                    .iter()
                    .find(|c| c.details.phone.as_deref().map(str::trim) == Some(p))
            })
        };

        Ok(by_gstin
            .or_else(by_email)
            .or_else(by_phone)
            .map(|c| (*c).clone()))
    }

    async fn insert_customer(&self, customer: Customer) -> Result<Customer, AppError> {
        let mut customers = self.customers.write().map_err(lock_error)?;
        customers.insert(customer.id, customer.clone());
        Ok(customer)
    }

    async fn list_customers(
        &self,
        company_id: &str,
        search: Option<&str>,
        page: &PageRequest,
    ) -> Result<Page<Customer>, AppError> {
        let needle = search.map(str::to_lowercase);
        let customers = self.customers.read().map_err(lock_error)?;
        let mut items: Vec<Customer> = customers
            .values()
            .filter(|c| c.company_id == company_id && c.is_active)
            .filter(|c| {
                needle
                    .as_deref()
                    .map_or(true, |n| party_matches(&c.details, n))
            })
            .cloned()
            .collect();

        items.sort_by(|a, b| {
            let ordering = match page.sort.field {
                "name" => a.details.name.cmp(&b.details.name),
                _ => a.created_at.cmp(&b.created_at),
            };
            directed(ordering, &page.sort)
        });
        Ok(paginate(items, page))
    }

    async fn deactivate_customer(&self, company_id: &str, id: Uuid) -> Result<bool, AppError> {
        let mut customers = self.customers.write().map_err(lock_error)?;
        match customers.get_mut(&id) {
            Some(c) if c.company_id == company_id && c.is_active => {
                c.is_active = false;
                c.updated_at = Utc::now();
                Ok(true)
            }
            _ => Ok(false),
        }
    }
}

#[async_trait]
impl ProductStore for MemoryStore {
    async fn get_product(&self, company_id: &str, id: Uuid) -> Result<Option<Product>, AppError> {
        let products = self.products.read().map_err(lock_error)?;
        Ok(products
            .get(&id)
            .filter(|p| p.company_id == company_id && p.is_active)
            .cloned())
    }

    async fn find_product(
        &self,
        company_id: &str,
        name: &str,
        hsn: &str,
    ) -> Result<Option<Product>, AppError> {
        let products = self.products.read().map_err(lock_error)?;
        let mut matches: Vec<&Product> = products
            .values()
            .filter(|p| {
                p.company_id == company_id && p.is_active && p.name == name && p.hsn == hsn
            })
            .collect();
        matches.sort_by_key(|p| p.created_at);
        Ok(matches.first().map(|p| (*p).clone()))
    }

    async fn insert_product(&self, product: Product) -> Result<Product, AppError> {
        let mut products = self.products.write().map_err(lock_error)?;
        products.insert(product.id, product.clone());
        Ok(product)
    }

    async fn backfill_product(
        &self,
        company_id: &str,
        id: Uuid,
        backfill: &ProductBackfill,
    ) -> Result<(), AppError> {
        let mut products = self.products.write().map_err(lock_error)?;
        if let Some(product) = products
            .get_mut(&id)
            .filter(|p| p.company_id == company_id)
        {
            product.apply_backfill(backfill);
        }
        Ok(())
    }

    async fn list_products(
        &self,
        company_id: &str,
        search: Option<&str>,
        page: &PageRequest,
    ) -> Result<Page<Product>, AppError> {
        let needle = search.map(str::to_lowercase);
        let products = self.products.read().map_err(lock_error)?;
        let mut items: Vec<Product> = products
            .values()
            .filter(|p| p.company_id == company_id && p.is_active)
            .filter(|p| {
                needle.as_deref().map_or(true, |n| {
                    p.name.to_lowercase().contains(n) || p.hsn.to_lowercase().contains(n)
                })
            })
            .cloned()
            .collect();

        items.sort_by(|a, b| {
            let ordering = match page.sort.field {
                "name" => a.name.cmp(&b.name),
                _ => a.created_at.cmp(&b.created_at),
            };
            directed(ordering, &page.sort)
        });
        Ok(paginate(items, page))
    }

    async fn deactivate_product(&self, company_id: &str, id: Uuid) -> Result<bool, AppError> {
        let mut products = self.products.write().map_err(lock_error)?;
        match products.get_mut(&id) {
            Some(p) if p.company_id == company_id && p.is_active => {
                p.is_active = false;
                p.updated_at = Utc::now();
                Ok(true)
            }
            _ => Ok(false),
        }
    }
}

#[async_trait]
impl InvoiceStore for MemoryStore {
    async fn insert_invoice(&self, invoice: Invoice) -> Result<Invoice, AppError> {
        let mut invoices = self.invoices.write().map_err(lock_error)?;
        let duplicate = invoices
            .values()
            .any(|i| i.company_id == invoice.company_id && i.invoice_no == invoice.invoice_no);
        if duplicate {
            return Err(AppError::Conflict(anyhow::anyhow!(
                "Invoice number {} already exists",
                invoice.invoice_no
            )));
        }
        invoices.insert(invoice.id, invoice.clone());
        Ok(invoice)
    }

    async fn get_invoice(&self, company_id: &str, id: Uuid) -> Result<Option<Invoice>, AppError> {
        let invoices = self.invoices.read().map_err(lock_error)?;
        Ok(invoices
            .get(&id)
            .filter(|i| i.company_id == company_id)
            .cloned())
    }

    async fn list_invoices(
        &self,
        company_id: &str,
        filter: &InvoiceFilter,
        page: &PageRequest,
    ) -> Result<Page<Invoice>, AppError> {
        let mut items = self.find_invoices(company_id, filter).await?;
        items.sort_by(|a, b| compare_invoices(a, b, &page.sort));
        Ok(paginate(items, page))
    }

    async fn search_invoices(
        &self,
        company_id: &str,
        query: &str,
        limit: u64,
    ) -> Result<Vec<Invoice>, AppError> {
        let needle = query.to_lowercase();
        let invoices = self.invoices.read().map_err(lock_error)?;
        let mut items: Vec<Invoice> = invoices
            .values()
            .filter(|i| i.company_id == company_id)
            .filter(|i| {
                i.invoice_no.to_lowercase().contains(&needle)
                    || contains_ci(i.buyer.name.as_deref(), &needle)
                    || contains_ci(i.buyer.gstin.as_deref(), &needle)
            })
            .cloned()
            .collect();
        items.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        items.truncate(limit as usize);
        Ok(items)
    }

    async fn find_invoices(
        &self,
        company_id: &str,
        filter: &InvoiceFilter,
    ) -> Result<Vec<Invoice>, AppError> {
        let invoices = self.invoices.read().map_err(lock_error)?;
        Ok(invoices
            .values()
            .filter(|i| i.company_id == company_id && filter.matches(i))
            .cloned()
            .collect())
    }

    async fn update_invoice(
        &self,
        company_id: &str,
        id: Uuid,
        update: &InvoiceUpdate,
        audit: AuditEntry,
    ) -> Result<Option<Invoice>, AppError> {
        let mut invoices = self.invoices.write().map_err(lock_error)?;
        let Some(invoice) = invoices
            .get_mut(&id)
            .filter(|i| i.company_id == company_id)
        else {
            return Ok(None);
        };

        invoice.meta = update.meta.clone();
        if let Some(customer_id) = update.customer_id {
            invoice.customer_id = Some(customer_id);
        }
        invoice.seller = update.seller.clone();
        invoice.buyer = update.buyer.clone();
        invoice.ship_to = update.ship_to.clone();
        invoice.items = update.items.clone();
        invoice.hsn_summary = update.hsn_summary.clone();
        invoice.totals = update.totals.clone();
        invoice.amount_in_words = update.amount_in_words.clone();
        invoice.updated_at = update.updated_at;
        invoice.audit_log.push(audit);
        Ok(Some(invoice.clone()))
    }

    async fn transition_invoice(
        &self,
        company_id: &str,
        id: Uuid,
        transition: InvoiceTransition,
    ) -> Result<Option<Invoice>, AppError> {
        let mut invoices = self.invoices.write().map_err(lock_error)?;
        let Some(invoice) = invoices
            .get_mut(&id)
            .filter(|i| i.company_id == company_id && i.status == transition.expected)
        else {
            return Ok(None);
        };

        invoice.status = transition.status;
        if let Some(payment_status) = transition.payment_status {
            invoice.payment_status = payment_status;
        }
        invoice.updated_at = transition.audit.at;
        invoice.audit_log.push(transition.audit);
        Ok(Some(invoice.clone()))
    }

    async fn append_invoice_pdf_snapshot(
        &self,
        company_id: &str,
        id: Uuid,
        expected_count: usize,
        snapshot: PdfSnapshot,
        audit: AuditEntry,
    ) -> Result<Option<Invoice>, AppError> {
        let mut invoices = self.invoices.write().map_err(lock_error)?;
        let Some(invoice) = invoices.get_mut(&id).filter(|i| {
            i.company_id == company_id && i.pdf_snapshots.len() == expected_count
        }) else {
            return Ok(None);
        };

        invoice.pdf_snapshots.push(snapshot);
        invoice.updated_at = audit.at;
        invoice.audit_log.push(audit);
        Ok(Some(invoice.clone()))
    }
}

#[async_trait]
impl QuotationStore for MemoryStore {
    async fn insert_quotation(&self, quotation: Quotation) -> Result<Quotation, AppError> {
        let mut quotations = self.quotations.write().map_err(lock_error)?;
        quotations.insert(quotation.id, quotation.clone());
        Ok(quotation)
    }

    async fn get_quotation(
        &self,
        company_id: &str,
        id: Uuid,
    ) -> Result<Option<Quotation>, AppError> {
        let quotations = self.quotations.read().map_err(lock_error)?;
        Ok(quotations
            .get(&id)
            .filter(|q| q.company_id == company_id)
            .cloned())
    }

    async fn list_quotations(
        &self,
        company_id: &str,
        filter: &QuotationFilter,
        page: &PageRequest,
    ) -> Result<Page<Quotation>, AppError> {
        let quotations = self.quotations.read().map_err(lock_error)?;
        let mut items: Vec<Quotation> = quotations
            .values()
            .filter(|q| q.company_id == company_id && filter.matches(q))
            .cloned()
            .collect();
        items.sort_by(|a, b| compare_quotations(a, b, &page.sort));
        Ok(paginate(items, page))
    }

    async fn search_quotations(
        &self,
        company_id: &str,
        query: &str,
        limit: u64,
    ) -> Result<Vec<Quotation>, AppError> {
        let needle = query.to_lowercase();
        let quotations = self.quotations.read().map_err(lock_error)?;
        let mut items: Vec<Quotation> = quotations
            .values()
            .filter(|q| q.company_id == company_id)
            .filter(|q| {
                q.quotation_no.to_lowercase().contains(&needle)
                    || contains_ci(q.customer.name.as_deref(), &needle)
            })
            .cloned()
            .collect();
        items.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        items.truncate(limit as usize);
        Ok(items)
    }

    async fn update_quotation(
        &self,
        company_id: &str,
        id: Uuid,
        update: &QuotationUpdate,
        audit: AuditEntry,
    ) -> Result<Option<Quotation>, AppError> {
        let mut quotations = self.quotations.write().map_err(lock_error)?;
        let Some(quotation) = quotations
            .get_mut(&id)
            .filter(|q| q.company_id == company_id)
        else {
            return Ok(None);
        };

        if let Some(customer_id) = update.customer_id {
            quotation.customer_id = Some(customer_id);
        }
        quotation.customer = update.customer.clone();
        quotation.valid_until = update.valid_until;
        quotation.columns = update.columns.clone();
        quotation.rows = update.rows.clone();
        quotation.total_override = update.total_override;
        quotation.total = update.total;
        quotation.amount_in_words = update.amount_in_words.clone();
        quotation.notes = update.notes.clone();
        quotation.terms = update.terms.clone();
        quotation.updated_at = update.updated_at;
        quotation.audit_log.push(audit);
        Ok(Some(quotation.clone()))
    }

    async fn transition_quotation(
        &self,
        company_id: &str,
        id: Uuid,
        transition: QuotationTransition,
    ) -> Result<Option<Quotation>, AppError> {
        let mut quotations = self.quotations.write().map_err(lock_error)?;
        let Some(quotation) = quotations
            .get_mut(&id)
            .filter(|q| q.company_id == company_id && q.status == transition.expected)
        else {
            return Ok(None);
        };

        quotation.status = transition.status;
        quotation.updated_at = transition.audit.at;
        quotation.audit_log.push(transition.audit);
        Ok(Some(quotation.clone()))
    }

    async fn append_quotation_pdf_snapshot(
        &self,
        company_id: &str,
        id: Uuid,
        expected_count: usize,
        snapshot: PdfSnapshot,
        audit: AuditEntry,
    ) -> Result<Option<Quotation>, AppError> {
        let mut quotations = self.quotations.write().map_err(lock_error)?;
        let Some(quotation) = quotations.get_mut(&id).filter(|q| {
            q.company_id == company_id && q.pdf_snapshots.len() == expected_count
        }) else {
            return Ok(None);
        };

        quotation.pdf_snapshots.push(snapshot);
        quotation.updated_at = audit.at;
        quotation.audit_log.push(audit);
        Ok(Some(quotation.clone()))
    }
}
