//! MongoDB implementation of the billing store.

use async_trait::async_trait;
use futures::TryStreamExt;
use mongodb::bson::{
    doc, to_bson_with_options, to_document_with_options, Bson, Document, SerializerOptions,
};
use mongodb::error::{ErrorKind, WriteFailure};
use mongodb::options::{
    ClientOptions, FindOneAndUpdateOptions, FindOptions, IndexOptions, ReplaceOptions,
    ReturnDocument,
};
use mongodb::{Client, Collection, Database, IndexModel};
use serde::de::DeserializeOwned;
use serde::Serialize;
use service_core::error::AppError;
use tracing::{info, instrument};
use uuid::Uuid;

use super::{
    CompanyStore, CustomerStore, InvoiceStore, Page, PageRequest, ProductStore, QuotationStore,
    SequenceAllocator, Sort,
};
use crate::models::{
    AuditEntry, Company, Customer, CustomerMatch, Invoice, InvoiceFilter, InvoiceStatus,
    InvoiceTransition, InvoiceUpdate, PdfSnapshot, Product, ProductBackfill, Quotation,
    QuotationFilter, QuotationTransition, QuotationUpdate,
};
use crate::services::metrics::DB_QUERY_DURATION;

const DUPLICATE_KEY: i32 = 11000;

fn is_duplicate_key(err: &mongodb::error::Error) -> bool {
    match err.kind.as_ref() {
        ErrorKind::Write(WriteFailure::WriteError(e)) => e.code == DUPLICATE_KEY,
        ErrorKind::Command(e) => e.code == DUPLICATE_KEY,
        _ => false,
    }
}

/// Duplicate-key failures on insert are conflicts; everything else is a database error.
fn insert_error(err: mongodb::error::Error, conflict: impl FnOnce() -> String) -> AppError {
    if is_duplicate_key(&err) {
        AppError::Conflict(anyhow::anyhow!(conflict()))
    } else {
        AppError::from(err)
    }
}

/// Serialize the way the driver does on insert, so `Uuid`s become binary in filters and patches too.
fn raw_options() -> SerializerOptions {
    SerializerOptions::builder().human_readable(false).build()
}

fn to_bson<T: Serialize + ?Sized>(value: &T) -> Result<Bson, AppError> {
    Ok(to_bson_with_options(value, raw_options())?)
}

fn to_document<T: Serialize + ?Sized>(value: &T) -> Result<Document, AppError> {
    Ok(to_document_with_options(value, raw_options())?)
}

fn uuid_bson(id: Uuid) -> Result<Bson, AppError> {
    to_bson(&id)
}

/// Case-insensitive substring match on user input.
fn contains_regex(query: &str) -> Document {
    doc! { "$regex": regex::escape(query.trim()), "$options": "i" }
}

fn sort_document(sort: &Sort) -> Document {
    let mut document = Document::new();
    document.insert(sort.field, if sort.descending { -1 } else { 1 });
    document.insert("_id", 1);
    document
}

fn date_range(
    from: Option<chrono::NaiveDate>,
    to: Option<chrono::NaiveDate>,
) -> Option<Document> {
    let mut range = Document::new();
    if let Some(from) = from {
        range.insert("$gte", from.to_string());
    }
    if let Some(to) = to {
        range.insert("$lte", to.to_string());
    }
    (!range.is_empty()).then_some(range)
}

fn invoice_query(company_id: &str, filter: &InvoiceFilter) -> Result<Document, AppError> {
    let mut query = doc! { "companyId": company_id };
    match (filter.status, filter.exclude_void) {
        (Some(InvoiceStatus::Void), true) => {
            query.insert("status", doc! { "$in": [] });
        }
        (Some(status), _) => {
            query.insert("status", status.as_str());
        }
        (None, true) => {
            query.insert("status", doc! { "$ne": InvoiceStatus::Void.as_str() });
        }
        (None, false) => {}
    }
    if let Some(payment_status) = filter.payment_status {
        query.insert("paymentStatus", payment_status.as_str());
    }
    if let Some(customer_id) = filter.customer_id {
        query.insert("customerId", uuid_bson(customer_id)?);
    }
    if let Some(range) = date_range(filter.from, filter.to) {
        query.insert("invoiceDate", range);
    }
    Ok(query)
}

fn quotation_query(company_id: &str, filter: &QuotationFilter) -> Result<Document, AppError> {
    let mut query = doc! { "companyId": company_id };
    if let Some(status) = filter.status {
        query.insert("status", status.as_str());
    }
    if let Some(customer_id) = filter.customer_id {
        query.insert("customerId", uuid_bson(customer_id)?);
    }
    if let Some(range) = date_range(filter.from, filter.to) {
        query.insert("quotationDate", range);
    }
    Ok(query)
}

fn after_update() -> FindOneAndUpdateOptions {
    FindOneAndUpdateOptions::builder()
        .return_document(ReturnDocument::After)
        .build()
}

async fn find_page<T>(
    collection: &Collection<T>,
    filter: Document,
    page: &PageRequest,
) -> Result<Page<T>, AppError>
where
    T: DeserializeOwned + Unpin + Send + Sync,
{
    let total = collection.count_documents(filter.clone(), None).await?;
    let options = FindOptions::builder()
        .sort(sort_document(&page.sort))
        .skip(page.skip())
        .limit(page.limit as i64)
        .build();
    let items: Vec<T> = collection.find(filter, options).await?.try_collect().await?;
    Ok(Page {
        items,
        total,
        page: page.page,
        limit: page.limit,
    })
}

async fn find_newest<T>(
    collection: &Collection<T>,
    filter: Document,
    limit: u64,
) -> Result<Vec<T>, AppError>
where
    T: DeserializeOwned + Unpin + Send + Sync,
{
    let options = FindOptions::builder()
        .sort(doc! { "createdAt": -1 })
        .limit(limit as i64)
        .build();
    Ok(collection.find(filter, options).await?.try_collect().await?)
}

/// Billing store backed by a MongoDB database.
#[derive(Clone)]
pub struct MongoStore {
    db: Database,
    counters: Collection<Document>,
    companies: Collection<Company>,
    customers: Collection<Customer>,
    products: Collection<Product>,
    invoices: Collection<Invoice>,
    quotations: Collection<Quotation>,
}

impl MongoStore {
    pub fn new(db: &Database) -> Self {
        Self {
            db: db.clone(),
            counters: db.collection("counters"),
            companies: db.collection("companies"),
            customers: db.collection("customers"),
            products: db.collection("products"),
            invoices: db.collection("invoices"),
            quotations: db.collection("quotations"),
        }
    }

    /// Parse `uri`, connect and open `database`.
    #[instrument(skip(uri))]
    pub async fn connect(uri: &str, database: &str) -> Result<Self, AppError> {
        let mut client_options = ClientOptions::parse(uri).await.map_err(|e| {
            tracing::error!("Failed to parse MongoDB connection string: {}", e);
            AppError::DatabaseError(e.into())
        })?;
        client_options.app_name = Some("gst-invoicing".to_string());

        let client = Client::with_options(client_options).map_err(|e| {
            tracing::error!("Failed to create MongoDB client: {}", e);
            AppError::DatabaseError(e.into())
        })?;
        info!(database = database, "MongoDB client created");
        Ok(Self::new(&client.database(database)))
    }

    /// Ping the server.
    pub async fn health_check(&self) -> Result<(), AppError> {
        self.db.run_command(doc! { "ping": 1 }, None).await?;
        Ok(())
    }

    /// Create tenant-scoped indexes, including invoice number uniqueness per company.
    pub async fn init_indexes(&self) -> Result<(), AppError> {
        let index = |keys: Document, name: &str, unique: bool| {
            IndexModel::builder()
                .keys(keys)
                .options(
                    IndexOptions::builder()
                        .name(name.to_string())
                        .unique(unique)
                        .build(),
                )
                .build()
        };

        self.invoices
            .create_indexes(
                [
                    index(
                        doc! { "companyId": 1, "invoiceNo": 1 },
                        "tenant_invoice_no_idx",
                        true,
                    ),
                    index(
                        doc! { "companyId": 1, "status": 1, "invoiceDate": -1 },
                        "tenant_invoice_status_idx",
                        false,
                    ),
                    index(
                        doc! { "companyId": 1, "createdAt": -1 },
                        "tenant_invoice_created_idx",
                        false,
                    ),
                ],
                None,
            )
            .await?;

        self.quotations
            .create_indexes(
                [
                    index(
                        doc! { "companyId": 1, "quotationNo": 1 },
                        "tenant_quotation_no_idx",
                        true,
                    ),
                    index(
                        doc! { "companyId": 1, "createdAt": -1 },
                        "tenant_quotation_created_idx",
                        false,
                    ),
                ],
                None,
            )
            .await?;

        self.customers
            .create_indexes(
                [
                    index(
                        doc! { "companyId": 1, "isActive": 1, "gstin": 1 },
                        "tenant_customer_gstin_idx",
                        false,
                    ),
                    index(
                        doc! { "companyId": 1, "isActive": 1, "email": 1 },
                        "tenant_customer_email_idx",
                        false,
                    ),
                    index(
                        doc! { "companyId": 1, "isActive": 1, "phone": 1 },
                        "tenant_customer_phone_idx",
                        false,
                    ),
                ],
                None,
            )
            .await?;

        self.products
            .create_indexes(
                [index(
                    doc! { "companyId": 1, "isActive": 1, "name": 1, "hsn": 1 },
                    "tenant_product_name_hsn_idx",
                    false,
                )],
                None,
            )
            .await?;

        info!("gst-invoicing indexes initialized");
        Ok(())
    }
}

#[async_trait]
impl SequenceAllocator for MongoStore {
    #[instrument(skip(self))]
    async fn allocate(&self, key: &str) -> Result<i64, AppError> {
        let timer = DB_QUERY_DURATION
            .with_label_values(&["allocate_sequence"])
            .start_timer();

        let options = FindOneAndUpdateOptions::builder()
            .upsert(true)
            .return_document(ReturnDocument::After)
            .build();
        let filter = doc! { "_id": key };
        let update = doc! { "$inc": { "nextSeq": 1_i64 } };

        // Two first-time upserts on one key can race on _id; the loser retries as an increment.
        let counter = match self
            .counters
            .find_one_and_update(filter.clone(), update.clone(), options.clone())
            .await
        {
            Err(e) if is_duplicate_key(&e) => {
                self.counters
                    .find_one_and_update(filter, update, options)
                    .await?
            }
            other => other?,
        };

        timer.observe_duration();

        let counter = counter.ok_or_else(|| {
            AppError::DatabaseError(anyhow::anyhow!("Counter {} was not returned", key))
        })?;
        match counter.get("nextSeq") {
            Some(Bson::Int64(n)) => Ok(*n),
            Some(Bson::Int32(n)) => Ok(i64::from(*n)),
            _ => Err(AppError::DatabaseError(anyhow::anyhow!(
                "Counter {} holds no numeric nextSeq",
                key
            ))),
        }
    }
}

#[async_trait]
impl CompanyStore for MongoStore {
    async fn get_company(&self, company_id: &str) -> Result<Option<Company>, AppError> {
        Ok(self
            .companies
            .find_one(doc! { "_id": company_id }, None)
            .await?)
    }

    #[instrument(skip(self, company), fields(company_id = %company.company_id))]
    async fn upsert_company(&self, company: Company) -> Result<Company, AppError> {
        let options = ReplaceOptions::builder().upsert(true).build();
        self.companies
            .replace_one(doc! { "_id": company.company_id.as_str() }, &company, options)
            .await?;
        Ok(company)
    }
}

#[async_trait]
impl CustomerStore for MongoStore {
    async fn get_customer(&self, company_id: &str, id: Uuid) -> Result<Option<Customer>, AppError> {
        let filter = doc! { "_id": uuid_bson(id)?, "companyId": company_id, "isActive": true };
        Ok(self.customers.find_one(filter, None).await?)
    }

    #[instrument(skip(self, contact))]
    async fn find_customer_by_contact(
        &self,
        company_id: &str,
        contact: &CustomerMatch,
    ) -> Result<Option<Customer>, AppError> {
        let exact_ci = |value: &str| {
            doc! { "$regex": format!("^{}$", regex::escape(value)), "$options": "i" }
        };
        let candidates = [
            contact.gstin.as_deref().map(|g| ("gstin", Bson::Document(exact_ci(g)))),
            contact.email.as_deref().map(|e| ("email", Bson::Document(exact_ci(e)))),
            contact.phone.as_deref().map(|p| ("phone", Bson::String(p.to_string()))),
        ];
        let options = mongodb::options::FindOneOptions::builder()
            .sort(doc! { "createdAt": 1 })
            .build();

        for (field, value) in candidates.into_iter().flatten() {
            let mut filter = doc! { "companyId": company_id, "isActive": true };
            filter.insert(field, value);
            if let Some(customer) = self.customers.find_one(filter, options.clone()).await? {
                return Ok(Some(customer));
            }
        }
        Ok(None)
    }

    #[instrument(skip(self, customer), fields(customer_id = %customer.id))]
    async fn insert_customer(&self, customer: Customer) -> Result<Customer, AppError> {
        self.customers.insert_one(&customer, None).await?;
        Ok(customer)
    }

    async fn list_customers(
        &self,
        company_id: &str,
        search: Option<&str>,
        page: &PageRequest,
    ) -> Result<Page<Customer>, AppError> {
        let mut filter = doc! { "companyId": company_id, "isActive": true };
        if let Some(q) = search.filter(|q| !q.trim().is_empty()) {
            filter.insert(
                "$or",
                vec![
                    doc! { "name": contains_regex(q) },
                    doc! { "gstin": contains_regex(q) },
                    doc! { "email": contains_regex(q) },
                    doc! { "phone": contains_regex(q) },
                ],
            );
        }
        find_page(&self.customers, filter, page).await
    }

    #[instrument(skip(self))]
    async fn deactivate_customer(&self, company_id: &str, id: Uuid) -> Result<bool, AppError> {
        let result = self
            .customers
            .update_one(
                doc! { "_id": uuid_bson(id)?, "companyId": company_id, "isActive": true },
                doc! { "$set": { "isActive": false, "updatedAt": to_bson(&chrono::Utc::now())? } },
                None,
            )
            .await?;
        Ok(result.matched_count > 0)
    }
}

#[async_trait]
impl ProductStore for MongoStore {
    async fn get_product(&self, company_id: &str, id: Uuid) -> Result<Option<Product>, AppError> {
        let filter = doc! { "_id": uuid_bson(id)?, "companyId": company_id, "isActive": true };
        Ok(self.products.find_one(filter, None).await?)
    }

    async fn find_product(
        &self,
        company_id: &str,
        name: &str,
        hsn: &str,
    ) -> Result<Option<Product>, AppError> {
        let options = mongodb::options::FindOneOptions::builder()
            .sort(doc! { "createdAt": 1 })
            .build();
        let filter = doc! {
            "companyId": company_id,
            "isActive": true,
            "name": name,
            "hsn": hsn,
        };
        Ok(self.products.find_one(filter, options).await?)
    }

    #[instrument(skip(self, product), fields(product_id = %product.id))]
    async fn insert_product(&self, product: Product) -> Result<Product, AppError> {
        self.products.insert_one(&product, None).await?;
        Ok(product)
    }

    #[instrument(skip(self, backfill))]
    async fn backfill_product(
        &self,
        company_id: &str,
        id: Uuid,
        backfill: &ProductBackfill,
    ) -> Result<(), AppError> {
        let mut set = to_document(backfill)?;
        set.insert("updatedAt", to_bson(&chrono::Utc::now())?);
        self.products
            .update_one(
                doc! { "_id": uuid_bson(id)?, "companyId": company_id },
                doc! { "$set": set },
                None,
            )
            .await?;
        Ok(())
    }

    async fn list_products(
        &self,
        company_id: &str,
        search: Option<&str>,
        page: &PageRequest,
    ) -> Result<Page<Product>, AppError> {
        let mut filter = doc! { "companyId": company_id, "isActive": true };
        if let Some(q) = search.filter(|q| !q.trim().is_empty()) {
            filter.insert(
                "$or",
                vec![
                    doc! { "name": contains_regex(q) },
                    doc! { "hsn": contains_regex(q) },
                ],
            );
        }
        find_page(&self.products, filter, page).await
    }

    #[instrument(skip(self))]
    async fn deactivate_product(&self, company_id: &str, id: Uuid) -> Result<bool, AppError> {
        let result = self
            .products
            .update_one(
                doc! { "_id": uuid_bson(id)?, "companyId": company_id, "isActive": true },
                doc! { "$set": { "isActive": false, "updatedAt": to_bson(&chrono::Utc::now())? } },
                None,
            )
            .await?;
        Ok(result.matched_count > 0)
    }
}

#[async_trait]
impl InvoiceStore for MongoStore {
    #[instrument(skip(self, invoice), fields(invoice_no = %invoice.invoice_no))]
    async fn insert_invoice(&self, invoice: Invoice) -> Result<Invoice, AppError> {
        let timer = DB_QUERY_DURATION
            .with_label_values(&["insert_invoice"])
            .start_timer();

        self.invoices
            .insert_one(&invoice, None)
            .await
            .map_err(|e| {
                insert_error(e, || {
                    format!("Invoice number {} already exists", invoice.invoice_no)
                })
            })?;

        timer.observe_duration();
        Ok(invoice)
    }

    async fn get_invoice(&self, company_id: &str, id: Uuid) -> Result<Option<Invoice>, AppError> {
        let timer = DB_QUERY_DURATION
            .with_label_values(&["get_invoice"])
            .start_timer();
        let invoice = self
            .invoices
            .find_one(doc! { "_id": uuid_bson(id)?, "companyId": company_id }, None)
            .await?;
        timer.observe_duration();
        Ok(invoice)
    }

    async fn list_invoices(
        &self,
        company_id: &str,
        filter: &InvoiceFilter,
        page: &PageRequest,
    ) -> Result<Page<Invoice>, AppError> {
        let timer = DB_QUERY_DURATION
            .with_label_values(&["list_invoices"])
            .start_timer();
        let page = find_page(&self.invoices, invoice_query(company_id, filter)?, page).await?;
        timer.observe_duration();
        Ok(page)
    }

    async fn search_invoices(
        &self,
        company_id: &str,
        query: &str,
        limit: u64,
    ) -> Result<Vec<Invoice>, AppError> {
        let filter = doc! {
            "companyId": company_id,
            "$or": [
                { "invoiceNo": contains_regex(query) },
                { "buyer.name": contains_regex(query) },
                { "buyer.gstin": contains_regex(query) },
            ],
        };
        find_newest(&self.invoices, filter, limit).await
    }

    async fn find_invoices(
        &self,
        company_id: &str,
        filter: &InvoiceFilter,
    ) -> Result<Vec<Invoice>, AppError> {
        let timer = DB_QUERY_DURATION
            .with_label_values(&["find_invoices"])
            .start_timer();
        let options = FindOptions::builder()
            .sort(doc! { "invoiceDate": 1, "_id": 1 })
            .build();
        let invoices: Vec<Invoice> = self
            .invoices
            .find(invoice_query(company_id, filter)?, options)
            .await?
            .try_collect()
            .await?;
        timer.observe_duration();
        Ok(invoices)
    }

    #[instrument(skip(self, update, audit))]
    async fn update_invoice(
        &self,
        company_id: &str,
        id: Uuid,
        update: &InvoiceUpdate,
        audit: AuditEntry,
    ) -> Result<Option<Invoice>, AppError> {
        let timer = DB_QUERY_DURATION
            .with_label_values(&["update_invoice"])
            .start_timer();
        let invoice = self
            .invoices
            .find_one_and_update(
                doc! { "_id": uuid_bson(id)?, "companyId": company_id },
                doc! {
                    "$set": to_document(update)?,
                    "$push": { "auditLog": to_bson(&audit)? },
                },
                after_update(),
            )
            .await?;
        timer.observe_duration();
        Ok(invoice)
    }

    #[instrument(skip(self, transition), fields(to = transition.status.as_str()))]
    async fn transition_invoice(
        &self,
        company_id: &str,
        id: Uuid,
        transition: InvoiceTransition,
    ) -> Result<Option<Invoice>, AppError> {
        let timer = DB_QUERY_DURATION
            .with_label_values(&["transition_invoice"])
            .start_timer();

        let mut set = doc! {
            "status": transition.status.as_str(),
            "updatedAt": to_bson(&transition.audit.at)?,
        };
        if let Some(payment_status) = transition.payment_status {
            set.insert("paymentStatus", payment_status.as_str());
        }
        let invoice = self
            .invoices
            .find_one_and_update(
                doc! {
                    "_id": uuid_bson(id)?,
                    "companyId": company_id,
                    "status": transition.expected.as_str(),
                },
                doc! {
                    "$set": set,
                    "$push": { "auditLog": to_bson(&transition.audit)? },
                },
                after_update(),
            )
            .await?;

        timer.observe_duration();
        Ok(invoice)
    }

    #[instrument(skip(self, snapshot, audit))]
    async fn append_invoice_pdf_snapshot(
        &self,
        company_id: &str,
        id: Uuid,
        expected_count: usize,
        snapshot: PdfSnapshot,
        audit: AuditEntry,
    ) -> Result<Option<Invoice>, AppError> {
        let invoice = self
            .invoices
            .find_one_and_update(
                doc! {
                    "_id": uuid_bson(id)?,
                    "companyId": company_id,
                    "pdfSnapshots": { "$size": expected_count as i64 },
                },
                doc! {
                    "$set": { "updatedAt": to_bson(&audit.at)? },
                    "$push": {
                        "pdfSnapshots": to_bson(&snapshot)?,
                        "auditLog": to_bson(&audit)?,
                    },
                },
                after_update(),
            )
            .await?;
        Ok(invoice)
    }
}

#[async_trait]
impl QuotationStore for MongoStore {
    #[instrument(skip(self, quotation), fields(quotation_no = %quotation.quotation_no))]
    async fn insert_quotation(&self, quotation: Quotation) -> Result<Quotation, AppError> {
        self.quotations
            .insert_one(&quotation, None)
            .await
            .map_err(|e| {
                insert_error(e, || {
                    format!("Quotation number {} already exists", quotation.quotation_no)
                })
            })?;
        Ok(quotation)
    }

    async fn get_quotation(
        &self,
        company_id: &str,
        id: Uuid,
    ) -> Result<Option<Quotation>, AppError> {
        Ok(self
            .quotations
            .find_one(doc! { "_id": uuid_bson(id)?, "companyId": company_id }, None)
            .await?)
    }

    async fn list_quotations(
        &self,
        company_id: &str,
        filter: &QuotationFilter,
        page: &PageRequest,
    ) -> Result<Page<Quotation>, AppError> {
        find_page(&self.quotations, quotation_query(company_id, filter)?, page).await
    }

    async fn search_quotations(
        &self,
        company_id: &str,
        query: &str,
        limit: u64,
    ) -> Result<Vec<Quotation>, AppError> {
        let filter = doc! {
            "companyId": company_id,
            "$or": [
                { "quotationNo": contains_regex(query) },
                { "customer.name": contains_regex(query) },
            ],
        };
        find_newest(&self.quotations, filter, limit).await
    }

    #[instrument(skip(self, update, audit))]
    async fn update_quotation(
        &self,
        company_id: &str,
        id: Uuid,
        update: &QuotationUpdate,
        audit: AuditEntry,
    ) -> Result<Option<Quotation>, AppError> {
        Ok(self
            .quotations
            .find_one_and_update(
                doc! { "_id": uuid_bson(id)?, "companyId": company_id },
                doc! {
                    "$set": to_document(update)?,
                    "$push": { "auditLog": to_bson(&audit)? },
                },
                after_update(),
            )
            .await?)
    }

    #[instrument(skip(self, transition), fields(to = transition.status.as_str()))]
    async fn transition_quotation(
        &self,
        company_id: &str,
        id: Uuid,
        transition: QuotationTransition,
    ) -> Result<Option<Quotation>, AppError> {
        Ok(self
            .quotations
            .find_one_and_update(
                doc! {
                    "_id": uuid_bson(id)?,
                    "companyId": company_id,
                    "status": transition.expected.as_str(),
                },
                doc! {
                    "$set": {
                        "status": transition.status.as_str(),
                        "updatedAt": to_bson(&transition.audit.at)?,
                    },
                    "$push": { "auditLog": to_bson(&transition.audit)? },
                },
                after_update(),
            )
            .await?)
    }

    #[instrument(skip(self, snapshot, audit))]
    async fn append_quotation_pdf_snapshot(
        &self,
        company_id: &str,
        id: Uuid,
        expected_count: usize,
        snapshot: PdfSnapshot,
        audit: AuditEntry,
    ) -> Result<Option<Quotation>, AppError> {
        Ok(self
            .quotations
            .find_one_and_update(
                doc! {
                    "_id": uuid_bson(id)?,
                    "companyId": company_id,
                    "pdfSnapshots": { "$size": expected_count as i64 },
                },
                doc! {
                    "$set": { "updatedAt": to_bson(&audit.at)? },
                    "$push": {
                        "pdfSnapshots": to_bson(&snapshot)?,
                        "auditLog": to_bson(&audit)?,
                    },
                },
                after_update(),
            )
            .await?)
    }
}
