use axum::http::Request;
use axum::middleware::from_fn;
use axum::{
    routing::{get, post},
    Router,
};
use secrecy::ExposeSecret;
use service_core::middleware::{metrics_middleware, request_id_middleware, REQUEST_ID_HEADER};
use std::net::SocketAddr;
use std::sync::Arc;
use tower_http::trace::TraceLayer;

use crate::config::InvoicingConfig;
use crate::handlers;
use crate::services::{InvoiceService, QuotationService, ReportService};
use crate::store::{BillingStore, MemoryStore, MongoStore};

#[derive(Clone)]
pub struct AppState {
    pub store: Arc<dyn BillingStore>,
    pub invoices: InvoiceService,
    pub quotations: QuotationService,
    pub reports: ReportService,
    /// Present when backed by MongoDB; used by the readiness probe.
    pub mongo: Option<MongoStore>,
}

impl AppState {
    pub fn new(store: Arc<dyn BillingStore>) -> Self {
        Self {
            invoices: InvoiceService::new(store.clone()),
            quotations: QuotationService::new(store.clone()),
            reports: ReportService::new(store.clone()),
            store,
            mongo: None,
        }
    }

    pub fn with_mongo(mongo: MongoStore) -> Self {
        let mut state = Self::new(Arc::new(mongo.clone()));
        state.mongo = Some(mongo);
        state
    }

    pub fn in_memory() -> Self {
        Self::new(Arc::new(MemoryStore::new()))
    }
}

pub fn router(state: AppState) -> Router {
    use handlers::{company, customers, invoices, products, quotations, reports};

    Router::new()
        .route("/health", get(handlers::health_check))
        .route("/ready", get(handlers::readiness_check))
        .route("/metrics", get(handlers::metrics))
        .route(
            "/company",
            get(company::get_company).put(company::put_company),
        )
        .route(
            "/customers",
            post(customers::create_customer).get(customers::list_customers),
        )
        .route(
            "/customers/:id",
            get(customers::get_customer).delete(customers::delete_customer),
        )
        .route(
            "/products",
            post(products::create_product).get(products::list_products),
        )
        .route(
            "/products/:id",
            get(products::get_product).delete(products::delete_product),
        )
        .route(
            "/invoices",
            post(invoices::create_invoice).get(invoices::list_invoices),
        )
        .route("/invoices/search", get(invoices::search_invoices))
        .route(
            "/invoices/:id",
            get(invoices::get_invoice).patch(invoices::update_invoice),
        )
        .route("/invoices/:id/approve", post(invoices::approve_invoice))
        .route("/invoices/:id/mark-paid", post(invoices::mark_invoice_paid))
        .route("/invoices/:id/void", post(invoices::void_invoice))
        .route(
            "/invoices/:id/payment-status",
            axum::routing::patch(invoices::update_payment_status),
        )
        .route(
            "/invoices/:id/pdf-snapshots",
            post(invoices::add_pdf_snapshot),
        )
        .route(
            "/quotations",
            post(quotations::create_quotation).get(quotations::list_quotations),
        )
        .route("/quotations/search", get(quotations::search_quotations))
        .route(
            "/quotations/:id",
            get(quotations::get_quotation).patch(quotations::update_quotation),
        )
        .route(
            "/quotations/:id/approve",
            post(quotations::approve_quotation),
        )
        .route("/quotations/:id/reject", post(quotations::reject_quotation))
        .route(
            "/quotations/:id/pdf-snapshots",
            post(quotations::add_pdf_snapshot),
        )
        .route("/reports/sales", get(reports::sales_report))
        .layer(from_fn(metrics_middleware))
        .layer(
            TraceLayer::new_for_http().make_span_with(|request: &Request<_>| {
                let request_id = request
                    .headers()
                    .get(REQUEST_ID_HEADER)
                    .and_then(|value| value.to_str().ok())
                    .unwrap_or("-");

                tracing::info_span!(
                    "http_request",
                    request_id = %request_id,
                    method = %request.method(),
                    uri = %request.uri(),
                    version = ?request.version(),
                    company_id = tracing::field::Empty,
                    user_id = tracing::field::Empty,
                )
            }),
        )
        // Outermost, so the trace span already sees the request id.
        .layer(from_fn(request_id_middleware))
        .with_state(state)
}

pub struct Application {
    port: u16,
    listener: tokio::net::TcpListener,
    router: Router,
}

impl Application {
    pub async fn build(config: InvoicingConfig) -> anyhow::Result<Self> {
        let mongo = MongoStore::connect(
            config.mongodb.uri.expose_secret(),
            &config.mongodb.database,
        )
        .await?;

        // Unique numbering and tenant-scoped query indexes
        mongo.init_indexes().await?;

        let state = AppState::with_mongo(mongo);
        let router = router(state);

        let addr = SocketAddr::from(([0, 0, 0, 0], config.common.port));
        let listener = tokio::net::TcpListener::bind(addr).await?;
        let port = listener.local_addr()?.port();

        Ok(Self {
            port,
            listener,
            router,
        })
    }

    pub fn port(&self) -> u16 {
        self.port
    }

    pub async fn run_until_stopped(self) -> anyhow::Result<()> {
        tracing::info!(port = self.port, "gst-invoicing listening");

        axum::serve(self.listener, self.router)
            .with_graceful_shutdown(shutdown_signal())
            .await?;

        Ok(())
    }
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "Failed to listen for shutdown signal");
        return;
    }
    tracing::info!("Shutdown signal received");
}
