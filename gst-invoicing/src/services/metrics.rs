//! Prometheus metrics for gst-invoicing.
//!
//! Domain collectors live in the default `prometheus` registry. HTTP request
//! metrics recorded through the `metrics` facade are rendered by the installed
//! exporter handle, and `/metrics` serves both.

use metrics_exporter_prometheus::{PrometheusBuilder, PrometheusHandle};
use once_cell::sync::Lazy;
use prometheus::{
    register_counter_vec, register_histogram_vec, CounterVec, HistogramVec, TextEncoder,
};
use std::sync::OnceLock;

static METRICS_HANDLE: OnceLock<PrometheusHandle> = OnceLock::new();

/// Invoices created or transitioned, by resulting status.
pub static INVOICES_TOTAL: Lazy<CounterVec> = Lazy::new(|| {
    register_counter_vec!(
        "invoicing_invoices_total",
        "Total number of invoices by status",
        &["status"] // draft, approved, paid, void
    )
    .expect("Failed to register invoices_total")
});

/// Quotations created or transitioned, by resulting status.
pub static QUOTATIONS_TOTAL: Lazy<CounterVec> = Lazy::new(|| {
    register_counter_vec!(
        "invoicing_quotations_total",
        "Total number of quotations by status",
        &["status"]
    )
    .expect("Failed to register quotations_total")
});

/// Sequence numbers handed out, by document type.
pub static SEQUENCE_ALLOCATIONS_TOTAL: Lazy<CounterVec> = Lazy::new(|| {
    register_counter_vec!(
        "invoicing_sequence_allocations_total",
        "Total number of allocated document sequence numbers",
        &["document_type"]
    )
    .expect("Failed to register sequence_allocations_total")
});

/// Error counter for alerting.
pub static ERRORS_TOTAL: Lazy<CounterVec> = Lazy::new(|| {
    register_counter_vec!(
        "invoicing_errors_total",
        "Total number of errors by type",
        &["error_type"]
    )
    .expect("Failed to register errors_total")
});

/// Store operation duration histogram.
pub static DB_QUERY_DURATION: Lazy<HistogramVec> = Lazy::new(|| {
    register_histogram_vec!(
        "invoicing_db_query_duration_seconds",
        "Database query duration in seconds",
        &["operation"],
        vec![0.001, 0.005, 0.01, 0.025, 0.05, 0.1, 0.25, 0.5, 1.0]
    )
    .expect("Failed to register db_query_duration")
});

/// Force the domain collectors and install the `metrics` recorder.
///
/// Safe to call more than once; only the first recorder install wins.
pub fn init_metrics() {
    Lazy::force(&INVOICES_TOTAL);
    Lazy::force(&QUOTATIONS_TOTAL);
    Lazy::force(&SEQUENCE_ALLOCATIONS_TOTAL);
    Lazy::force(&ERRORS_TOTAL);
    Lazy::force(&DB_QUERY_DURATION);

    if METRICS_HANDLE.get().is_some() {
        return;
    }
    match PrometheusBuilder::new().install_recorder() {
        Ok(handle) => {
            let _ = METRICS_HANDLE.set(handle);
        }
        Err(e) => tracing::warn!(error = %e, "Prometheus recorder not installed"),
    }
}

/// Count an error by its kind.
pub fn record_error(kind: &str) {
    ERRORS_TOTAL.with_label_values(&[kind]).inc();
}

/// Get metrics in Prometheus text format.
pub fn get_metrics() -> String {
    let encoder = TextEncoder::new();
    let metric_families = prometheus::gather();
    let mut body = encoder
        .encode_to_string(&metric_families)
        .unwrap_or_default();

    if let Some(handle) = METRICS_HANDLE.get() {
        body.push_str(&handle.render());
    }
    body
}
