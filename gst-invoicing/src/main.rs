use gst_invoicing::{config::InvoicingConfig, services::init_metrics, Application};
use service_core::error::expose_internal_details;
use service_core::observability::init_tracing;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = InvoicingConfig::load()?;

    init_tracing(
        "gst-invoicing",
        &config.common.log_level,
        config.common.otlp_endpoint.as_deref(),
    );
    expose_internal_details(config.common.is_development());
    init_metrics();

    let application = Application::build(config).await?;
    application.run_until_stopped().await?;

    Ok(())
}
