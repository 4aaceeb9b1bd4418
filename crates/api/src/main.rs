//! Employee Attrition Dashboard - Main Entry Point

use anyhow::Context;
use dashboard_api::{init_logging, run_server, Settings};
use tracing::info;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let settings = Settings::load().context("failed to load configuration")?;
    init_logging(&settings.logging)?;

    info!("=== Employee Attrition Dashboard v{} ===", env!("CARGO_PKG_VERSION"));

    run_server(settings).await
}
