use anyhow::{Context, Result};
use tracing::error;

use stock_sync_lib::build_service;
use stock_sync_lib::infrastructure::{AppConfig, init_logging_with_config, log_system_info};

#[tokio::main]
async fn main() -> Result<()> {
    let config = AppConfig::load().context("Failed to load configuration")?;
    init_logging_with_config(&config.logging)?;
    log_system_info();

    let service = build_service(&config)?;

    // A feed that cannot be fetched ends the run; it is not a process failure.
    if let Err(e) = service.run().await {
        error!("❌ Error downloading feed: {}", e);
    }

    Ok(())
}
