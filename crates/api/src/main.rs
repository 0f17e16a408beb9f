//! Cultivation Yield Predictor - Main Entry Point

use std::path::PathBuf;

use anyhow::Context;
use api::{init_logging, run_server, AppConfig};
use tracing::info;

/// Environment variable naming an explicit config file
const CONFIG_ENV: &str = "YIELD_PREDICTOR_CONFIG";

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config_path = std::env::var_os(CONFIG_ENV).map(PathBuf::from);
    let config = AppConfig::load(config_path.as_deref()).context("failed to load configuration")?;

    init_logging(&config.logging).context("failed to initialize logging")?;

    info!("=== Cultivation Yield Predictor v{} ===", env!("CARGO_PKG_VERSION"));
    info!("Loading prediction pipeline...");

    run_server(config).await.context("yield predictor server failed")?;

    Ok(())
}
