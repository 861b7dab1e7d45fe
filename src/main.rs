mod bot;
mod command;
mod config;
mod dedup;
mod filter;
mod forwarder;
mod testserver;

use std::path::PathBuf;

use anyhow::{Context, Result};
use tracing::{error, info};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use crate::config::Config;
use crate::dedup::SubmittedLog;

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize logging
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info,ventuzbot=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // Load configuration
    let config_path = std::env::args()
        .nth(1)
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from("config.toml"));

    info!("Loading configuration from: {}", config_path.display());
    let config = Config::load(&config_path)
        .with_context(|| format!("Failed to load config from {}", config_path.display()))?;

    info!("Configuration loaded successfully");
    info!("  Prefixes: {:?}", config.prefixes);
    info!("  Version: {}", config.feedback.version);
    info!("  Test mode: {}", config.test_mode);

    let submitted = SubmittedLog::load(&config.feedback.submitted_log);

    // In test mode, feedback goes to a local receiver instead of the
    // production endpoint.
    if config.test_mode {
        tokio::spawn(async {
            if let Err(e) = testserver::run().await {
                error!("Test receiver failed: {:#}", e);
            }
        });
    }

    info!("Bot is starting...");
    bot::run(config, submitted).await?;

    Ok(())
}
