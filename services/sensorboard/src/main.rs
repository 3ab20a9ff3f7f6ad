//! Sensorboard CLI
//!
//! Command-line interface for the polling sensor dashboard.

use std::path::PathBuf;

use clap::Parser;
use sensorboard::{load_config, Config, Strategy};
use tracing::Level;

#[derive(Parser)]
#[command(name = "sensorboard")]
#[command(about = "Polls sensor groups from a backend and serves a live dashboard")]
#[command(version)]
struct Args {
    /// Path to configuration file
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Backend base URL (overrides config file)
    #[arg(long)]
    backend_url: Option<String>,

    /// Polling strategy (overrides config file)
    #[arg(long, value_enum)]
    strategy: Option<Strategy>,

    /// Dashboard port (overrides config file)
    #[arg(long)]
    dashboard_port: Option<u16>,

    /// Log level
    #[arg(short, long, default_value = "info")]
    log_level: Level,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();

    tracing_subscriber::fmt()
        .with_max_level(args.log_level)
        .init();

    tracing::debug!(
        "Parsed command line arguments: config={:?}, backend_url={:?}, strategy={:?}, dashboard_port={:?}, log_level={:?}",
        args.config,
        args.backend_url,
        args.strategy,
        args.dashboard_port,
        args.log_level
    );

    let mut config = if let Some(config_path) = &args.config {
        tracing::debug!("Loading configuration from {:?}", config_path);
        load_config(config_path)?
    } else {
        tracing::debug!("Using default configuration");
        Config::default()
    };

    if let Some(backend_url) = args.backend_url {
        config.backend.base_url = backend_url;
    }
    if let Some(strategy) = args.strategy {
        config.polling.strategy = strategy;
    }
    if let Some(dashboard_port) = args.dashboard_port {
        config.dashboard.port = dashboard_port;
    }

    tracing::info!("Starting sensorboard service");
    sensorboard::run(config).await?;

    Ok(())
}
