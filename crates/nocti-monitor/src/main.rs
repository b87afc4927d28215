//! NoctiVision monitor - entry point.

use anyhow::Result;
use clap::Parser;
use tracing::info;

/// NoctiVision validation pipeline monitor
#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
struct Args {
    /// Configuration file path (can also be set via NOCTI_CONFIG env var)
    #[arg(short, long)]
    config: Option<String>,
}

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize TLS crypto provider (must be before any WS connections)
    nocti_live::init_crypto();

    let args = Args::parse();

    nocti_telemetry::init_logging()?;

    info!("Starting NoctiVision monitor v{}", env!("CARGO_PKG_VERSION"));

    // Determine config path: CLI arg > NOCTI_CONFIG env var > default
    let config_path = args
        .config
        .or_else(|| std::env::var("NOCTI_CONFIG").ok())
        .unwrap_or_else(|| "config/default.toml".to_string());

    info!(config_path = %config_path, "Loading configuration");

    let config = nocti_monitor::MonitorConfig::load(&config_path)?;

    let app = nocti_monitor::App::new(config);
    app.run().await?;

    Ok(())
}
