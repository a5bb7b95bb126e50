//! Fair value gap trading bot - entry point.

use anyhow::Result;
use clap::Parser;
use tracing::info;

/// Fair value gap trading bot
#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
struct Args {
    /// Configuration file path (can also be set via FVG_CONFIG env var)
    #[arg(short, long)]
    config: Option<String>,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    fvg_telemetry::init_logging()?;

    info!("Starting FVG bot v{}", env!("CARGO_PKG_VERSION"));

    // Determine config path: CLI arg > FVG_CONFIG env var > default
    let config_path = args
        .config
        .or_else(|| std::env::var("FVG_CONFIG").ok())
        .unwrap_or_else(|| "config/default.toml".to_string());

    info!(config_path = %config_path, "Loading configuration");
    let config = fvg_bot::AppConfig::from_file(&config_path)?;

    let app = fvg_bot::Application::new(config)?;
    app.run().await?;

    Ok(())
}
