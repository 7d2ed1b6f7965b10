//! skew — single-pair market-making bot, entry point.

use anyhow::Result;
use clap::Parser;
use tracing::info;

/// Single-pair inventory-skew market maker
#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
struct Args {
    /// Configuration file path (can also be set via SKEW_CONFIG env var)
    #[arg(short, long)]
    config: Option<String>,

    /// Base currency override, e.g. COMP
    #[arg(long)]
    base: Option<String>,

    /// Quote currency override, e.g. USDT
    #[arg(long)]
    quote: Option<String>,

    /// Session duration override, seconds
    #[arg(long)]
    duration: Option<u64>,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    skew_telemetry::init_logging()?;
    info!("Starting skew bot v{}", env!("CARGO_PKG_VERSION"));

    // Config path: CLI arg > SKEW_CONFIG env var > default
    let config_path = args
        .config
        .or_else(|| std::env::var("SKEW_CONFIG").ok())
        .unwrap_or_else(|| "config/default.toml".to_string());

    info!(config_path = %config_path, "Loading configuration");
    let mut config = skew_bot::AppConfig::from_file(&config_path)?;

    if let Some(base) = args.base {
        config.pair.base = base;
    }
    if let Some(quote) = args.quote {
        config.pair.quote = quote;
    }
    if let Some(duration) = args.duration {
        config.session.duration_secs = duration;
    }

    info!(
        pair = %format!("{}/{}", config.pair.base, config.pair.quote),
        duration_secs = config.session.duration_secs,
        "Configuration loaded"
    );

    let app = skew_bot::Application::new(config)?;
    app.run().await?;

    Ok(())
}
