//! Heights market data watcher - entry point.

use anyhow::Result;
use clap::Parser;
use tracing::info;

/// Console watcher for the Heights market data hub
#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
struct Args {
    /// Configuration file path (can also be set via HEIGHTS_CONFIG env var)
    #[arg(short, long)]
    config: Option<String>,

    /// Symbols to watch, overriding the config file
    #[arg(short, long)]
    symbols: Vec<String>,
}

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize TLS crypto provider (must be before any WS connections)
    heights_ws::init_crypto();

    let args = Args::parse();

    heights_watch::logging::init_logging()?;

    info!("Starting heights-watch v{}", env!("CARGO_PKG_VERSION"));

    // Config path precedence: CLI arg > HEIGHTS_CONFIG env var > default
    let mut config = match args.config {
        Some(path) => {
            info!(config_path = %path, "Loading configuration");
            heights_watch::AppConfig::from_file(&path)?
        }
        None => heights_watch::AppConfig::load()?,
    };

    if !args.symbols.is_empty() {
        config.symbols = args.symbols;
    }

    info!(feed_url = %config.hub.feed_url, symbols = ?config.symbols, "Configuration loaded");

    let mut app = heights_watch::Application::new(config)?;
    app.run().await?;

    Ok(())
}
