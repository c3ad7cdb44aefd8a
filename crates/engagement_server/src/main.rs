//! Engagement server entry point.
//!
//! 1. Parses CLI arguments and loads configuration
//! 2. Initializes logging
//! 3. Opens and migrates the store
//! 4. Serves HTTP until Ctrl-C

use clap::Parser;
use engagement_core::LogLevel;
use engagement_server::{Cli, HttpServer, ServerConfig, Store};
use std::error::Error;

#[tokio::main]
async fn main() {
    if let Err(err) = run().await {
        eprintln!("{err}");
        std::process::exit(1);
    }
}

async fn run() -> Result<(), Box<dyn Error>> {
    let cli = Cli::parse();
    let config = ServerConfig::from_cli(&cli)?;

    let level: LogLevel = config.log_level.parse()?;
    engagement_core::init_logging(level, &config.resolved_log_dir()?)?;

    let store = Store::open(&config.database_path)?;
    HttpServer::new(config, store).start().await?;
    Ok(())
}
