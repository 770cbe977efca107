//! Seat Rush server
//!
//! ```sh
//! # Run with default config (~/.config/seat-rush/config.toml)
//! seat-rush
//!
//! # Custom config path and port
//! seat-rush --config /etc/seat-rush/config.toml --port 8080
//!
//! # Validate config without starting
//! seat-rush --check
//! ```

use std::path::PathBuf;

use clap::Parser;
use tracing::{error, info};

use seat_rush::config::{default_config_path, AppConfig};
use seat_rush::server::{init_tracing, ServerHandle, ServerOptions};

/// Flash-sale slot reservation server for limited-capacity courses.
#[derive(Parser, Debug)]
#[command(
    name = "seat-rush",
    version,
    about = "Flash-sale slot reservation server",
    long_about = "Seat Rush: atomic slot counters, a durable order ledger and \
                  reconciliation behind a small REST API.\n\n\
                  Default config: ~/.config/seat-rush/config.toml"
)]
struct Cli {
    /// Path to the configuration file (TOML).
    #[arg(short, long, env = "SEAT_RUSH_CONFIG")]
    config: Option<PathBuf>,

    /// Override the HTTP listen port.
    #[arg(short, long)]
    port: Option<u16>,

    /// Override the log level (trace, debug, info, warn, error).
    #[arg(short, long)]
    log_level: Option<String>,

    /// Validate the configuration file and exit without starting the server.
    #[arg(long)]
    check: bool,

    /// Skip database migrations on startup.
    #[arg(long)]
    no_migrate: bool,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    let config_path = cli.config.unwrap_or_else(default_config_path);

    let mut config = match AppConfig::load(&config_path) {
        Ok(cfg) => cfg,
        Err(e) if cli.check => {
            eprintln!("❌ Invalid configuration {}: {}", config_path.display(), e);
            std::process::exit(1);
        }
        Err(e) => return Err(e.into()),
    };

    if let Some(ref level) = cli.log_level {
        config.logging.level = level.clone();
    }
    if let Some(port) = cli.port {
        config.server.port = port;
    }

    if cli.check {
        println!("✅ Configuration is valid");
        println!("   Config file : {}", config_path.display());
        println!("   Address     : {}", config.server.address());
        println!("   Database    : {}", config.database.url);
        println!("   Slot store  : {:?}", config.slot_store.backend);
        println!("   Ledger      : {:?}", config.ledger.backend);
        println!("   Offerings   : {}", config.offerings.len());
        return Ok(());
    }

    init_tracing(&config);
    info!("Configuration loaded from {}", config_path.display());

    let handle = match ServerHandle::start(ServerOptions {
        config,
        auto_migrate: !cli.no_migrate,
    })
    .await
    {
        Ok(handle) => handle,
        Err(e) => {
            error!(error = %e, "Failed to start");
            return Err(e);
        }
    };

    handle.install_signal_handler();
    info!("🚀 Press Ctrl+C to shutdown gracefully.");

    handle.shutdown_signal().wait().await;
    handle.wait().await;
    Ok(())
}
