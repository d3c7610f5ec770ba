//! quake-finder server.
//!
//! Serves the search pages (`/`, `/results`) and the JSON API that finds the
//! earthquake closest to a registered city.

use clap::Parser;
use std::path::PathBuf;
use tokio::net::TcpListener;

use quake_finder::config::load_or_default;
use quake_finder::lifecycle::wait_for_signal;
use quake_finder::observability::{logging, metrics};
use quake_finder::{HttpServer, Shutdown};

#[derive(Parser)]
#[command(name = "quake-finder")]
#[command(about = "Find the earthquake closest to a city", long_about = None)]
struct Args {
    /// Path to the TOML configuration file
    #[arg(short, long, default_value = "quake-finder.toml")]
    config: PathBuf,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();
    let config = load_or_default(&args.config)?;

    logging::init_logging(&config.observability);
    tracing::info!("quake-finder v{} starting", env!("CARGO_PKG_VERSION"));
    tracing::info!(
        bind_address = %config.listener.bind_address,
        cities = config.cities.len(),
        cache_ttl_secs = config.cache.ttl_secs,
        "Configuration loaded"
    );

    if config.observability.metrics_enabled {
        match config.observability.metrics_address.parse() {
            Ok(addr) => metrics::init_metrics(addr),
            Err(_) => tracing::error!(
                metrics_address = %config.observability.metrics_address,
                "Failed to parse metrics address"
            ),
        }
    }

    let listener = TcpListener::bind(&config.listener.bind_address).await?;
    let server = HttpServer::new(config)?;

    let shutdown = Shutdown::new();
    let trigger = shutdown.clone();
    tokio::spawn(async move {
        wait_for_signal().await;
        trigger.trigger();
    });

    server.run(listener, shutdown).await?;

    tracing::info!("Shutdown complete");
    Ok(())
}
