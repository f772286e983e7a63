//! Hello service - CLI binary.
//!
//! Answers every request on the root route with a greeting, counts it, and
//! exposes the count on `/metrics` for Prometheus to scrape.

use std::net::SocketAddr;

use anyhow::{Context, Result};
use clap::Parser;
use tracing::{info, warn};

use hello_metrics_common::{init_tracing, ColorWhen};
use hello_service::{run, ServiceConfig};

/// Hello service - counts root requests and exposes them to Prometheus
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    // ---
    /// Address to listen on (serves `/` and `GET /metrics`)
    #[arg(short, long, default_value = "0.0.0.0:8081")]
    listen: SocketAddr,

    /// Optional extra listener that serves only `GET /metrics`
    #[arg(long)]
    metrics_bind: Option<SocketAddr>,

    /// Value of the `process` label attached to every metric
    #[arg(long, default_value = "hello-service")]
    process_name: String,

    /// Coloring
    #[arg(long, value_enum, default_value = "auto")]
    color: ColorWhen,
}

impl Args {
    fn into_config(self) -> ServiceConfig {
        // ---
        let cfg = ServiceConfig::new(self.listen).with_process_name(self.process_name);
        match self.metrics_bind {
            Some(bind) => cfg.with_metrics_bind(bind),
            None => cfg,
        }
    }
}

/// Capture version number from Cargo.toml
const VERSION: &str = env!("CARGO_PKG_VERSION");

#[tokio::main]
async fn main() -> Result<()> {
    // ---
    let args = Args::parse();
    init_tracing(args.color)?;

    info!("Starting hello service v{VERSION}");
    info!("Listen address: {}", args.listen);
    if let Some(bind) = args.metrics_bind {
        info!("Metrics bind: {bind}");
    }

    run(args.into_config(), shutdown_signal())
        .await
        .context("hello service failed")
}

async fn shutdown_signal() {
    // ---
    match tokio::signal::ctrl_c().await {
        Ok(()) => info!("Ctrl-C received, shutting down"),
        Err(e) => warn!("failed to listen for Ctrl-C: {e}; running until killed"),
    }
}
