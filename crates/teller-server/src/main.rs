//! # Secure-Teller Server
//!
//! PSK-authenticated account service.
//!
//! ```text
//! Acceptor ──► Session task ──► Handshake (MS) ──► k_enc, k_mac
//!                                                      │
//!                         ledger / audit ◄── request loop (envelopes)
//! ```

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Parser;
use teller_server::{ServerConfig, TellerRuntime, TellerServices};
use teller_telemetry::{encode_metrics, init_telemetry, TelemetryConfig};
use tokio::net::TcpListener;
use tracing::{debug, info, warn};

/// Secure-Teller account service
#[derive(Parser, Debug)]
#[command(name = "teller-server", version)]
#[command(about = "PSK-authenticated account service")]
struct Args {
    /// TOML configuration file (overrides ST_CONFIG)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Listen address, e.g. 127.0.0.1:65432 (overrides config and ST_BIND_ADDR)
    #[arg(short, long)]
    bind: Option<String>,

    /// Refuse to start with development secrets
    #[arg(long)]
    production: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    let _telemetry = init_telemetry(TelemetryConfig::for_component("teller-server"))
        .context("Failed to initialize telemetry")?;

    let mut config =
        ServerConfig::load(args.config.as_deref()).context("Failed to load configuration")?;
    if let Some(bind) = args.bind {
        config.network.bind_addr = bind;
    }

    match config.validate_for_production() {
        Ok(()) => {}
        Err(e) if args.production => return Err(e).context("Configuration rejected"),
        Err(e) => warn!("Development configuration: {}", e),
    }

    info!("===========================================");
    info!("  Secure-Teller Server v{}", env!("CARGO_PKG_VERSION"));
    info!("===========================================");

    let services = TellerServices::from_config(&config).await?;
    let runtime = Arc::new(TellerRuntime::new(services, config.network.max_sessions));

    let listener = TcpListener::bind(&config.network.bind_addr)
        .await
        .with_context(|| format!("Failed to bind {}", config.network.bind_addr))?;

    let server = tokio::spawn({
        let runtime = Arc::clone(&runtime);
        async move { runtime.serve(listener).await }
    });

    info!("Server is running. Press Ctrl+C to stop.");
    tokio::signal::ctrl_c()
        .await
        .context("Failed to listen for Ctrl+C")?;

    runtime.shutdown();
    server.await.context("Acceptor task panicked")??;

    match encode_metrics() {
        Ok(metrics) => debug!("Final metrics:\n{}", metrics),
        Err(e) => warn!("Failed to encode metrics: {}", e),
    }
    Ok(())
}
