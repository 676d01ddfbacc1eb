//! Recon/honeypot HTTP listener.
//!
//! A sacrificial endpoint built with Tokio and Axum: every inbound probe is
//! recorded, known attack paths get decoy payloads, everything else hostile
//! is stalled in a tarpit stream, and CONNECT tunnel requests are answered
//! from a resolution cache.

use std::path::PathBuf;

use clap::Parser;
use tokio::net::TcpListener;

use recon_listener::config::{load_config, ReconConfig};
use recon_listener::http::HttpServer;
use recon_listener::lifecycle::{signals, Shutdown};
use recon_listener::net::tls;
use recon_listener::observability::{logging, metrics};

#[derive(Parser)]
#[command(name = "recon-listener", version, about = "Recon/honeypot HTTP listener")]
struct Cli {
    /// Path to a TOML configuration file. Defaults apply when omitted.
    #[arg(long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Override the configured bind address.
    #[arg(long, value_name = "ADDR")]
    bind: Option<String>,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    logging::init("recon_listener=debug,tower_http=debug");

    tracing::info!("recon-listener v0.1.0 starting");

    let mut config = match &cli.config {
        Some(path) => load_config(path)?,
        None => ReconConfig::default(),
    };
    if let Some(bind) = cli.bind {
        config.listener.bind_address = bind;
    }

    tracing::info!(
        bind_address = %config.listener.bind_address,
        public_port = config.listener.effective_port(),
        tarpit_enabled = config.tarpit.enabled,
        tarpit_max_chunks = config.tarpit.max_chunks,
        connect_probe = config.connect.probe_enabled,
        "Configuration loaded"
    );

    if config.observability.metrics_enabled {
        if let Ok(addr) = config.observability.metrics_address.parse() {
            metrics::init_metrics(addr);
        } else {
            tracing::error!(
                metrics_address = %config.observability.metrics_address,
                "Failed to parse metrics address"
            );
        }
    }

    let shutdown = Shutdown::new();
    signals::spawn_signal_handler(&shutdown);

    let server = HttpServer::new(config.clone())?;

    if let Some(tls_config) = &config.listener.tls {
        let rustls = tls::load_tls_config(
            tls_config.cert_path.as_ref(),
            tls_config.key_path.as_ref(),
        )
        .await?;
        let addr = config.listener.bind_address.parse()?;
        server.run_tls(addr, rustls, shutdown.subscribe()).await?;
    } else {
        let listener = TcpListener::bind(&config.listener.bind_address).await?;
        server.run(listener, shutdown.subscribe()).await?;
    }

    tracing::info!("Shutdown complete");
    Ok(())
}
