//! Edge router (v1)
//!
//! Front door for the web application, built with Tokio and Axum.
//!
//! # Architecture Overview
//!
//! ```text
//!                          ┌──────────────────────────────────────────────────┐
//!                          │                   EDGE ROUTER                     │
//!                          │                                                   │
//!     Client Request       │  ┌─────────┐    ┌──────────────┐                 │
//!     ─────────────────────┼─▶│  http   │───▶│   routing    │                 │
//!                          │  │ server  │    │ static>docs> │                 │
//!                          │  └─────────┘    │     app      │                 │
//!                          │                 └──┬────┬────┬─┘                 │
//!                          │                    │    │    │                   │
//!                          │          ┌─────────┘    │    └─────────┐         │
//!                          │          ▼              ▼              ▼         │
//!                          │   ┌────────────┐ ┌────────────┐ ┌────────────┐   │
//!                          │   │   assets   │ │  upstream  │ │   render   │───┼──▶ App origin
//!                          │   │  (store)   │ │  (fetch)   │ │ gate+origin│   │
//!                          │   └────────────┘ └─────┬──────┘ └────────────┘   │
//!                          │                        └─────────────────────────┼──▶ Docs origin
//!                          │                                                   │
//!                          │  config · observability · lifecycle               │
//!                          └──────────────────────────────────────────────────┘
//! ```

use std::net::SocketAddr;
use std::path::PathBuf;

use clap::Parser;
use tokio::net::TcpListener;

use edge_router::config::{load_config, EdgeConfig};
use edge_router::observability::{logging, metrics};
use edge_router::{Bindings, HttpServer, Shutdown};

#[derive(Parser)]
#[command(name = "edge-router")]
#[command(about = "Edge router: static assets, docs proxy, application renderer", long_about = None)]
struct Cli {
    /// Path to the TOML configuration file. Defaults are used when omitted.
    #[arg(short, long, env = "EDGE_ROUTER_CONFIG")]
    config: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    let config = match &cli.config {
        Some(path) => load_config(path)?,
        None => EdgeConfig::default(),
    };

    logging::init_logging(&config.observability)?;
    tracing::info!(version = env!("CARGO_PKG_VERSION"), "edge-router starting");

    tracing::info!(
        bind_address = %config.listener.bind_address,
        max_connections = config.listener.max_connections,
        docs_prefix = %config.docs.prefix,
        docs_origin = ?config.docs.origin,
        app_origin = %config.app.origin,
        asset_directory = ?config.assets.directory,
        "Configuration loaded"
    );

    if config.observability.metrics_enabled {
        let addr: SocketAddr = config.observability.metrics_address.parse()?;
        metrics::init_metrics(addr)?;
    }

    let bindings = Bindings::from_config(&config)?;

    let listener = TcpListener::bind(&config.listener.bind_address).await?;
    tracing::info!(address = %listener.local_addr()?, "Listening for connections");

    let shutdown = Shutdown::new();
    let server_shutdown = shutdown.subscribe();
    shutdown.trigger_on_signal();

    let server = HttpServer::new(config, bindings);
    server.run(listener, server_shutdown).await?;

    tracing::info!("Shutdown complete");
    Ok(())
}
