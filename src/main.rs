//! Multi-tenant site server.
//!
//! # Architecture Overview
//!
//! ```text
//!     Client Request (Host: blog.test, GET /paths/blog/my-post)
//!          │
//!          ▼
//!     ┌──────────┐   ┌─────────────┐   ┌──────────┐   ┌──────────────┐
//!     │  http    │──▶│ host switch │──▶│ session  │──▶│ controller   │
//!     │  server  │   │  (tenancy)  │   │          │   │ map dispatch │
//!     └──────────┘   └─────────────┘   └──────────┘   └──────┬───────┘
//!                                                            │
//!                         ┌──────────────────────────────────┤
//!                         ▼                                  ▼
//!                  ┌──────────────┐                  ┌──────────────┐
//!                  │ path resolver│                  │   element    │
//!                  │ (fallback)   │                  │  assembler   │
//!                  └──────┬───────┘                  └──────┬───────┘
//!                         └────────────┬─────────────────────┘
//!                                      ▼
//!                              ┌──────────────┐
//!                              │ site store   │
//!                              │ (pooled)     │
//!                              └──────────────┘
//! ```

use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use clap::Parser;
use tokio::net::TcpListener;

use site_switch::config::loader::{load_server_config, load_sites};
use site_switch::config::validation::validate_sites;
use site_switch::config::ConfigError;
use site_switch::lifecycle::{build_registry, shutdown_signal, SessionSweeper, Shutdown};
use site_switch::net::load_tls_config;
use site_switch::observability::{logging, metrics};
use site_switch::{ControllerRegistry, HttpServer};

#[derive(Parser, Debug)]
#[command(name = "site-switch")]
#[command(about = "Multi-tenant site server", long_about = None)]
struct Args {
    /// Server configuration file.
    #[arg(short, long, default_value = "/etc/site-switch/server.toml")]
    config: PathBuf,

    /// Directory of per-site configuration files. Overrides `sites_directory`.
    #[arg(short, long)]
    sites_dir: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();

    let config = load_server_config(&args.config)?;
    logging::init_logging(&config.observability);

    tracing::info!("site-switch v{} starting", env!("CARGO_PKG_VERSION"));

    let sites_dir = args
        .sites_dir
        .unwrap_or_else(|| PathBuf::from(&config.sites_directory));
    let sites = load_sites(&sites_dir)?;

    let controllers = ControllerRegistry::with_builtins();
    validate_sites(&sites, &controllers.names()).map_err(ConfigError::Validation)?;

    let registry = build_registry(&config, &sites_dir, &sites)?;

    tracing::info!(
        bind_address = %config.listener.bind_address,
        sites = registry.len(),
        request_timeout_secs = config.timeouts.request_secs,
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

    let shutdown = Arc::new(Shutdown::new());
    let receiver = shutdown.subscribe();
    {
        let shutdown = Arc::clone(&shutdown);
        tokio::spawn(async move {
            shutdown_signal().await;
            shutdown.trigger();
        });
    }

    let registry = Arc::new(registry);
    let sweeper = SessionSweeper::new(
        Arc::clone(&registry),
        Duration::from_secs(config.sessions.sweep_interval_secs),
    );
    tokio::spawn(sweeper.run(shutdown.subscribe()));

    let tls = config.listener.tls.clone();
    let bind_address = config.listener.bind_address.clone();
    let server = HttpServer::new(config, registry, Arc::new(controllers));

    match tls {
        Some(tls) => {
            let addr: SocketAddr = bind_address.parse()?;
            let tls = load_tls_config(&tls).await?;
            server.run_tls(addr, tls, receiver).await?;
        }
        None => {
            let listener = TcpListener::bind(&bind_address).await?;
            tracing::info!(address = %listener.local_addr()?, "Listening for connections");
            server.run(listener, receiver).await?;
        }
    }

    tracing::info!("Shutdown complete");
    Ok(())
}
