//! Exchange Edge Gateway
//!
//! Single public entry point for the exchange's web applications. One
//! ordered mount table decides which upstream application owns each
//! request path; everything else about those applications stays behind
//! their own origins.
//!
//! # Architecture Overview
//!
//! ```text
//!                      ┌────────────────────────────────────────────┐
//!                      │                EDGE GATEWAY                │
//!                      │                                            │
//!   Client Request     │  ┌─────────┐    ┌───────────────────────┐  │
//!   ───────────────────┼─▶│  http   │───▶│     mount table       │  │
//!                      │  │ server  │    │  admin/    → admin    │  │
//!                      │  └─────────┘    │  ""        → dashboard│  │
//!                      │                 │  ""        → users    │  │
//!                      │                 │  ""        → trading  │  │
//!                      │                 │  ""        → metrics  │  │
//!                      │                 └──────────┬────────────┘  │
//!                      │                            │               │
//!   Client Response    │  ┌─────────┐    ┌──────────▼────────────┐  │
//!   ◀──────────────────┼──│response │◀───│     upstream map      │◀─┼── Upstream
//!                      │  │sanitize │    │    (name → origin)    │  │    Apps
//!                      │  └─────────┘    └───────────────────────┘  │
//!                      │                                            │
//!                      │  ┌──────────────────────────────────────┐  │
//!                      │  │        Cross-Cutting Concerns        │  │
//!                      │  │  config  observability  lifecycle    │  │
//!                      │  │  admin API (separate bind address)   │  │
//!                      │  └──────────────────────────────────────┘  │
//!                      └────────────────────────────────────────────┘
//! ```

use clap::Parser;
use tokio::net::TcpListener;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use exchange_gateway::admin::setup_admin_router;
use exchange_gateway::config::{load_config, GatewayConfig};
use exchange_gateway::http::HttpServer;
use exchange_gateway::lifecycle::{signals, Shutdown};
use exchange_gateway::observability::metrics;

/// Edge gateway dispatching requests to the exchange applications.
#[derive(Parser, Debug)]
#[command(name = "exchange-gateway", version, about)]
struct Args {
    /// Path to the TOML configuration file. Built-in defaults apply if omitted.
    #[arg(short, long)]
    config: Option<std::path::PathBuf>,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();

    // Config comes first so its log level can seed the subscriber
    let (config, config_file) = match &args.config {
        Some(path) => (load_config(path)?, Some(path.display().to_string())),
        None => (GatewayConfig::default(), None),
    };

    let default_directive = format!(
        "exchange_gateway={level},tower_http={level}",
        level = config.observability.log_level
    );
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(&default_directive)),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    tracing::info!(version = env!("CARGO_PKG_VERSION"), "exchange-gateway starting");
    match &config_file {
        Some(path) => tracing::info!(config_file = %path, "Configuration loaded"),
        None => tracing::info!("No config file given, using built-in defaults"),
    }

    tracing::info!(
        bind_address = %config.listener.bind_address,
        mounts = config.mounts.len(),
        upstreams = config.upstreams.len(),
        request_timeout_secs = config.timeouts.request_secs,
        "Gateway configured"
    );

    // Metrics exporter on its own listener
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

    // Bind the dispatch listener
    let listener = TcpListener::bind(&config.listener.bind_address).await?;
    tracing::info!(address = %listener.local_addr()?, "Listening for connections");

    let shutdown = Shutdown::new();
    let server = HttpServer::new(config);

    // Admin API on its own listener, never on the dispatch one
    if server.config().admin.enabled {
        let admin_listener = TcpListener::bind(&server.config().admin.bind_address).await?;
        tracing::info!(address = %admin_listener.local_addr()?, "Admin API listening");

        let admin_router = setup_admin_router(server.state());
        let admin_shutdown = shutdown.subscribe();
        tokio::spawn(async move {
            if let Err(e) = axum::serve(admin_listener, admin_router)
                .with_graceful_shutdown(signals::shutdown_signal(admin_shutdown))
                .await
            {
                tracing::error!(error = %e, "Admin server error");
            }
        });
    }

    server.run(listener, shutdown.subscribe()).await?;

    tracing::info!("Shutdown complete");
    Ok(())
}
