//! Logging HTTP proxy.
//!
//! ```text
//!     Client Request            ┌──────────────────────────────────────────────┐
//!     ──────────────────────────┼─▶ listener ─▶ http server (catch-all route)  │
//!                               │                     │                        │
//!                               │                     ▼                        │
//!                               │   LoggingDecorator ─▶ ResponseObserver       │
//!                               │                     │                        │
//!                               │                     ▼                        │
//!     Client Response           │               ProxyHandler ── GET ──────────┼──▶ Upstream
//!     ◀─────────────────────────┼── BufferedResponse ◀─ status + body ◀───────┼───
//!                               │                                              │
//!                               │   one JSON line per request ─▶ stdout        │
//!                               └──────────────────────────────────────────────┘
//! ```
//!
//! Configuration comes from an optional TOML file, then `PORT`, `LOG_LEVEL`,
//! `UPSTREAM_TIMEOUT_SECS` and `MAX_BODY_BYTES`, then command-line flags.

use std::path::PathBuf;

use clap::Parser;

use logging_proxy::config::{self, ConfigError, ProxyConfig};
use logging_proxy::http::HttpServer;
use logging_proxy::lifecycle::{wait_for_signal, Shutdown};
use logging_proxy::net;
use logging_proxy::observability::{level_or_default, Logger};

#[derive(Parser)]
#[command(name = "logging-proxy")]
#[command(about = "HTTP proxy that logs one JSON line per request", long_about = None)]
struct Cli {
    /// TOML configuration file.
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Listen port (overrides PORT).
    #[arg(short, long)]
    port: Option<u16>,

    /// Log level (overrides LOG_LEVEL).
    #[arg(long)]
    log_level: Option<String>,
}

/// Load the file and environment layers, then apply command-line overrides.
fn load_config(cli: &Cli) -> Result<ProxyConfig, ConfigError> {
    let mut config = config::load(cli.config.as_deref())?;
    if let Some(port) = cli.port {
        config.listener.port = port;
    }
    if let Some(level) = &cli.log_level {
        config.observability.log_level = level.clone();
    }
    Ok(config)
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    let config = match load_config(&cli) {
        Ok(config) => config,
        Err(err) => {
            // No configuration yet, so the level comes from the flag or LOG_LEVEL alone.
            let level = cli
                .log_level
                .clone()
                .or_else(|| std::env::var(config::loader::ENV_LOG_LEVEL).ok())
                .unwrap_or_default();
            Logger::stdout(level_or_default(&level)).in_scope(|| {
                tracing::error!(event = "load config", error = %err, "failed to load configuration");
            });
            std::process::exit(1);
        }
    };

    let logger = Logger::stdout(level_or_default(&config.observability.log_level));
    logger.install_global()?;

    tracing::info!(addr = %config.listener.address(), "starting server");

    let listener = match net::bind(&config.listener).await {
        Ok(listener) => listener,
        Err(err) => {
            tracing::error!(event = "start server", error = %err, "failed to start server");
            std::process::exit(1);
        }
    };

    let shutdown = Shutdown::new();
    tokio::spawn(wait_for_signal(shutdown.clone()));

    let server = HttpServer::new(&config, logger)?;
    server.run(listener, shutdown.subscribe()).await?;

    tracing::info!("Shutdown complete");
    Ok(())
}
