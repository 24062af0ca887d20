//! Round-robin HTTP load balancer.
//!
//! # Architecture Overview
//!
//! ```text
//!     Client Request     ┌──────────┐   select_next()   ┌──────────┐
//!     ──────────────────▶│  http    │──────────────────▶│ registry │
//!                        │  server  │◀──────────────────│ + cursor │
//!     Client Response    │          │      Backend      └────▲─────┘
//!     ◀──────────────────│ forward  │                        │ set_alive()
//!                        └────┬─────┘                  ┌─────┴─────┐
//!                             │ outbound request       │  health   │
//!                             ▼                        │  monitor  │
//!                        ┌──────────┐   GET <path>     └─────┬─────┘
//!                        │ backend  │◀───────────────────────┘
//!                        └──────────┘
//! ```

use std::path::PathBuf;
use std::process::ExitCode;

use clap::Parser;

use http_balancer::config::loader::read_config;
use http_balancer::config::BalancerConfig;
use http_balancer::lifecycle::{signals, startup, Shutdown};
use http_balancer::observability::{logging, metrics};

#[derive(Parser, Debug)]
#[command(name = "http-balancer")]
#[command(about = "Round-robin HTTP load balancer with active health checks", long_about = None)]
struct Cli {
    /// Optional TOML configuration file; flags override its values.
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Port to run the load balancer on [default: 80]
    #[arg(long)]
    port: Option<u16>,

    /// Path to use for health checks [default: /]
    #[arg(long)]
    health: Option<String>,

    /// Health check interval in seconds [default: 30]
    #[arg(long)]
    interval: Option<u64>,

    /// Backend server URL (can be specified multiple times)
    #[arg(long = "server", value_name = "URL")]
    servers: Vec<String>,

    /// Log filter when RUST_LOG is not set (e.g. "info", "debug")
    #[arg(long)]
    log_level: Option<String>,
}

impl Cli {
    /// Merge flags over the file (or built-in defaults).
    fn into_config(self) -> Result<BalancerConfig, http_balancer::config::ConfigError> {
        let mut config = match &self.config {
            Some(path) => read_config(path)?,
            None => BalancerConfig::default(),
        };

        if let Some(port) = self.port {
            config.listener.port = port;
        }
        if let Some(path) = self.health {
            config.health_check.path = path;
        }
        if let Some(interval) = self.interval {
            config.health_check.interval_secs = interval;
        }
        if !self.servers.is_empty() {
            config.backends = self.servers;
        }
        if let Some(level) = self.log_level {
            config.observability.log_level = level;
        }
        Ok(config)
    }
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();
    let config = match cli.into_config() {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Failed to load configuration: {}", e);
            return ExitCode::FAILURE;
        }
    };

    logging::init(&config.observability.log_level);
    tracing::info!("http-balancer v{} starting", env!("CARGO_PKG_VERSION"));

    if config.observability.metrics_enabled {
        match config.observability.metrics_address.parse::<std::net::SocketAddr>() {
            Ok(addr) => {
                if let Err(e) = metrics::init_metrics(addr) {
                    tracing::error!(error = %e, "Failed to start metrics exporter");
                }
            }
            Err(e) => tracing::error!(
                metrics_address = %config.observability.metrics_address,
                error = %e,
                "Failed to parse metrics address"
            ),
        }
    }

    let shutdown = Shutdown::new();
    let server = startup::serve(config, &shutdown);
    tokio::pin!(server);

    let result = tokio::select! {
        res = &mut server => res,
        _ = signals::wait_for_signal() => {
            shutdown.trigger();
            server.await
        }
    };

    match result {
        Ok(()) => {
            tracing::info!("Shutdown complete");
            ExitCode::SUCCESS
        }
        Err(e) => {
            tracing::error!(error = %e, "Load balancer failed");
            ExitCode::FAILURE
        }
    }
}
