use std::process::ExitCode;
use std::sync::Arc;

use clap::{Parser, Subcommand};

use http_balancer::config::validation::validate_health_path;
use http_balancer::config::HealthCheckConfig;
use http_balancer::health::HealthMonitor;
use http_balancer::load_balancer::Registry;

#[derive(Parser)]
#[command(name = "lbctl")]
#[command(about = "Operator CLI for the HTTP load balancer", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Print the balancer's /lb-stats report
    Stats {
        #[arg(short, long, default_value = "http://localhost:80")]
        url: String,
    },
    /// Run one health probe cycle against the given backends
    Check {
        /// Backend server URL (can be specified multiple times)
        #[arg(long = "server", value_name = "URL", required = true)]
        servers: Vec<String>,

        #[arg(long, default_value = "/")]
        health: String,

        /// Per-probe timeout in seconds
        #[arg(long, default_value_t = 5)]
        timeout: u64,
    },
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();
    let result = match cli.command {
        Commands::Stats { url } => stats(&url).await,
        Commands::Check {
            servers,
            health,
            timeout,
        } => check(&servers, health, timeout).await,
    };

    match result {
        Ok(code) => code,
        Err(e) => {
            eprintln!("Error: {}", e);
            ExitCode::FAILURE
        }
    }
}

async fn stats(url: &str) -> Result<ExitCode, Box<dyn std::error::Error>> {
    let res = reqwest::get(format!("{}/lb-stats", url.trim_end_matches('/'))).await?;
    let status = res.status();
    let body = res.text().await?;
    if !status.is_success() {
        eprintln!("Error: balancer returned status {}", status);
        eprintln!("Response: {}", body);
        return Ok(ExitCode::FAILURE);
    }
    print!("{}", body);
    Ok(ExitCode::SUCCESS)
}

async fn check(
    servers: &[String],
    path: String,
    timeout_secs: u64,
) -> Result<ExitCode, Box<dyn std::error::Error>> {
    validate_health_path(&path)?;
    let registry = Arc::new(Registry::from_addresses(servers)?);
    let config = HealthCheckConfig {
        path,
        timeout_secs,
        ..Default::default()
    };

    HealthMonitor::new(registry.clone(), config).check_all().await;

    let mut all_up = true;
    for backend in registry.backends() {
        let status = if backend.is_alive() { "UP" } else { "DOWN" };
        all_up &= backend.is_alive();
        println!("{}: {}", backend, status);
    }
    Ok(if all_up { ExitCode::SUCCESS } else { ExitCode::FAILURE })
}
