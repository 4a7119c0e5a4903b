//! Circuit-breaking HTTP gateway.
//!
//! # Architecture Overview
//!
//! ```text
//!                     ┌──────────────────────────────────────────────┐
//!                     │                 GATEWAY                      │
//!   Client Request    │  ┌────────┐   ┌──────────┐   ┌────────────┐  │
//!   ──────────────────┼─▶│  http  │──▶│ endpoint │──▶│  circuit   │  │
//!                     │  │ server │   │ handler  │   │  breaker   │  │
//!                     │  └────────┘   └──────────┘   └─────┬──────┘  │
//!                     │                                    │ admit   │
//!                     │                                    ▼         │
//!   Client Response   │  ┌──────────────────┐        ┌────────────┐  │
//!   ◀─────────────────┼──│ 200 payload /    │◀───────│  upstream  │◀─┼── Upstream
//!                     │  │ 503 {"error"}    │        │   client   │  │   Service
//!                     │  └──────────────────┘        └────────────┘  │
//!                     │                                              │
//!                     │  config · observability · admin · lifecycle  │
//!                     └──────────────────────────────────────────────┘
//! ```

use clap::Parser;
use std::path::PathBuf;

use breaker_gateway::config::loader::load_config;
use breaker_gateway::lifecycle::startup;
use breaker_gateway::observability::logging::init_logging;

#[derive(Parser)]
#[command(name = "breaker-gateway")]
#[command(about = "HTTP gateway protecting upstream endpoints with circuit breakers", long_about = None)]
struct Cli {
    /// Path to the TOML configuration file.
    #[arg(short, long, default_value = "config/gateway.toml")]
    config: PathBuf,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    let config = load_config(&cli.config)?;

    init_logging(&config.observability);

    tracing::info!(
        config = %cli.config.display(),
        bind_address = %config.listener.bind_address,
        endpoints = config.endpoints.len(),
        failure_threshold = config.breaker.failure_threshold,
        success_threshold = config.breaker.success_threshold,
        open_duration_ms = config.breaker.open_duration_ms,
        "Configuration loaded"
    );

    startup::run(config).await?;

    tracing::info!("Shutdown complete");
    Ok(())
}
