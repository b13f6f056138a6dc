//! OpenAI API relay.
//!
//! # Architecture Overview
//!
//! ```text
//!                      ┌──────────────────────────────────────────────┐
//!                      │                   RELAY                      │
//!   Client Request     │  ┌────────┐    ┌─────────┐    ┌───────────┐  │
//!   ───────────────────┼─▶│  http  │───▶│ routing │───▶│ preflight │  │
//!                      │  │ server │    │         │    └───────────┘  │
//!                      │  └────────┘    │         │    ┌───────────┐  │
//!                      │                │         │───▶│  static   │  │
//!                      │                │         │    │   files   │  │
//!                      │                │         │    └───────────┘  │
//!                      │                │         │    ┌───────────┐  │    Upstream
//!                      │                │         │───▶│ upstream  │──┼──▶ API
//!                      │                └─────────┘    │  client   │  │
//!                      │                               └───────────┘  │
//!                      │  Cross-cutting: config, security (headers,   │
//!                      │  paths), observability, lifecycle            │
//!                      └──────────────────────────────────────────────┘
//! ```

use std::path::PathBuf;

use clap::Parser;
use tokio::net::TcpListener;

use openai_relay::config::loader::load_or_default;
use openai_relay::lifecycle::signals;
use openai_relay::observability;
use openai_relay::RelayServer;

#[derive(Parser)]
#[command(name = "openai-relay")]
#[command(about = "Relay for the OpenAI API with static file serving", long_about = None)]
struct Cli {
    /// Path to a TOML configuration file.
    #[arg(short, long)]
    config: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    let config = load_or_default(cli.config.as_deref())?;

    observability::logging::init_tracing(&config.observability.log_level);

    tracing::info!("openai-relay v{} starting", env!("CARGO_PKG_VERSION"));
    tracing::info!(
        bind_address = %config.listener.bind_address,
        upstream = %config.upstream.base_url,
        response_timeout_secs = config.upstream.response_timeout_secs,
        "Configuration loaded"
    );

    if config.observability.metrics_enabled {
        match config.observability.metrics_address.parse() {
            Ok(addr) => observability::metrics::init_metrics(addr),
            Err(_) => tracing::error!(
                metrics_address = %config.observability.metrics_address,
                "Failed to parse metrics address"
            ),
        }
    }

    let server = RelayServer::new(config)?;
    let listener = TcpListener::bind(&server.config().listener.bind_address).await?;

    server.run(listener, signals::wait_for_signal()).await?;

    tracing::info!("Shutdown complete");
    Ok(())
}
