//! Campus API gateway.
//!
//! # Architecture Overview
//!
//! ```text
//!                    ┌──────────────────────────────────────────────┐
//!                    │                   GATEWAY                     │
//!   Client Request   │  ┌────────┐   ┌────────┐   ┌──────────────┐  │
//!   ─────────────────┼─▶│ http   │──▶│  api   │──▶│ catalog /    │  │
//!                    │  │ server │   │handlers│   │ accounts     │  │
//!                    │  └────────┘   └────────┘   └──────┬───────┘  │
//!                    │                                   ▼          │
//!   Client Response  │                            ┌──────────────┐  │      Managed
//!   ◀────────────────┼────────────────────────────│  upstream    │◀─┼───── data/auth
//!                    │                            │  client      │  │      backend
//!                    │                            └──────────────┘  │
//!                    │  config · observability · security · lifecycle│
//!                    └──────────────────────────────────────────────┘
//! ```

use std::path::PathBuf;

use clap::Parser;
use tokio::net::TcpListener;

use campus_gateway::config::{load_runtime_config, ObservabilityConfig};
use campus_gateway::lifecycle::{spawn_signal_handler, Shutdown};
use campus_gateway::observability::{logging, metrics};
use campus_gateway::GatewayServer;

#[derive(Parser, Debug)]
#[command(name = "campus-gateway", version, about = "Campus API gateway")]
struct Args {
    /// Optional TOML config file; environment variables override it.
    #[arg(short, long, env = "GATEWAY_CONFIG")]
    config: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();

    let config = match load_runtime_config(args.config.as_deref()) {
        Ok(config) => config,
        Err(e) => {
            logging::init_logging(&ObservabilityConfig::default(), Default::default());
            tracing::error!(error = %e, "Invalid configuration");
            std::process::exit(1);
        }
    };

    logging::init_logging(&config.observability, config.environment);
    tracing::info!(
        version = env!("CARGO_PKG_VERSION"),
        environment = config.environment.as_str(),
        "campus-gateway starting"
    );

    if config.observability.metrics_enabled {
        match config.observability.metrics_address.parse() {
            Ok(addr) => metrics::init_metrics(addr),
            Err(e) => tracing::error!(
                metrics_address = %config.observability.metrics_address,
                error = %e,
                "Failed to parse metrics address"
            ),
        }
    }

    let bind_address = config.listener.bind_address.clone();
    let server = match GatewayServer::from_config(config) {
        Ok(server) => server,
        Err(e) => {
            tracing::error!(error = %e, "Failed to create upstream client");
            std::process::exit(1);
        }
    };

    let listener = TcpListener::bind(&bind_address).await?;
    tracing::info!(address = %listener.local_addr()?, "Listening for connections");

    let shutdown = Shutdown::new();
    spawn_signal_handler(&shutdown);
    server.run(listener, shutdown.subscribe()).await?;

    tracing::info!("Shutdown complete");
    Ok(())
}
