//! Chat relay server entry point

use chat_relay::{RelayConfig, RelayServer};
use clap::Parser;
use std::path::PathBuf;
use tracing::{error, info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Configuration file path (TOML, or JSON with a .json extension)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Bind address
    #[arg(long)]
    bind_address: Option<String>,

    /// Port
    #[arg(short, long)]
    port: Option<u16>,

    /// Maximum connections
    #[arg(long)]
    max_connections: Option<usize>,

    /// Per-client outbound queue capacity
    #[arg(long)]
    outbound_capacity: Option<usize>,

    /// Maximum encoded envelope size in bytes
    #[arg(long)]
    max_frame_size: Option<u64>,

    /// Seconds to wait for connections to close on shutdown
    #[arg(long)]
    shutdown_timeout_secs: Option<u64>,

    /// Echo a client's own messages back to it
    #[arg(long)]
    echo_own_messages: bool,
}

impl Args {
    fn apply(self, mut config: RelayConfig) -> RelayConfig {
        if let Some(bind_address) = self.bind_address {
            config.bind_address = bind_address;
        }
        if let Some(port) = self.port {
            config.port = port;
        }
        if let Some(max_connections) = self.max_connections {
            config.max_connections = max_connections;
        }
        if let Some(outbound_capacity) = self.outbound_capacity {
            config.actor.outbound_capacity = outbound_capacity;
        }
        if let Some(max_frame_size) = self.max_frame_size {
            config.max_frame_size = max_frame_size;
        }
        if let Some(shutdown_timeout_secs) = self.shutdown_timeout_secs {
            config.shutdown_timeout_secs = shutdown_timeout_secs;
        }
        if self.echo_own_messages {
            config.actor.echo_own_messages = true;
        }
        config
    }
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "chat_relay=info,messaging_actors=info,warn".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let args = Args::parse();

    info!("Starting Chat Relay");
    info!("Version: {}", env!("CARGO_PKG_VERSION"));

    let config = match &args.config {
        Some(path) => RelayConfig::load(path).await?,
        None => RelayConfig::default(),
    };
    let config = args.apply(config);

    info!("Configuration loaded: {:?}", config);

    let server = RelayServer::new(config);

    let shutdown_signal = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            error!("Failed to listen for shutdown signal: {}", e);
            std::future::pending::<()>().await;
        }
        info!("Shutdown signal received");
    };

    tokio::select! {
        result = server.start() => {
            if let Err(e) = result {
                error!("Relay server error: {}", e);
                return Err(e.into());
            }
        }
        _ = shutdown_signal => {
            info!("Shutting down relay server");
            if !server.shutdown("server shutting down").await {
                warn!("Some connections did not close before the shutdown timeout");
            }
        }
    }

    Ok(())
}
