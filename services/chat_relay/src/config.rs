//! Relay server configuration

use crate::error::{RelayError, Result};
use codec::DEFAULT_MAX_FRAME_SIZE;
use messaging_actors::ActorConfig;
use serde::{Deserialize, Serialize};
use std::net::SocketAddr;
use std::path::Path;
use std::time::Duration;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RelayConfig {
    /// WebSocket server bind address
    pub bind_address: String,

    /// WebSocket server port
    pub port: u16,

    /// Maximum number of concurrent client connections
    pub max_connections: usize,

    /// Largest encoded envelope accepted or sent, in bytes
    pub max_frame_size: u64,

    /// How long shutdown waits for connections to finish, in seconds
    pub shutdown_timeout_secs: u64,

    /// Per-client actor settings
    pub actor: ActorConfig,
}

impl Default for RelayConfig {
    fn default() -> Self {
        Self {
            bind_address: "127.0.0.1".to_string(),
            port: 8080,
            max_connections: 1000,
            max_frame_size: DEFAULT_MAX_FRAME_SIZE,
            shutdown_timeout_secs: 5,
            actor: ActorConfig::default(),
        }
    }
}

impl RelayConfig {
    /// Load from a TOML file, or JSON when the extension is `.json`
    pub async fn load(path: &Path) -> Result<Self> {
        let contents = tokio::fs::read_to_string(path).await?;

        if path.extension().and_then(|s| s.to_str()) == Some("json") {
            Ok(serde_json::from_str(&contents)?)
        } else {
            Ok(toml::from_str(&contents)?)
        }
    }

    pub fn shutdown_timeout(&self) -> Duration {
        Duration::from_secs(self.shutdown_timeout_secs)
    }

    pub fn socket_addr(&self) -> Result<SocketAddr> {
        format!("{}:{}", self.bind_address, self.port)
            .parse()
            .map_err(|e| RelayError::Configuration {
                message: format!("Invalid bind address: {}", e),
            })
    }
}
