//! Server configuration.
//!
//! Loaded from a TOML file when one is supplied; every field has a default
//! so a bare `ServerConfig::default()` is a working local setup.

use std::net::SocketAddr;
use std::path::Path;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// A provisioned bearer token and the user it authenticates.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StaticToken {
    /// The bearer token value.
    pub token: String,
    /// The user id the token resolves to.
    pub user_id: String,
}

/// Top-level server configuration.
///
/// ```toml
/// bind_addr = "0.0.0.0:8080"
/// request_timeout_secs = 30
///
/// [[tokens]]
/// token = "dev-token"
/// user_id = "dev-user"
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    /// Address the HTTP server binds to.
    pub bind_addr: SocketAddr,
    /// Bound on request handling time, in seconds.
    pub request_timeout_secs: u64,
    /// Capacity of each per-user change-event channel.
    pub event_channel_capacity: usize,
    /// Provisioned bearer tokens.
    pub tokens: Vec<StaticToken>,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind_addr: ([127, 0, 0, 1], 8080).into(),
            request_timeout_secs: 30,
            event_channel_capacity: crate::server::events::DEFAULT_CHANNEL_CAPACITY,
            tokens: Vec::new(),
        }
    }
}

impl ServerConfig {
    /// Load configuration from a TOML file.
    pub fn from_toml_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let raw = std::fs::read_to_string(path)
            .map_err(|e| Error::internal(format!("failed to read {}: {e}", path.display())))?;
        toml::from_str(&raw)
            .map_err(|e| Error::internal(format!("failed to parse {}: {e}", path.display())))
    }

    /// The request timeout as a [`Duration`].
    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }
}
