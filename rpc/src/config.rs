//! Sponsor service configuration with TOML file support.
//!
//! Signing keys are deliberately absent: they come from the environment only.

use std::net::SocketAddr;
use std::path::Path;

use freecpu_policy::PolicyConfig;
use freecpu_types::{NetworkId, NodeEndpoint, PermissionLevel};
use freecpu_utils::LogFormat;
use serde::{Deserialize, Serialize};

use crate::error::RpcError;

/// Configuration for the sponsor service.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ServiceConfig {
    /// Which network the sponsor signs for. Fixes the chain id.
    #[serde(default = "default_network")]
    pub network: NetworkId,

    /// Node used for header resolution. Defaults to the network's public node.
    #[serde(default)]
    pub node_url: Option<String>,

    #[serde(default = "default_bind_address")]
    pub bind_address: String,

    #[serde(default = "default_port")]
    pub port: u16,

    /// Permission the sponsor pays with, as `actor@permission`. Required.
    #[serde(with = "freecpu_types::text")]
    pub sponsor: PermissionLevel,

    /// Timeout for requests to the node, in seconds.
    #[serde(default = "default_chain_timeout_secs")]
    pub chain_timeout_secs: u64,

    #[serde(default)]
    pub log_format: LogFormat,

    #[serde(default = "default_log_level")]
    pub log_level: String,

    #[serde(default)]
    pub policy: PolicyConfig,
}

// ── Serde default helpers ──────────────────────────────────────────────

fn default_network() -> NetworkId {
    NetworkId::Kylin
}

fn default_bind_address() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    3031
}

fn default_chain_timeout_secs() -> u64 {
    30
}

fn default_log_level() -> String {
    "info".to_string()
}

// ── Impl ───────────────────────────────────────────────────────────────

impl ServiceConfig {
    /// Defaults for everything but the sponsor permission.
    pub fn new(sponsor: PermissionLevel) -> Self {
        Self {
            network: default_network(),
            node_url: None,
            bind_address: default_bind_address(),
            port: default_port(),
            sponsor,
            chain_timeout_secs: default_chain_timeout_secs(),
            log_format: LogFormat::default(),
            log_level: default_log_level(),
            policy: PolicyConfig::default(),
        }
    }

    pub fn from_toml_file(path: impl AsRef<Path>) -> Result<Self, RpcError> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)
            .map_err(|e| RpcError::Config(format!("{}: {e}", path.display())))?;
        Self::from_toml_str(&content)
    }

    pub fn from_toml_str(s: &str) -> Result<Self, RpcError> {
        toml::from_str(s).map_err(|e| RpcError::Config(e.to_string()))
    }

    pub fn to_toml_string(&self) -> Result<String, RpcError> {
        toml::to_string_pretty(self).map_err(|e| RpcError::Config(e.to_string()))
    }

    /// The configured node, or the network's default one.
    pub fn node_endpoint(&self) -> Result<NodeEndpoint, RpcError> {
        let url = self
            .node_url
            .as_deref()
            .unwrap_or_else(|| self.network.default_endpoint());
        url.parse()
            .map_err(|e| RpcError::Config(format!("node_url: {e}")))
    }

    pub fn listen_addr(&self) -> Result<SocketAddr, RpcError> {
        format!("{}:{}", self.bind_address, self.port)
            .parse()
            .map_err(|e| RpcError::Config(format!("bind address: {e}")))
    }
}
