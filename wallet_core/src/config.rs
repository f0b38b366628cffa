//! Client configuration with TOML file support.
//!
//! Private keys are never read from here; see `FREECPU_CLIENT_KEY`.

use std::path::Path;
use std::time::Duration;

use freecpu_types::{HeaderHints, Name, NetworkId, NodeEndpoint, PermissionLevel};
use freecpu_utils::LogFormat;
use serde::{Deserialize, Serialize};

use crate::error::WalletError;
use crate::transaction_builder::DEFAULT_TOKEN_CONTRACT;

/// Where the sponsor lives and which permission it pays with.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct SponsorConfig {
    /// Sponsor service origin, e.g. `http://127.0.0.1:3031`.
    pub url: String,

    #[serde(with = "freecpu_types::text")]
    pub permission: PermissionLevel,

    /// Bound on the whole sponsor round trip.
    #[serde(default = "default_sponsor_timeout_ms")]
    pub timeout_ms: u64,
}

impl SponsorConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ClientConfig {
    #[serde(default = "default_network")]
    pub network: NetworkId,

    /// Node for chain state and broadcast. Defaults to the network's public node.
    #[serde(default)]
    pub node_url: Option<String>,

    /// The sender, as `actor@permission`.
    #[serde(with = "freecpu_types::text")]
    pub sender: PermissionLevel,

    #[serde(default = "default_token_contract")]
    pub token_contract: Name,

    #[serde(default = "default_chain_timeout_secs")]
    pub chain_timeout_secs: u64,

    #[serde(default)]
    pub log_format: LogFormat,

    #[serde(default = "default_log_level")]
    pub log_level: String,

    #[serde(default)]
    pub header: HeaderHints,

    /// Absent means every transaction is self-paid.
    #[serde(default)]
    pub sponsor: Option<SponsorConfig>,
}

// ── Serde default helpers ──────────────────────────────────────────────

fn default_network() -> NetworkId {
    NetworkId::Kylin
}

fn default_token_contract() -> Name {
    Name::from_static(DEFAULT_TOKEN_CONTRACT)
}

fn default_chain_timeout_secs() -> u64 {
    30
}

fn default_sponsor_timeout_ms() -> u64 {
    10_000
}

fn default_log_level() -> String {
    "info".to_string()
}

// ── Impl ───────────────────────────────────────────────────────────────

impl ClientConfig {
    /// Defaults for everything but the sender.
    pub fn new(sender: PermissionLevel) -> Self {
        Self {
            network: default_network(),
            node_url: None,
            sender,
            token_contract: default_token_contract(),
            chain_timeout_secs: default_chain_timeout_secs(),
            log_format: LogFormat::default(),
            log_level: default_log_level(),
            header: HeaderHints::default(),
            sponsor: None,
        }
    }

    pub fn from_toml_file(path: impl AsRef<Path>) -> Result<Self, WalletError> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)
            .map_err(|e| WalletError::Config(format!("{}: {e}", path.display())))?;
        Self::from_toml_str(&content)
    }

    pub fn from_toml_str(s: &str) -> Result<Self, WalletError> {
        toml::from_str(s).map_err(|e| WalletError::Config(e.to_string()))
    }

    pub fn node_endpoint(&self) -> Result<NodeEndpoint, WalletError> {
        self.node_url
            .as_deref()
            .unwrap_or_else(|| self.network.default_endpoint())
            .parse()
            .map_err(|e| WalletError::Config(format!("node_url: {e}")))
    }

    pub fn chain_timeout(&self) -> Duration {
        Duration::from_secs(self.chain_timeout_secs)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn minimal_config() {
        let config = ClientConfig::from_toml_str("sender = \"alice@active\"").unwrap();
        assert_eq!(config.sender.to_string(), "alice@active");
        assert_eq!(config.token_contract, "eosio.token");
        assert_eq!(config.header, HeaderHints::default());
        assert!(config.sponsor.is_none());
    }

    #[test]
    fn sponsor_section() {
        let config = ClientConfig::from_toml_str(
            r#"
sender = "alice@active"
network = "jungle"

[header]
blocksBehind = 5

[sponsor]
url = "http://127.0.0.1:3031"
permission = "eosiactester@freecpu"
"#,
        )
        .unwrap();
        let sponsor = config.sponsor.unwrap();
        assert_eq!(sponsor.permission.to_string(), "eosiactester@freecpu");
        assert_eq!(sponsor.timeout(), Duration::from_secs(10));
        assert_eq!(config.header.blocks_behind, 5);
        assert_eq!(config.header.expire_seconds, 60);
        assert_eq!(config.network, NetworkId::Jungle);
    }

    #[test]
    fn missing_sender_is_error() {
        assert!(matches!(
            ClientConfig::from_toml_str("network = \"kylin\""),
            Err(WalletError::Config(_))
        ));
    }

    #[test]
    fn loads_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "sender = \"alice@active\"\nnode_url = \"http://localhost:8888\"").unwrap();
        let config = ClientConfig::from_toml_file(file.path()).unwrap();
        assert_eq!(config.node_endpoint().unwrap().host, "localhost");
    }
}
