//! Network identifiers, chain ids and node endpoints.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::TypesError;

/// A 32-byte chain id. Signatures commit to it, so a transaction signed for one
/// network can never be replayed on another.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct ChainId(pub [u8; 32]);

impl ChainId {
    pub fn as_bytes(&self) -> &[u8; 32] {
        &self.0
    }
}

impl fmt::Display for ChainId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&hex::encode(self.0))
    }
}

impl FromStr for ChainId {
    type Err = TypesError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let bytes = hex::decode(s.trim()).map_err(|e| TypesError::InvalidHex(e.to_string()))?;
        let arr: [u8; 32] = bytes
            .try_into()
            .map_err(|v: Vec<u8>| TypesError::InvalidHex(format!("chain id is {} bytes", v.len())))?;
        Ok(Self(arr))
    }
}

impl TryFrom<String> for ChainId {
    type Error = TypesError;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        s.parse()
    }
}

impl From<ChainId> for String {
    fn from(id: ChainId) -> Self {
        id.to_string()
    }
}

/// Identifies which public network the service and client talk to.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NetworkId {
    /// Jungle testnet.
    Jungle,
    /// Kylin testnet.
    Kylin,
    /// Production network.
    Mainnet,
}

impl NetworkId {
    pub fn chain_id(&self) -> ChainId {
        let text = match self {
            Self::Jungle => "e70aaab8997e1dfce58fbfac80cbbb8fecec7b99cf982a9444273cbc64c41473",
            Self::Kylin => "5fff1dae8dc8e2fc4d5b23b2c7665c97f9e9d8edf2b6485a86ba311c25639191",
            Self::Mainnet => "aca376f206b8fc25a6ed44dbdc66547c36c6c33e3a119ffbeaef943642f0e906",
        };
        let mut id = [0u8; 32];
        // constant input, always 64 hex digits
        if hex::decode_to_slice(text, &mut id).is_err() {
            unreachable!("built-in chain id is valid hex");
        }
        ChainId(id)
    }

    /// Public node used when no endpoint is configured.
    pub fn default_endpoint(&self) -> &'static str {
        match self {
            Self::Jungle => "https://jungle2.cryptolions.io:443",
            Self::Kylin => "https://kylin-dsp-2.liquidapps.io:443",
            Self::Mainnet => "https://mainnet.eoscanada.com:443",
        }
    }

    /// Human-readable name.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Jungle => "jungle",
            Self::Kylin => "kylin",
            Self::Mainnet => "mainnet",
        }
    }
}

impl FromStr for NetworkId {
    type Err = TypesError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "jungle" => Ok(Self::Jungle),
            "kylin" => Ok(Self::Kylin),
            "mainnet" => Ok(Self::Mainnet),
            other => Err(TypesError::UnknownNetwork(other.to_string())),
        }
    }
}

/// A node HTTP endpoint that names its protocol and port explicitly,
/// e.g. `https://jungle2.cryptolions.io:443`.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct NodeEndpoint {
    pub protocol: String,
    pub host: String,
    pub port: u16,
}

impl NodeEndpoint {
    /// Base URL without a trailing slash.
    pub fn url(&self) -> String {
        format!("{}://{}:{}", self.protocol, self.host, self.port)
    }
}

impl FromStr for NodeEndpoint {
    type Err = TypesError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = || TypesError::InvalidEndpoint(s.to_string());

        let (protocol, rest) = s.split_once("://").ok_or_else(invalid)?;
        if protocol != "http" && protocol != "https" {
            return Err(invalid());
        }
        let authority = rest.split('/').next().unwrap_or_default();
        let (host, port) = authority.rsplit_once(':').ok_or_else(invalid)?;
        if host.is_empty() {
            return Err(invalid());
        }
        let port: u16 = port.parse().map_err(|_| invalid())?;
        Ok(Self {
            protocol: protocol.to_string(),
            host: host.to_string(),
            port,
        })
    }
}

impl fmt::Display for NodeEndpoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.url())
    }
}
