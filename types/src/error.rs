//! Parse and validation errors for the fundamental types.

use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum TypesError {
    #[error("invalid name {name:?}: {reason}")]
    InvalidName { name: String, reason: String },

    #[error("invalid permission level {0:?}, expected actor@permission")]
    InvalidPermissionLevel(String),

    #[error("invalid asset {asset:?}: {reason}")]
    InvalidAsset { asset: String, reason: String },

    #[error("invalid key: {0}")]
    InvalidKey(String),

    #[error("invalid signature: {0}")]
    InvalidSignature(String),

    #[error("invalid hex: {0}")]
    InvalidHex(String),

    #[error("invalid node endpoint {0:?}, needs protocol and port")]
    InvalidEndpoint(String),

    #[error("unknown network: {0}")]
    UnknownNetwork(String),
}
