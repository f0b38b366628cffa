use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum CryptoError {
    #[error("no private key available for required key {0}")]
    MissingKey(String),

    #[error("no signing keys configured")]
    NoKeys,

    #[error("invalid key material: {0}")]
    InvalidKey(String),
}
