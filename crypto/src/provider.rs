//! The signing capability.
//!
//! Private keys are loaded once into an immutable [`SigningKeys`] set and only
//! ever leave it as signatures. Everything that signs (the sponsor service, the
//! client coordinator) goes through the [`SignatureProvider`] trait so tests can
//! inject fixed keys.

use std::sync::Arc;

use freecpu_types::{CanonicalEncoding, ChainId, KeyPair, PrivateKey, PublicKey, Signature};
use tracing::debug;

use crate::error::CryptoError;
use crate::keys::keypair_from_private;
use crate::sign::sign_encoding;

/// Signing and key-availability capability.
pub trait SignatureProvider: Send + Sync {
    /// Public keys this provider can sign for.
    fn available_keys(&self) -> Vec<PublicKey>;

    /// Sign `encoding` once per required key, in the order given.
    ///
    /// Fails if any required key is not held; a partial signature set is
    /// never returned.
    fn sign(
        &self,
        chain_id: &ChainId,
        required_keys: &[PublicKey],
        encoding: &CanonicalEncoding,
    ) -> Result<Vec<Signature>, CryptoError>;
}

/// Immutable set of private keys, built once at startup.
pub struct SigningKeys {
    pairs: Vec<KeyPair>,
}

impl SigningKeys {
    pub fn new(keys: Vec<PrivateKey>) -> Self {
        Self {
            pairs: keys.into_iter().map(keypair_from_private).collect(),
        }
    }

    /// Parse a comma-separated list of `PVT_ED_` keys, e.g. from an environment
    /// variable. Blank entries are skipped.
    pub fn parse_list(raw: &str) -> Result<Self, CryptoError> {
        let keys = raw
            .split(',')
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(|s| {
                s.parse::<PrivateKey>()
                    .map_err(|e| CryptoError::InvalidKey(e.to_string()))
            })
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Self::new(keys))
    }

    pub fn is_empty(&self) -> bool {
        self.pairs.is_empty()
    }

    pub fn len(&self) -> usize {
        self.pairs.len()
    }

    pub fn public_keys(&self) -> Vec<PublicKey> {
        self.pairs.iter().map(|p| p.public.clone()).collect()
    }

    fn find(&self, public: &PublicKey) -> Option<&KeyPair> {
        self.pairs.iter().find(|p| &p.public == public)
    }
}

/// [`SignatureProvider`] backed by in-memory keys.
#[derive(Clone)]
pub struct KeyStoreProvider {
    keys: Arc<SigningKeys>,
}

impl KeyStoreProvider {
    pub fn new(keys: Arc<SigningKeys>) -> Self {
        Self { keys }
    }

    pub fn from_keys(keys: Vec<PrivateKey>) -> Self {
        Self::new(Arc::new(SigningKeys::new(keys)))
    }
}

impl SignatureProvider for KeyStoreProvider {
    fn available_keys(&self) -> Vec<PublicKey> {
        self.keys.public_keys()
    }

    fn sign(
        &self,
        chain_id: &ChainId,
        required_keys: &[PublicKey],
        encoding: &CanonicalEncoding,
    ) -> Result<Vec<Signature>, CryptoError> {
        if self.keys.is_empty() {
            return Err(CryptoError::NoKeys);
        }
        let signatures = required_keys
            .iter()
            .map(|public| {
                let pair = self
                    .keys
                    .find(public)
                    .ok_or_else(|| CryptoError::MissingKey(public.to_string()))?;
                Ok(sign_encoding(chain_id, encoding, &pair.private))
            })
            .collect::<Result<Vec<_>, CryptoError>>()?;
        debug!(count = signatures.len(), "signed canonical encoding");
        Ok(signatures)
    }
}
