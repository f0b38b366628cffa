//! Key and signature types for transaction signing.
//!
//! Text forms carry a type prefix so they cannot be confused with one another:
//! `PUB_ED_<hex>`, `PVT_ED_<hex>` and `SIG_ED_<hex>`.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use zeroize::{Zeroize, ZeroizeOnDrop};

use crate::error::TypesError;

const PUBLIC_PREFIX: &str = "PUB_ED_";
const PRIVATE_PREFIX: &str = "PVT_ED_";
const SIGNATURE_PREFIX: &str = "SIG_ED_";

/// A 32-byte Ed25519 public key.
#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct PublicKey(pub [u8; 32]);

/// A 32-byte Ed25519 private key (secret scalar).
///
/// This type intentionally does not implement `Debug`, `Serialize`, or `Clone`
/// to prevent accidental exposure. Key bytes are zeroized on drop.
#[derive(Zeroize, ZeroizeOnDrop)]
pub struct PrivateKey(pub [u8; 32]);

/// A 64-byte Ed25519 signature.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Signature(pub [u8; 64]);

/// An Ed25519 key pair (public + private).
///
/// Use `freecpu_crypto::generate_keypair()` or `freecpu_crypto::keypair_from_private()`
/// to construct key pairs. This struct is intentionally just data.
pub struct KeyPair {
    pub public: PublicKey,
    pub private: PrivateKey,
}

fn decode_prefixed<const N: usize>(s: &str, prefix: &str) -> Result<[u8; N], String> {
    let body = s
        .trim()
        .strip_prefix(prefix)
        .ok_or_else(|| format!("expected {prefix} prefix"))?;
    let bytes = hex::decode(body).map_err(|e| e.to_string())?;
    bytes
        .try_into()
        .map_err(|v: Vec<u8>| format!("expected {N} bytes, got {}", v.len()))
}

impl PublicKey {
    pub fn as_bytes(&self) -> &[u8; 32] {
        &self.0
    }
}

impl fmt::Display for PublicKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{PUBLIC_PREFIX}{}", hex::encode(self.0))
    }
}

impl FromStr for PublicKey {
    type Err = TypesError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        decode_prefixed(s, PUBLIC_PREFIX)
            .map(Self)
            .map_err(TypesError::InvalidKey)
    }
}

impl TryFrom<String> for PublicKey {
    type Error = TypesError;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        s.parse()
    }
}

impl From<PublicKey> for String {
    fn from(key: PublicKey) -> Self {
        key.to_string()
    }
}

impl PrivateKey {
    /// Export in the prefixed text form. Callers are responsible for keeping
    /// the result out of logs.
    pub fn to_text(&self) -> String {
        format!("{PRIVATE_PREFIX}{}", hex::encode(self.0))
    }
}

impl FromStr for PrivateKey {
    type Err = TypesError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        decode_prefixed(s, PRIVATE_PREFIX)
            .map(Self)
            .map_err(|_| TypesError::InvalidKey("malformed private key".into()))
    }
}

impl Signature {
    pub fn as_bytes(&self) -> &[u8; 64] {
        &self.0
    }
}

impl fmt::Display for Signature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{SIGNATURE_PREFIX}{}", hex::encode(self.0))
    }
}

impl FromStr for Signature {
    type Err = TypesError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        decode_prefixed(s, SIGNATURE_PREFIX)
            .map(Self)
            .map_err(TypesError::InvalidSignature)
    }
}

impl TryFrom<String> for Signature {
    type Error = TypesError;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        s.parse()
    }
}

impl From<Signature> for String {
    fn from(sig: Signature) -> Self {
        sig.to_string()
    }
}
