//! Cryptographic primitives for freecpu.
//!
//! - **Ed25519** for signing and signature verification
//! - **SHA-256** for the signing digest and transaction ids
//! - [`SignatureProvider`], the signing and key-availability capability both the
//!   sponsor service and the client sign through

pub mod error;
pub mod hash;
pub mod keys;
pub mod provider;
pub mod sign;

pub use error::CryptoError;
pub use hash::{signing_digest, transaction_id};
pub use keys::{generate_keypair, keypair_from_private, keypair_from_seed, public_from_private};
pub use provider::{KeyStoreProvider, SignatureProvider, SigningKeys};
pub use sign::{sign_encoding, verify_encoding};
