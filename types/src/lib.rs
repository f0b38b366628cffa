//! Fundamental types for freecpu.
//!
//! This crate defines the types shared across every other crate in the workspace:
//! ledger names, permission levels, actions, unsigned and signed transactions,
//! keys and signatures, token assets, network identifiers, and the sponsor
//! endpoint wire format.

pub mod action;
pub mod asset;
pub mod error;
pub mod keys;
pub mod name;
pub mod network;
pub mod text;
pub mod time;
pub mod transaction;
pub mod wire;

pub use action::{Action, PermissionLevel};
pub use asset::Asset;
pub use error::TypesError;
pub use keys::{KeyPair, PrivateKey, PublicKey, Signature};
pub use name::Name;
pub use network::{ChainId, NetworkId, NodeEndpoint};
pub use time::Timestamp;
pub use transaction::{
    distinct_authorizations, CanonicalEncoding, HeaderHints, SignedTransaction, TransactionHeader,
    UnsignedTransaction,
};
pub use wire::{ErrorResponse, SignRequest, SignResponse, TransactionBody};
