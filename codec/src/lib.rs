//! Canonical transaction codec.
//!
//! `encode` is a pure function of the action list and the resolved header: the
//! same logical transaction always yields byte-identical output, which is what
//! lets a sponsor and a client sign the same bytes independently. `decode` is
//! its inverse and is used to check a counterparty's encoding before signing it.

pub mod canonical_json;
pub mod error;
pub mod transaction;

pub use error::CodecError;
pub use transaction::{decode, encode, encode_actions, DecodedTransaction};
