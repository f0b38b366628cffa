//! Unsigned and signed transactions and their canonical byte form.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::action::{Action, PermissionLevel};
use crate::error::TypesError;
use crate::keys::Signature;
use crate::time::Timestamp;

fn default_blocks_behind() -> u32 {
    3
}

fn default_expire_seconds() -> u32 {
    60
}

/// How a signer should bind a transaction to chain state: which recent block to
/// reference and how long the transaction stays valid.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HeaderHints {
    #[serde(default = "default_blocks_behind")]
    pub blocks_behind: u32,
    #[serde(default = "default_expire_seconds")]
    pub expire_seconds: u32,
}

impl Default for HeaderHints {
    fn default() -> Self {
        Self {
            blocks_behind: default_blocks_behind(),
            expire_seconds: default_expire_seconds(),
        }
    }
}

/// A header resolved against a concrete reference block (TAPOS).
///
/// Two signers must use the identical resolved header or their signatures
/// cover different bytes.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TransactionHeader {
    pub expiration: Timestamp,
    pub ref_block_num: u16,
    pub ref_block_prefix: u32,
}

/// A transaction that has not been encoded or signed yet.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct UnsignedTransaction {
    pub actions: Vec<Action>,
    #[serde(default)]
    pub header: HeaderHints,
}

impl UnsignedTransaction {
    pub fn new(actions: Vec<Action>, header: HeaderHints) -> Self {
        Self { actions, header }
    }

    /// Distinct authorizations in walk order; see [`distinct_authorizations`].
    pub fn required_authorizations(&self) -> Vec<PermissionLevel> {
        distinct_authorizations(&self.actions)
    }
}

/// Walk `actions[].authorization` in order, first action first, and return each
/// permission level the first time it is seen. Signature order follows this walk.
pub fn distinct_authorizations(actions: &[Action]) -> Vec<PermissionLevel> {
    let mut seen = Vec::new();
    for level in actions.iter().flat_map(|a| a.authorization.iter()) {
        if !seen.contains(level) {
            seen.push(level.clone());
        }
    }
    seen
}

/// The deterministic bytes signatures are computed over.
#[derive(Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct CanonicalEncoding(Vec<u8>);

impl CanonicalEncoding {
    pub fn new(bytes: Vec<u8>) -> Self {
        Self(bytes)
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn to_hex(&self) -> String {
        hex::encode(&self.0)
    }

    pub fn from_hex(s: &str) -> Result<Self, TypesError> {
        hex::decode(s.trim())
            .map(Self)
            .map_err(|e| TypesError::InvalidHex(e.to_string()))
    }
}

impl fmt::Debug for CanonicalEncoding {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "CanonicalEncoding({})", self.to_hex())
    }
}

impl TryFrom<String> for CanonicalEncoding {
    type Error = TypesError;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        Self::from_hex(&s)
    }
}

impl From<CanonicalEncoding> for String {
    fn from(enc: CanonicalEncoding) -> Self {
        enc.to_hex()
    }
}

/// Encoded transaction plus its signatures, in required-key order.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SignedTransaction {
    pub serialized_transaction: CanonicalEncoding,
    pub signatures: Vec<Signature>,
}

impl SignedTransaction {
    pub fn new(serialized_transaction: CanonicalEncoding, signatures: Vec<Signature>) -> Self {
        Self {
            serialized_transaction,
            signatures,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::name::Name;
    use serde_json::json;

    fn level(actor: &str, permission: &str) -> PermissionLevel {
        PermissionLevel::new(Name::new(actor).unwrap(), Name::new(permission).unwrap())
    }

    fn action(auth: Vec<PermissionLevel>) -> Action {
        Action::new(
            Name::new("eosio.token").unwrap(),
            Name::new("transfer").unwrap(),
            auth,
            json!({}),
        )
    }

    #[test]
    fn distinct_authorizations_keep_first_occurrence_order() {
        let sponsor = level("eosiactester", "freecpu");
        let alice = level("alice", "active");
        let actions = vec![
            action(vec![sponsor.clone(), alice.clone()]),
            action(vec![alice.clone()]),
        ];
        assert_eq!(distinct_authorizations(&actions), vec![sponsor, alice]);
    }

    #[test]
    fn header_hints_fill_defaults() {
        let hints: HeaderHints = serde_json::from_value(json!({})).unwrap();
        assert_eq!(hints, HeaderHints::default());
        let hints: HeaderHints = serde_json::from_value(json!({"blocksBehind": 10})).unwrap();
        assert_eq!(hints.blocks_behind, 10);
        assert_eq!(hints.expire_seconds, 60);
    }

    #[test]
    fn encoding_serializes_as_hex() {
        let enc = CanonicalEncoding::new(vec![0xde, 0xad]);
        assert_eq!(serde_json::to_value(&enc).unwrap(), json!("dead"));
        assert!(CanonicalEncoding::from_hex("xyz").is_err());
    }
}
