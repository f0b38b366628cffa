//! Transaction wire layout.

use bincode::Options;
use freecpu_types::{
    Action, CanonicalEncoding, Name, PermissionLevel, Timestamp, TransactionHeader,
    UnsignedTransaction,
};
use serde::{Deserialize, Serialize};

use crate::canonical_json::to_canonical_bytes;
use crate::error::CodecError;

/// Upper bound on an encoded transaction.
pub const MAX_ENCODED_LEN: u64 = 512 * 1024;

#[derive(Serialize, Deserialize)]
struct WireAction {
    account: u64,
    name: u64,
    authorization: Vec<(u64, u64)>,
    data: Vec<u8>,
}

/// Field order is the wire order. Resource limits and delay are always zero.
#[derive(Serialize, Deserialize)]
struct WireTransaction {
    expiration: u32,
    ref_block_num: u16,
    ref_block_prefix: u32,
    max_net_usage_words: u32,
    max_cpu_usage_ms: u8,
    delay_sec: u32,
    context_free_actions: Vec<WireAction>,
    actions: Vec<WireAction>,
    transaction_extensions: Vec<(u16, Vec<u8>)>,
}

/// A decoded transaction: the header it was bound to and its actions.
#[derive(Clone, Debug, PartialEq)]
pub struct DecodedTransaction {
    pub header: TransactionHeader,
    pub actions: Vec<Action>,
}

fn options() -> impl Options {
    bincode::DefaultOptions::new()
        .with_fixint_encoding()
        .with_little_endian()
        .with_limit(MAX_ENCODED_LEN)
        .reject_trailing_bytes()
}

/// Encode a transaction against a resolved header.
pub fn encode(
    tx: &UnsignedTransaction,
    header: &TransactionHeader,
) -> Result<CanonicalEncoding, CodecError> {
    encode_actions(&tx.actions, header)
}

/// Encode an action list against a resolved header.
pub fn encode_actions(
    actions: &[Action],
    header: &TransactionHeader,
) -> Result<CanonicalEncoding, CodecError> {
    let wire = WireTransaction {
        expiration: header.expiration.as_secs(),
        ref_block_num: header.ref_block_num,
        ref_block_prefix: header.ref_block_prefix,
        max_net_usage_words: 0,
        max_cpu_usage_ms: 0,
        delay_sec: 0,
        context_free_actions: Vec::new(),
        actions: actions
            .iter()
            .map(to_wire_action)
            .collect::<Result<_, _>>()?,
        transaction_extensions: Vec::new(),
    };
    let bytes = options().serialize(&wire).map_err(|e| match *e {
        bincode::ErrorKind::SizeLimit => CodecError::TooLarge {
            limit: MAX_ENCODED_LEN,
        },
        other => CodecError::Data(other.to_string()),
    })?;
    Ok(CanonicalEncoding::new(bytes))
}

fn to_wire_action(action: &Action) -> Result<WireAction, CodecError> {
    Ok(WireAction {
        account: action.account.to_u64(),
        name: action.name.to_u64(),
        authorization: action
            .authorization
            .iter()
            .map(|l| (l.actor.to_u64(), l.permission.to_u64()))
            .collect(),
        data: to_canonical_bytes(&action.data)?,
    })
}

/// Decode bytes produced by [`encode`].
///
/// Anything [`encode`] could not have produced is rejected: trailing bytes,
/// non-zero resource limits, context-free actions, extensions and
/// non-canonical action data.
pub fn decode(encoding: &CanonicalEncoding) -> Result<DecodedTransaction, CodecError> {
    let wire: WireTransaction = options()
        .deserialize(encoding.as_bytes())
        .map_err(|e| CodecError::Malformed(e.to_string()))?;

    if wire.max_net_usage_words != 0 || wire.max_cpu_usage_ms != 0 || wire.delay_sec != 0 {
        return Err(CodecError::Malformed(
            "resource limits and delay must be zero".into(),
        ));
    }
    if !wire.context_free_actions.is_empty() || !wire.transaction_extensions.is_empty() {
        return Err(CodecError::Malformed(
            "context-free actions and extensions are not supported".into(),
        ));
    }

    let actions = wire
        .actions
        .into_iter()
        .map(from_wire_action)
        .collect::<Result<Vec<_>, _>>()?;

    Ok(DecodedTransaction {
        header: TransactionHeader {
            expiration: Timestamp::new(wire.expiration),
            ref_block_num: wire.ref_block_num,
            ref_block_prefix: wire.ref_block_prefix,
        },
        actions,
    })
}

fn name(value: u64) -> Result<Name, CodecError> {
    Name::from_u64(value).map_err(|e| CodecError::Malformed(e.to_string()))
}

fn from_wire_action(wire: WireAction) -> Result<Action, CodecError> {
    let data: serde_json::Value = serde_json::from_slice(&wire.data)
        .map_err(|e| CodecError::Malformed(format!("action data: {e}")))?;
    if to_canonical_bytes(&data)? != wire.data {
        return Err(CodecError::Malformed("non-canonical action data".into()));
    }
    let authorization = wire
        .authorization
        .into_iter()
        .map(|(actor, permission)| Ok(PermissionLevel::new(name(actor)?, name(permission)?)))
        .collect::<Result<Vec<_>, CodecError>>()?;
    Ok(Action {
        account: name(wire.account)?,
        name: name(wire.name)?,
        authorization,
        data,
    })
}
