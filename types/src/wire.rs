//! JSON bodies exchanged with the sponsor signing endpoint.

use serde::{Deserialize, Serialize};

use crate::action::Action;
use crate::keys::Signature;
use crate::transaction::{CanonicalEncoding, HeaderHints, UnsignedTransaction};

/// The action list as sent over the wire.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct TransactionBody {
    pub actions: Vec<Action>,
}

/// `POST /api/eos/sign` request.
///
/// The older `tx` / `txHeaders` field names are accepted as well.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SignRequest {
    #[serde(alias = "tx", default)]
    pub transaction: Option<TransactionBody>,
    #[serde(alias = "txHeaders", default)]
    pub header_hints: HeaderHints,
}

impl SignRequest {
    pub fn from_unsigned(tx: &UnsignedTransaction) -> Self {
        Self {
            transaction: Some(TransactionBody {
                actions: tx.actions.clone(),
            }),
            header_hints: tx.header,
        }
    }
}

/// Successful sponsor response: the sponsor's encoding and its signature(s).
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SignResponse {
    pub serialized_transaction: CanonicalEncoding,
    pub signatures: Vec<Signature>,
}

/// Error payload returned with a non-2xx status.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: String,
}
