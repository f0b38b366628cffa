//! Signature merging.

use std::collections::BTreeSet;

use freecpu_types::{PublicKey, SignedTransaction, Signature};

use crate::error::WalletError;

/// Prepend the sponsor's signature, if any, to the client's own.
///
/// The ledger wants one signature per distinct required key, not per
/// authorization: two permission levels sharing a key are satisfied by a
/// single signature. `own_keys` are the keys the client signed with; the
/// sponsor contributes one more when `primary` is present. Any other count is
/// a [`WalletError::SignatureCountMismatch`] and is never repaired by dropping
/// or padding signatures.
pub fn merge(
    primary: Option<Signature>,
    self_signed: SignedTransaction,
    own_keys: &[PublicKey],
) -> Result<SignedTransaction, WalletError> {
    let SignedTransaction {
        serialized_transaction,
        signatures,
    } = self_signed;

    let expected =
        own_keys.iter().collect::<BTreeSet<_>>().len() + usize::from(primary.is_some());

    let mut merged = Vec::with_capacity(signatures.len() + 1);
    merged.extend(primary);
    merged.extend(signatures);

    if merged.len() != expected {
        return Err(WalletError::SignatureCountMismatch {
            expected,
            actual: merged.len(),
        });
    }
    Ok(SignedTransaction::new(serialized_transaction, merged))
}

#[cfg(test)]
mod tests {
    use super::*;
    use freecpu_types::CanonicalEncoding;

    fn key(b: u8) -> PublicKey {
        PublicKey([b; 32])
    }

    fn signed(sigs: &[u8]) -> SignedTransaction {
        SignedTransaction::new(
            CanonicalEncoding::new(vec![7]),
            sigs.iter().map(|b| Signature([*b; 64])).collect(),
        )
    }

    #[test]
    fn primary_goes_first() {
        let merged = merge(Some(Signature([9; 64])), signed(&[1]), &[key(1)]).unwrap();
        assert_eq!(merged.signatures, vec![Signature([9; 64]), Signature([1; 64])]);
        assert_eq!(merged.serialized_transaction.as_bytes(), &[7]);
    }

    #[test]
    fn without_primary_is_unchanged() {
        let merged = merge(None, signed(&[1]), &[key(1)]).unwrap();
        assert_eq!(merged, signed(&[1]));
    }

    #[test]
    fn shared_key_needs_one_signature() {
        // e.g. alice@active and alice@owner backed by the same key
        let merged = merge(None, signed(&[1]), &[key(1), key(1)]).unwrap();
        assert_eq!(merged.signatures.len(), 1);

        let merged = merge(Some(Signature([9; 64])), signed(&[1]), &[key(1), key(1)]).unwrap();
        assert_eq!(merged.signatures.len(), 2);
    }

    #[test]
    fn count_mismatch_is_fatal() {
        let err = merge(None, signed(&[1]), &[key(1), key(2)]).unwrap_err();
        assert!(matches!(
            err,
            WalletError::SignatureCountMismatch {
                expected: 2,
                actual: 1
            }
        ));

        let err = merge(Some(Signature([9; 64])), signed(&[1, 2]), &[key(1)]).unwrap_err();
        assert!(matches!(
            err,
            WalletError::SignatureCountMismatch {
                expected: 2,
                actual: 3
            }
        ));
    }
}
