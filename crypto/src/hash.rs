//! SHA-256 digests over canonical transaction bytes.

use freecpu_types::{CanonicalEncoding, ChainId};
use sha2::{Digest, Sha256};

/// The digest a signature commits to: `sha256(chain_id || encoding || 32 zero bytes)`.
///
/// The trailing zeros stand in for the (always empty) context-free data hash.
pub fn signing_digest(chain_id: &ChainId, encoding: &CanonicalEncoding) -> [u8; 32] {
    let mut hasher = Sha256::new();
    hasher.update(chain_id.as_bytes());
    hasher.update(encoding.as_bytes());
    hasher.update([0u8; 32]);
    hasher.finalize().into()
}

/// Ledger transaction id: `sha256(encoding)` as lowercase hex.
pub fn transaction_id(encoding: &CanonicalEncoding) -> String {
    hex::encode(Sha256::digest(encoding.as_bytes()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use freecpu_types::NetworkId;

    #[test]
    fn digest_is_deterministic() {
        let enc = CanonicalEncoding::new(b"tx bytes".to_vec());
        let chain = NetworkId::Jungle.chain_id();
        assert_eq!(signing_digest(&chain, &enc), signing_digest(&chain, &enc));
    }

    #[test]
    fn digest_commits_to_chain_id() {
        let enc = CanonicalEncoding::new(b"tx bytes".to_vec());
        assert_ne!(
            signing_digest(&NetworkId::Jungle.chain_id(), &enc),
            signing_digest(&NetworkId::Mainnet.chain_id(), &enc)
        );
    }

    #[test]
    fn transaction_id_is_hex_sha256() {
        let id = transaction_id(&CanonicalEncoding::new(Vec::new()));
        assert_eq!(
            id,
            "e3b0c44298fc1c149afbf4c8996fb92427ae41e4649b934ca495991b7852b855"
        );
    }
}
