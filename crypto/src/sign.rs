//! Ed25519 signing and verification over canonical transaction bytes.

use ed25519_dalek::{Signer, SigningKey, Verifier, VerifyingKey};
use freecpu_types::{CanonicalEncoding, ChainId, PrivateKey, PublicKey, Signature};

use crate::hash::signing_digest;

/// Sign `encoding` for `chain_id`. The signature binds all three inputs.
pub fn sign_encoding(
    chain_id: &ChainId,
    encoding: &CanonicalEncoding,
    private_key: &PrivateKey,
) -> Signature {
    let signing_key = SigningKey::from_bytes(&private_key.0);
    let digest = signing_digest(chain_id, encoding);
    Signature(signing_key.sign(&digest).to_bytes())
}

/// Verify a signature against `(chain_id, encoding, public_key)`.
///
/// Returns `false` for malformed keys instead of an error; callers only need
/// the yes/no answer.
pub fn verify_encoding(
    chain_id: &ChainId,
    encoding: &CanonicalEncoding,
    signature: &Signature,
    public_key: &PublicKey,
) -> bool {
    let Ok(verifying_key) = VerifyingKey::from_bytes(&public_key.0) else {
        return false;
    };
    let dalek_sig = ed25519_dalek::Signature::from_bytes(&signature.0);
    let digest = signing_digest(chain_id, encoding);
    verifying_key.verify(&digest, &dalek_sig).is_ok()
}
