//! Nullable sponsor: scripted answers to signing requests.

use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use freecpu_chain::{resolve_header, ChainApi};
use freecpu_crypto::SignatureProvider;
use freecpu_policy::Policy;
use freecpu_types::{ChainId, SignRequest, SignResponse, UnsignedTransaction};
use freecpu_wallet_core::{SponsorApi, SponsorError};
use serde_json::json;

/// How the sponsor answers.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum SponsorBehavior {
    /// Connection refused.
    Unreachable,
    /// Always declines with the given reason.
    Rejecting(String),
    /// Never answers.
    Hanging,
    /// Resolves a header, encodes and signs, like the real service.
    Signing,
    /// Signs, but a transaction whose first action has been altered.
    Tampering,
    /// Answers 2xx with an empty signature list.
    EmptySignatures,
}

/// Signing collaborators for the behaviours that produce signatures.
struct Signer {
    chain: Arc<dyn ChainApi>,
    keys: Arc<dyn SignatureProvider>,
    chain_id: ChainId,
}

pub struct NullSponsor {
    behavior: SponsorBehavior,
    signer: Option<Signer>,
    policy: Option<Policy>,
    requests: Mutex<Vec<SignRequest>>,
}

impl NullSponsor {
    fn with_behavior(behavior: SponsorBehavior) -> Self {
        Self {
            behavior,
            signer: None,
            policy: None,
            requests: Mutex::new(Vec::new()),
        }
    }

    pub fn unreachable() -> Self {
        Self::with_behavior(SponsorBehavior::Unreachable)
    }

    pub fn rejecting(reason: impl Into<String>) -> Self {
        Self::with_behavior(SponsorBehavior::Rejecting(reason.into()))
    }

    pub fn hanging() -> Self {
        Self::with_behavior(SponsorBehavior::Hanging)
    }

    /// A sponsor that signs with every key `keys` holds.
    pub fn signing(
        chain: Arc<dyn ChainApi>,
        keys: Arc<dyn SignatureProvider>,
        chain_id: ChainId,
    ) -> Self {
        Self {
            signer: Some(Signer {
                chain,
                keys,
                chain_id,
            }),
            ..Self::with_behavior(SponsorBehavior::Signing)
        }
    }

    /// Switch a signing sponsor to another behaviour, keeping its keys.
    pub fn behaving(mut self, behavior: SponsorBehavior) -> Self {
        self.behavior = behavior;
        self
    }

    /// Check requests against `policy` before signing.
    pub fn with_policy(mut self, policy: Policy) -> Self {
        self.policy = Some(policy);
        self
    }

    /// Requests received so far, oldest first.
    pub fn requests(&self) -> Vec<SignRequest> {
        self.requests
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .clone()
    }

    async fn sign(&self, request: &SignRequest, tamper: bool) -> Result<SignResponse, SponsorError> {
        let signer = self
            .signer
            .as_ref()
            .ok_or_else(|| SponsorError::Transport("null sponsor has no keys".into()))?;
        let body = request
            .transaction
            .as_ref()
            .ok_or_else(|| SponsorError::Rejected("No transaction passed".into()))?;
        if let Some(policy) = &self.policy {
            policy
                .check(&body.actions)
                .map_err(|r| SponsorError::Rejected(r.to_string()))?;
        }

        let mut tx = UnsignedTransaction::new(body.actions.clone(), request.header_hints);
        if tamper {
            if let Some(first) = tx.actions.first_mut() {
                first.data["memo"] = json!("tampered");
            }
        }
        let header = resolve_header(signer.chain.as_ref(), &tx.header)
            .await
            .map_err(|e| SponsorError::Rejected(e.to_string()))?;
        let encoding = freecpu_codec::encode(&tx, &header)
            .map_err(|e| SponsorError::Rejected(e.to_string()))?;
        let keys = signer.keys.available_keys();
        let signatures = signer
            .keys
            .sign(&signer.chain_id, &keys, &encoding)
            .map_err(|e| SponsorError::Rejected(e.to_string()))?;
        Ok(SignResponse {
            serialized_transaction: encoding,
            signatures,
        })
    }
}

#[async_trait]
impl SponsorApi for NullSponsor {
    async fn request_signature(&self, request: &SignRequest) -> Result<SignResponse, SponsorError> {
        if let Ok(mut requests) = self.requests.lock() {
            requests.push(request.clone());
        }
        match &self.behavior {
            SponsorBehavior::Unreachable => {
                Err(SponsorError::Transport("connection refused".into()))
            }
            SponsorBehavior::Rejecting(reason) => Err(SponsorError::Rejected(reason.clone())),
            SponsorBehavior::Hanging => std::future::pending().await,
            SponsorBehavior::Signing => self.sign(request, false).await,
            SponsorBehavior::Tampering => self.sign(request, true).await,
            SponsorBehavior::EmptySignatures => {
                let mut response = self.sign(request, false).await?;
                response.signatures.clear();
                Ok(response)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::chain::NullChain;
    use freecpu_crypto::KeyStoreProvider;
    use freecpu_types::{NetworkId, PrivateKey};

    fn request() -> SignRequest {
        serde_json::from_value(json!({
            "transaction": {"actions": [{
                "account": "eosio.token",
                "name": "transfer",
                "authorization": [{"actor": "alice", "permission": "active"}],
                "data": {"from": "alice", "to": "bob", "quantity": "1.0000 EOS", "memo": ""}
            }]}
        }))
        .unwrap()
    }

    #[tokio::test]
    async fn records_requests() {
        let sponsor = NullSponsor::rejecting("nope");
        let err = sponsor.request_signature(&request()).await.unwrap_err();
        assert_eq!(err, SponsorError::Rejected("nope".into()));
        assert_eq!(sponsor.requests().len(), 1);
    }

    #[tokio::test]
    async fn signing_sponsor_signs_with_all_keys() {
        let chain = Arc::new(NullChain::for_network(NetworkId::Kylin));
        let keys = Arc::new(KeyStoreProvider::from_keys(vec![
            PrivateKey([1; 32]),
            PrivateKey([2; 32]),
        ]));
        let sponsor = NullSponsor::signing(chain, keys, NetworkId::Kylin.chain_id());
        let response = sponsor.request_signature(&request()).await.unwrap();
        assert_eq!(response.signatures.len(), 2);
        assert!(!response.serialized_transaction.is_empty());
    }

    #[tokio::test]
    async fn hanging_sponsor_never_answers() {
        let sponsor = NullSponsor::hanging();
        let result = tokio::time::timeout(
            std::time::Duration::from_millis(20),
            sponsor.request_signature(&request()),
        )
        .await;
        assert!(result.is_err());
    }
}
