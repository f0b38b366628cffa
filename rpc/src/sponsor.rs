//! The sponsor's signing pipeline.

use std::collections::BTreeMap;
use std::sync::Arc;

use freecpu_chain::{resolve_header, ChainApi};
use freecpu_crypto::{transaction_id, SignatureProvider};
use freecpu_policy::Policy;
use freecpu_types::{ChainId, PermissionLevel, SignRequest, SignResponse, UnsignedTransaction};
use freecpu_utils::StatsCounter;
use tracing::{debug, info, warn};

use crate::error::RpcError;

pub const STAT_REQUESTS: &str = "requests";
pub const STAT_SIGNED: &str = "signed";
pub const STAT_REJECTED: &str = "rejected";
pub const STAT_FAILED: &str = "failed";

/// Policy, chain access and signing keys, shared by every request.
///
/// Nothing in here is mutated after construction apart from the counters, so
/// requests are handled fully in parallel.
pub struct SponsorService {
    policy: Arc<Policy>,
    chain: Arc<dyn ChainApi>,
    signer: Arc<dyn SignatureProvider>,
    chain_id: ChainId,
    stats: StatsCounter,
}

impl SponsorService {
    pub fn new(
        policy: Policy,
        chain: Arc<dyn ChainApi>,
        signer: Arc<dyn SignatureProvider>,
        chain_id: ChainId,
    ) -> Self {
        Self {
            policy: Arc::new(policy),
            chain,
            signer,
            chain_id,
            stats: StatsCounter::new(&[STAT_REQUESTS, STAT_SIGNED, STAT_REJECTED, STAT_FAILED]),
        }
    }

    pub fn sponsor(&self) -> Option<&PermissionLevel> {
        self.policy.sponsor()
    }

    pub fn chain_id(&self) -> &ChainId {
        &self.chain_id
    }

    pub fn stats(&self) -> BTreeMap<&'static str, u64> {
        self.stats.snapshot()
    }

    /// Check, bind, encode and sign one request.
    pub async fn sign(&self, request: SignRequest) -> Result<SignResponse, RpcError> {
        self.stats.increment(STAT_REQUESTS);
        let result = self.sign_request(request).await;
        match &result {
            Ok(_) => self.stats.increment(STAT_SIGNED),
            Err(RpcError::MissingTransaction | RpcError::Policy(_)) => {
                self.stats.increment(STAT_REJECTED)
            }
            Err(e) => {
                warn!("sponsor signing failed: {e}");
                self.stats.increment(STAT_FAILED)
            }
        }
        result
    }

    async fn sign_request(&self, request: SignRequest) -> Result<SignResponse, RpcError> {
        let body = request.transaction.ok_or(RpcError::MissingTransaction)?;
        let tx = UnsignedTransaction::new(body.actions, request.header_hints);

        if let Err(rejection) = self.policy.check(&tx.actions) {
            info!(reason = %rejection, index = ?rejection.action_index, "declined to sponsor");
            return Err(rejection.into());
        }

        let header = resolve_header(self.chain.as_ref(), &tx.header).await?;
        let encoding = freecpu_codec::encode(&tx, &header)?;
        debug!(bytes = encoding.len(), "encoded sponsored transaction");

        let keys = self.signer.available_keys();
        let signatures = self.signer.sign(&self.chain_id, &keys, &encoding)?;

        info!(
            tx_id = %transaction_id(&encoding),
            actions = tx.actions.len(),
            signatures = signatures.len(),
            "sponsored transaction"
        );
        Ok(SignResponse {
            serialized_transaction: encoding,
            signatures,
        })
    }
}
