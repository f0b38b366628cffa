//! Co-signing coordinator.
//!
//! Per transaction:
//!
//! ```text
//! Built -> SponsorRequested -> SponsorSigned | SponsorUnavailable
//!       -> SelfSigned -> Merged -> Submitted -> Confirmed | Rejected
//! ```
//!
//! When the sponsor signs, the client signs the sponsor's bytes as returned.
//! It never resolves its own header on that path: a different reference block
//! means different bytes, and the sponsor's signature would no longer match.

use std::collections::BTreeSet;
use std::sync::Arc;
use std::time::Duration;

use freecpu_chain::{resolve_header, ChainApi};
use freecpu_codec::{decode, encode};
use freecpu_crypto::{transaction_id, SignatureProvider};
use freecpu_types::{
    Action, CanonicalEncoding, ChainId, PermissionLevel, PublicKey, SignRequest,
    SignedTransaction, UnsignedTransaction,
};
use tracing::{debug, error, info, warn};

use crate::error::WalletError;
use crate::merge::merge;
use crate::outcome::{SponsorOutcome, UnavailableReason};
use crate::sponsor_client::SponsorApi;
use crate::transaction_builder::strip_sponsor_authorization;

/// Default bound on the sponsor round trip.
pub const DEFAULT_SPONSOR_TIMEOUT: Duration = Duration::from_secs(10);

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum CosignStage {
    Built,
    SponsorRequested,
    SponsorSigned,
    SponsorUnavailable,
    SelfSigned,
    Merged,
    Submitted,
    Confirmed,
    Rejected,
}

/// A transaction the ledger accepted.
#[derive(Clone, Debug)]
pub struct CosignReceipt {
    pub transaction_id: String,
    /// Whether the sponsor paid.
    pub sponsored: bool,
    pub signed: SignedTransaction,
    /// The action list that was actually signed and broadcast.
    pub actions: Vec<Action>,
    pub trail: Vec<CosignStage>,
    /// Set when a sponsored transaction fell back to self-pay.
    pub fallback_reason: Option<UnavailableReason>,
}

struct Prepared {
    signed: SignedTransaction,
    actions: Vec<Action>,
    sponsored: bool,
    fallback_reason: Option<UnavailableReason>,
}

struct SponsorLink {
    api: Arc<dyn SponsorApi>,
    permission: PermissionLevel,
}

pub struct CosignCoordinator {
    chain: Arc<dyn ChainApi>,
    signer: Arc<dyn SignatureProvider>,
    sponsor: Option<SponsorLink>,
    timeout: Duration,
}

impl CosignCoordinator {
    /// A coordinator that always self-pays until [`with_sponsor`](Self::with_sponsor) is called.
    pub fn new(chain: Arc<dyn ChainApi>, signer: Arc<dyn SignatureProvider>) -> Self {
        Self {
            chain,
            signer,
            sponsor: None,
            timeout: DEFAULT_SPONSOR_TIMEOUT,
        }
    }

    pub fn with_sponsor(mut self, api: Arc<dyn SponsorApi>, permission: PermissionLevel) -> Self {
        self.sponsor = Some(SponsorLink { api, permission });
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    /// Run a built transaction through co-signing and submit it.
    ///
    /// The sponsor is asked only if the transaction carries its authorization at
    /// `actions[0].authorization[0]`. Sponsor failures fall back to self-pay;
    /// a sponsor encoding that does not match the request is fatal.
    pub async fn cosign(&self, tx: UnsignedTransaction) -> Result<CosignReceipt, WalletError> {
        let mut trail = vec![CosignStage::Built];
        let chain_id = self
            .chain
            .chain_info()
            .await
            .map_err(WalletError::Chain)?
            .chain_id;

        let prepared = match self.sponsor.as_ref().filter(|s| leads_with(&tx, &s.permission)) {
            Some(link) => self.sponsored(&chain_id, link, tx, &mut trail).await?,
            None => {
                let signed = self.self_signed(&chain_id, &tx, &mut trail).await?;
                Prepared {
                    signed,
                    actions: tx.actions,
                    sponsored: false,
                    fallback_reason: None,
                }
            }
        };

        trail.push(CosignStage::Submitted);
        let tx_id = transaction_id(&prepared.signed.serialized_transaction);
        match self.chain.push_transaction(&prepared.signed).await {
            Ok(receipt) => {
                trail.push(CosignStage::Confirmed);
                info!(
                    tx_id = %receipt.transaction_id,
                    sponsored = prepared.sponsored,
                    "transaction confirmed"
                );
                Ok(CosignReceipt {
                    transaction_id: receipt.transaction_id,
                    sponsored: prepared.sponsored,
                    signed: prepared.signed,
                    actions: prepared.actions,
                    trail,
                    fallback_reason: prepared.fallback_reason,
                })
            }
            Err(e) => {
                trail.push(CosignStage::Rejected);
                error!(%tx_id, ?trail, "ledger rejected transaction: {e}");
                Err(WalletError::LedgerRejection(e))
            }
        }
    }

    async fn sponsored(
        &self,
        chain_id: &ChainId,
        link: &SponsorLink,
        tx: UnsignedTransaction,
        trail: &mut Vec<CosignStage>,
    ) -> Result<Prepared, WalletError> {
        trail.push(CosignStage::SponsorRequested);
        match self.request_sponsor(link, &tx).await {
            SponsorOutcome::Signed {
                encoding,
                signature,
            } => {
                trail.push(CosignStage::SponsorSigned);
                let actions = check_agreement(&encoding, &tx.actions)?;

                // The sponsor's key is not ours; only our authorizations need keys here.
                let own = strip_sponsor_authorization(&tx, &link.permission);
                let (own_signed, own_keys) =
                    self.sign_encoding(chain_id, &own.actions, encoding).await?;
                trail.push(CosignStage::SelfSigned);

                let merged = merge(Some(signature), own_signed, &own_keys)?;
                trail.push(CosignStage::Merged);
                Ok(Prepared {
                    signed: merged,
                    actions,
                    sponsored: true,
                    fallback_reason: None,
                })
            }
            SponsorOutcome::Unavailable(reason) => {
                trail.push(CosignStage::SponsorUnavailable);
                warn!(%reason, "sponsor unavailable, paying own resources");
                let fallback = strip_sponsor_authorization(&tx, &link.permission);
                let signed = self.self_signed(chain_id, &fallback, trail).await?;
                Ok(Prepared {
                    signed,
                    actions: fallback.actions,
                    sponsored: false,
                    fallback_reason: Some(reason),
                })
            }
        }
    }

    async fn request_sponsor(&self, link: &SponsorLink, tx: &UnsignedTransaction) -> SponsorOutcome {
        let request = SignRequest::from_unsigned(tx);
        debug!(timeout_ms = self.timeout.as_millis() as u64, "asking sponsor to co-sign");
        match tokio::time::timeout(self.timeout, link.api.request_signature(&request)).await {
            Ok(reply) => SponsorOutcome::from_reply(reply, self.timeout),
            Err(_) => SponsorOutcome::Unavailable(UnavailableReason::Timeout(self.timeout)),
        }
    }

    /// Resolve a fresh header, encode and sign with our own keys only.
    async fn self_signed(
        &self,
        chain_id: &ChainId,
        tx: &UnsignedTransaction,
        trail: &mut Vec<CosignStage>,
    ) -> Result<SignedTransaction, WalletError> {
        let header = resolve_header(self.chain.as_ref(), &tx.header)
            .await
            .map_err(WalletError::Chain)?;
        let encoding = encode(tx, &header)?;
        let (own_signed, own_keys) = self.sign_encoding(chain_id, &tx.actions, encoding).await?;
        trail.push(CosignStage::SelfSigned);
        let merged = merge(None, own_signed, &own_keys)?;
        trail.push(CosignStage::Merged);
        Ok(merged)
    }

    /// Sign `encoding` once per distinct key our provider holds for `actions`.
    /// Returns the keys signed with, in signing order.
    async fn sign_encoding(
        &self,
        chain_id: &ChainId,
        actions: &[Action],
        encoding: CanonicalEncoding,
    ) -> Result<(SignedTransaction, Vec<PublicKey>), WalletError> {
        let available = self.signer.available_keys();
        let mut required = self
            .chain
            .required_keys(actions, &available)
            .await
            .map_err(WalletError::Chain)?;
        let mut seen = BTreeSet::new();
        required.retain(|key| seen.insert(key.clone()));

        let signatures = self.signer.sign(chain_id, &required, &encoding)?;
        debug!(signatures = signatures.len(), "signed with own keys");
        Ok((SignedTransaction::new(encoding, signatures), required))
    }
}

fn leads_with(tx: &UnsignedTransaction, sponsor: &PermissionLevel) -> bool {
    tx.actions
        .first()
        .and_then(|a| a.authorization.first())
        .is_some_and(|first| first == sponsor)
}

/// The sponsor's bytes must decode to exactly the actions we asked it to sign.
fn check_agreement(
    encoding: &CanonicalEncoding,
    requested: &[Action],
) -> Result<Vec<Action>, WalletError> {
    let decoded = decode(encoding).map_err(|e| {
        error!("sponsor encoding does not decode: {e}");
        WalletError::EncodingMismatch(e.to_string())
    })?;
    if decoded.actions != requested {
        error!("sponsor encoding carries different actions than requested");
        return Err(WalletError::EncodingMismatch(
            "decoded actions differ from the request".into(),
        ));
    }
    Ok(decoded.actions)
}

#[cfg(test)]
mod tests {
    use super::*;
    use freecpu_types::{HeaderHints, TransactionHeader, Timestamp};
    use serde_json::json;

    fn actions() -> Vec<Action> {
        vec![Action::new(
            "eosio.token".parse().unwrap(),
            "transfer".parse().unwrap(),
            vec!["alice@active".parse().unwrap()],
            json!({"from": "alice", "to": "bob", "quantity": "1.0000 EOS", "memo": ""}),
        )]
    }

    fn header() -> TransactionHeader {
        TransactionHeader {
            expiration: Timestamp::new(100),
            ref_block_num: 1,
            ref_block_prefix: 2,
        }
    }

    #[test]
    fn agreement_accepts_identical_actions() {
        let tx = UnsignedTransaction::new(actions(), HeaderHints::default());
        let enc = encode(&tx, &header()).unwrap();
        assert_eq!(check_agreement(&enc, &actions()).unwrap(), actions());
    }

    #[test]
    fn agreement_rejects_swapped_actions() {
        let mut other = actions();
        other[0].data = json!({"from": "alice", "to": "mallory", "quantity": "1.0000 EOS", "memo": ""});
        let enc = encode(&UnsignedTransaction::new(other, HeaderHints::default()), &header()).unwrap();
        assert!(matches!(
            check_agreement(&enc, &actions()),
            Err(WalletError::EncodingMismatch(_))
        ));
    }

    #[test]
    fn agreement_rejects_garbage() {
        assert!(matches!(
            check_agreement(&CanonicalEncoding::new(vec![1, 2, 3]), &actions()),
            Err(WalletError::EncodingMismatch(_))
        ));
    }

    #[test]
    fn leads_with_checks_first_authorizer() {
        let tx = UnsignedTransaction::new(actions(), HeaderHints::default());
        assert!(leads_with(&tx, &"alice@active".parse().unwrap()));
        assert!(!leads_with(&tx, &"eosiactester@freecpu".parse().unwrap()));
        assert!(!leads_with(
            &UnsignedTransaction::new(vec![], HeaderHints::default()),
            &"alice@active".parse().unwrap()
        ));
    }
}
