//! Nullable chain: an in-memory ledger that checks what a real node checks.
//!
//! Blocks are synthesized from their number, one per second. Pushed
//! transactions are decoded and checked for a known reference block, expiry,
//! duplicates, and exactly one valid signature per distinct required key.
//! Levels sharing a key need a single signature. Accepted transactions are
//! recorded for assertions.

use std::collections::{BTreeMap, BTreeSet, HashSet};
use std::sync::{Mutex, MutexGuard};

use async_trait::async_trait;
use freecpu_chain::{BlockSummary, ChainApi, ChainError, ChainInfo, PushReceipt, RejectionKind};
use freecpu_codec::{decode, DecodedTransaction};
use freecpu_crypto::{transaction_id, verify_encoding};
use freecpu_types::{
    distinct_authorizations, Action, ChainId, NetworkId, PermissionLevel, PublicKey,
    SignedTransaction, Timestamp,
};

use crate::clock::NullClock;

/// Time of block 0.
pub const GENESIS_TIME: u32 = 1_600_000_000;

/// Head block number of a fresh chain.
pub const INITIAL_HEAD: u32 = 1_000;

pub struct NullChain {
    chain_id: ChainId,
    clock: NullClock,
    state: Mutex<ChainState>,
}

#[derive(Default)]
struct ChainState {
    head: u32,
    authorities: BTreeMap<PermissionLevel, PublicKey>,
    pushed: Vec<SignedTransaction>,
    seen: HashSet<String>,
    unreachable: bool,
}

fn rejected(kind: RejectionKind, message: impl Into<String>) -> ChainError {
    ChainError::Rejected {
        kind,
        message: message.into(),
    }
}

impl NullChain {
    pub fn new(chain_id: ChainId) -> Self {
        Self {
            chain_id,
            clock: NullClock::new(block_time(INITIAL_HEAD).as_secs()),
            state: Mutex::new(ChainState {
                head: INITIAL_HEAD,
                ..ChainState::default()
            }),
        }
    }

    pub fn for_network(network: NetworkId) -> Self {
        Self::new(network.chain_id())
    }

    /// Give `level` a single-key authority.
    pub fn with_authority(self, level: PermissionLevel, key: PublicKey) -> Self {
        self.register(level, key);
        self
    }

    pub fn register(&self, level: PermissionLevel, key: PublicKey) {
        self.lock().authorities.insert(level, key);
    }

    pub fn chain_id(&self) -> &ChainId {
        &self.chain_id
    }

    pub fn clock(&self) -> &NullClock {
        &self.clock
    }

    pub fn head(&self) -> u32 {
        self.lock().head
    }

    /// Advance the head by `count` blocks and the clock by as many seconds.
    pub fn produce_blocks(&self, count: u32) {
        self.lock().head += count;
        self.clock.advance(count);
    }

    /// While set, every call fails with a transport error.
    pub fn set_unreachable(&self, unreachable: bool) {
        self.lock().unreachable = unreachable;
    }

    /// Transactions accepted so far, oldest first.
    pub fn pushed(&self) -> Vec<SignedTransaction> {
        self.lock().pushed.clone()
    }

    /// Action lists of the accepted transactions.
    pub fn pushed_actions(&self) -> Vec<Vec<Action>> {
        self.pushed()
            .iter()
            .filter_map(|tx| decode(&tx.serialized_transaction).ok())
            .map(|d| d.actions)
            .collect()
    }

    fn lock(&self) -> MutexGuard<'_, ChainState> {
        // a panicking test thread must not hide the state from the others
        self.state.lock().unwrap_or_else(|e| e.into_inner())
    }

    fn reachable(&self) -> Result<MutexGuard<'_, ChainState>, ChainError> {
        let state = self.lock();
        if state.unreachable {
            return Err(ChainError::Transport("null chain set unreachable".into()));
        }
        Ok(state)
    }

    fn check_reference(state: &ChainState, decoded: &DecodedTransaction) -> Result<(), ChainError> {
        let header = &decoded.header;
        let distance = (state.head as u16).wrapping_sub(header.ref_block_num) as u32;
        let candidate = state
            .head
            .checked_sub(distance)
            .filter(|n| *n > 0)
            .ok_or_else(|| rejected(RejectionKind::Other, "unknown reference block"))?;
        if block_prefix(candidate) != header.ref_block_prefix {
            return Err(rejected(RejectionKind::Other, "reference block prefix mismatch"));
        }
        Ok(())
    }

    fn authority(state: &ChainState, level: &PermissionLevel) -> Result<PublicKey, ChainError> {
        state
            .authorities
            .get(level)
            .cloned()
            .ok_or_else(|| rejected(RejectionKind::Authorization, format!("unknown authority {level}")))
    }
}

fn block_id(block_num: u32) -> [u8; 32] {
    let mut id = [0u8; 32];
    id[..4].copy_from_slice(&block_num.to_be_bytes());
    id[8..12].copy_from_slice(&block_prefix(block_num).to_le_bytes());
    id
}

fn block_prefix(block_num: u32) -> u32 {
    block_num.wrapping_mul(2_654_435_761) ^ 0x5eed_f00d
}

fn block_time(block_num: u32) -> Timestamp {
    Timestamp::new(GENESIS_TIME + block_num)
}

#[async_trait]
impl ChainApi for NullChain {
    async fn chain_info(&self) -> Result<ChainInfo, ChainError> {
        let state = self.reachable()?;
        Ok(ChainInfo {
            chain_id: self.chain_id,
            head_block_num: state.head,
            head_block_time: block_time(state.head),
        })
    }

    async fn block(&self, block_num: u32) -> Result<BlockSummary, ChainError> {
        let state = self.reachable()?;
        if block_num == 0 || block_num > state.head {
            return Err(ChainError::BlockNotFound(block_num));
        }
        Ok(BlockSummary {
            block_num,
            id: block_id(block_num),
            timestamp: block_time(block_num),
        })
    }

    async fn required_keys(
        &self,
        actions: &[Action],
        available_keys: &[PublicKey],
    ) -> Result<Vec<PublicKey>, ChainError> {
        let state = self.reachable()?;
        let mut required = Vec::new();
        for level in distinct_authorizations(actions) {
            let key = Self::authority(&state, &level)?;
            if !available_keys.contains(&key) {
                return Err(rejected(
                    RejectionKind::Authorization,
                    format!("no available key satisfies {level}"),
                ));
            }
            if !required.contains(&key) {
                required.push(key);
            }
        }
        Ok(required)
    }

    async fn push_transaction(
        &self,
        signed: &SignedTransaction,
    ) -> Result<PushReceipt, ChainError> {
        let mut state = self.reachable()?;
        let encoding = &signed.serialized_transaction;
        let decoded =
            decode(encoding).map_err(|e| rejected(RejectionKind::Other, e.to_string()))?;

        Self::check_reference(&state, &decoded)?;
        if decoded.header.expiration.has_passed(self.clock.now()) {
            return Err(rejected(RejectionKind::Expired, "transaction expired"));
        }
        let id = transaction_id(encoding);
        if state.seen.contains(&id) {
            return Err(rejected(RejectionKind::Duplicate, format!("duplicate {id}")));
        }

        let keys = distinct_authorizations(&decoded.actions)
            .iter()
            .map(|level| Self::authority(&state, level))
            .collect::<Result<BTreeSet<_>, _>>()?;
        if signed.signatures.len() != keys.len() {
            return Err(rejected(
                RejectionKind::Authorization,
                format!(
                    "expected {} signatures, got {}",
                    keys.len(),
                    signed.signatures.len()
                ),
            ));
        }
        let mut unsatisfied = keys;
        for signature in &signed.signatures {
            let signer = unsatisfied
                .iter()
                .find(|key| verify_encoding(&self.chain_id, encoding, signature, key))
                .cloned()
                .ok_or_else(|| {
                    rejected(
                        RejectionKind::Authorization,
                        "signature matches no outstanding required key",
                    )
                })?;
            unsatisfied.remove(&signer);
        }

        state.seen.insert(id.clone());
        state.pushed.push(signed.clone());
        Ok(PushReceipt { transaction_id: id })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use freecpu_codec::encode_actions;
    use freecpu_crypto::{keypair_from_seed, sign_encoding};
    use freecpu_types::{HeaderHints, TransactionHeader};
    use serde_json::json;

    fn alice() -> PermissionLevel {
        "alice@active".parse().unwrap()
    }

    fn chain() -> NullChain {
        NullChain::for_network(NetworkId::Kylin)
            .with_authority(alice(), keypair_from_seed(&[1; 32]).public)
    }

    fn actions() -> Vec<Action> {
        vec![Action::new(
            "eosio.token".parse().unwrap(),
            "transfer".parse().unwrap(),
            vec![alice()],
            json!({"from": "alice", "to": "bob", "quantity": "1.0000 EOS", "memo": ""}),
        )]
    }

    async fn header(chain: &NullChain) -> TransactionHeader {
        freecpu_chain::resolve_header(chain, &HeaderHints::default())
            .await
            .unwrap()
    }

    async fn signed_by(chain: &NullChain, seed: u8) -> SignedTransaction {
        let enc = encode_actions(&actions(), &header(chain).await).unwrap();
        let sig = sign_encoding(chain.chain_id(), &enc, &keypair_from_seed(&[seed; 32]).private);
        SignedTransaction::new(enc, vec![sig])
    }

    #[tokio::test]
    async fn accepts_valid_transaction_once() {
        let chain = chain();
        let tx = signed_by(&chain, 1).await;
        assert!(chain.push_transaction(&tx).await.is_ok());
        let dup = chain.push_transaction(&tx).await.unwrap_err();
        assert!(matches!(
            dup,
            ChainError::Rejected {
                kind: RejectionKind::Duplicate,
                ..
            }
        ));
        assert_eq!(chain.pushed().len(), 1);
        assert_eq!(chain.pushed_actions(), vec![actions()]);
    }

    #[tokio::test]
    async fn rejects_wrong_signer() {
        let chain = chain();
        let tx = signed_by(&chain, 2).await;
        assert!(matches!(
            chain.push_transaction(&tx).await,
            Err(ChainError::Rejected {
                kind: RejectionKind::Authorization,
                ..
            })
        ));
    }

    #[tokio::test]
    async fn rejects_expired() {
        let chain = chain();
        let tx = signed_by(&chain, 1).await;
        chain.clock().advance(120);
        assert!(matches!(
            chain.push_transaction(&tx).await,
            Err(ChainError::Rejected {
                kind: RejectionKind::Expired,
                ..
            })
        ));
    }

    #[tokio::test]
    async fn header_stays_valid_as_chain_grows() {
        let chain = chain();
        let tx = signed_by(&chain, 1).await;
        chain.produce_blocks(10);
        assert!(chain.push_transaction(&tx).await.is_ok());
    }

    #[tokio::test]
    async fn required_keys_follow_authority_map() {
        let chain = chain();
        let key = keypair_from_seed(&[1; 32]).public;
        assert_eq!(
            chain.required_keys(&actions(), &[key.clone()]).await.unwrap(),
            vec![key]
        );
        assert!(chain.required_keys(&actions(), &[]).await.is_err());
    }

    #[tokio::test]
    async fn levels_sharing_a_key_need_one_signature() {
        let chain = chain();
        let owner: PermissionLevel = "alice@owner".parse().unwrap();
        let key = keypair_from_seed(&[1; 32]).public;
        chain.register(owner.clone(), key.clone());
        let mut two_levels = actions();
        two_levels[0].authorization.push(owner);

        assert_eq!(
            chain.required_keys(&two_levels, &[key.clone()]).await.unwrap(),
            vec![key]
        );

        let enc = encode_actions(&two_levels, &header(&chain).await).unwrap();
        let sig = sign_encoding(chain.chain_id(), &enc, &keypair_from_seed(&[1; 32]).private);
        let twice = SignedTransaction::new(enc.clone(), vec![sig.clone(), sig.clone()]);
        assert!(matches!(
            chain.push_transaction(&twice).await,
            Err(ChainError::Rejected {
                kind: RejectionKind::Authorization,
                ..
            })
        ));

        let once = SignedTransaction::new(enc, vec![sig]);
        assert!(chain.push_transaction(&once).await.is_ok());
    }

    #[tokio::test]
    async fn unreachable_chain_fails_everything() {
        let chain = chain();
        chain.set_unreachable(true);
        assert!(matches!(
            chain.chain_info().await,
            Err(ChainError::Transport(_))
        ));
    }
}
