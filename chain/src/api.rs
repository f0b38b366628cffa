//! The ledger capability.

use async_trait::async_trait;
use freecpu_types::{Action, ChainId, PublicKey, SignedTransaction, Timestamp};

use crate::error::ChainError;

/// Head of the chain as reported by a node.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ChainInfo {
    pub chain_id: ChainId,
    pub head_block_num: u32,
    pub head_block_time: Timestamp,
}

/// The parts of a block a transaction header references.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct BlockSummary {
    pub block_num: u32,
    pub id: [u8; 32],
    pub timestamp: Timestamp,
}

/// Confirmation returned when the ledger accepts a transaction.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PushReceipt {
    pub transaction_id: String,
}

#[async_trait]
pub trait ChainApi: Send + Sync {
    async fn chain_info(&self) -> Result<ChainInfo, ChainError>;

    async fn block(&self, block_num: u32) -> Result<BlockSummary, ChainError>;

    /// The subset of `available_keys` needed to satisfy the authorizations of
    /// `actions`, in authorization walk order.
    async fn required_keys(
        &self,
        actions: &[Action],
        available_keys: &[PublicKey],
    ) -> Result<Vec<PublicKey>, ChainError>;

    /// Broadcast a fully signed transaction.
    async fn push_transaction(&self, signed: &SignedTransaction)
        -> Result<PushReceipt, ChainError>;
}
