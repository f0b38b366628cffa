//! Reference-block binding (TAPOS).
//!
//! A header names a recent block by number and a slice of its id, and expires a
//! fixed number of seconds after that block. Resolving the same hints twice a
//! few blocks apart gives different headers, which is why the client must reuse
//! the sponsor's encoding instead of resolving its own.

use freecpu_types::{HeaderHints, TransactionHeader};
use tracing::debug;

use crate::api::ChainApi;
use crate::error::ChainError;

/// Resolve header hints against the current chain state.
pub async fn resolve_header(
    chain: &dyn ChainApi,
    hints: &HeaderHints,
) -> Result<TransactionHeader, ChainError> {
    let info = chain.chain_info().await?;
    let ref_num = info.head_block_num.saturating_sub(hints.blocks_behind).max(1);
    let block = chain.block(ref_num).await?;

    let header = TransactionHeader {
        expiration: block.timestamp.plus_secs(hints.expire_seconds),
        ref_block_num: (block.block_num & 0xffff) as u16,
        ref_block_prefix: u32::from_le_bytes([
            block.id[8],
            block.id[9],
            block.id[10],
            block.id[11],
        ]),
    };
    debug!(
        ref_block = block.block_num,
        expiration = header.expiration.as_secs(),
        "resolved transaction header"
    );
    Ok(header)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::{BlockSummary, ChainInfo, PushReceipt};
    use async_trait::async_trait;
    use freecpu_types::{Action, NetworkId, PublicKey, SignedTransaction, Timestamp};

    struct FixedChain {
        head: u32,
    }

    #[async_trait]
    impl ChainApi for FixedChain {
        async fn chain_info(&self) -> Result<ChainInfo, ChainError> {
            Ok(ChainInfo {
                chain_id: NetworkId::Jungle.chain_id(),
                head_block_num: self.head,
                head_block_time: Timestamp::new(1_000 + self.head),
            })
        }

        async fn block(&self, block_num: u32) -> Result<BlockSummary, ChainError> {
            if block_num > self.head {
                return Err(ChainError::BlockNotFound(block_num));
            }
            let mut id = [0u8; 32];
            id[..4].copy_from_slice(&block_num.to_be_bytes());
            id[8..12].copy_from_slice(&[0x01, 0x02, 0x03, 0x04]);
            Ok(BlockSummary {
                block_num,
                id,
                timestamp: Timestamp::new(1_000 + block_num),
            })
        }

        async fn required_keys(
            &self,
            _actions: &[Action],
            _available_keys: &[PublicKey],
        ) -> Result<Vec<PublicKey>, ChainError> {
            Ok(Vec::new())
        }

        async fn push_transaction(
            &self,
            _signed: &SignedTransaction,
        ) -> Result<PushReceipt, ChainError> {
            Err(ChainError::Transport("read-only".into()))
        }
    }

    #[tokio::test]
    async fn references_block_behind_head() {
        let chain = FixedChain { head: 0x1_0005 };
        let hints = HeaderHints {
            blocks_behind: 3,
            expire_seconds: 60,
        };
        let header = resolve_header(&chain, &hints).await.unwrap();
        assert_eq!(header.ref_block_num, 0x0002);
        assert_eq!(header.ref_block_prefix, 0x0403_0201);
        assert_eq!(header.expiration, Timestamp::new(1_000 + 0x1_0002 + 60));
    }

    #[tokio::test]
    async fn young_chain_references_block_one() {
        let chain = FixedChain { head: 2 };
        let header = resolve_header(&chain, &HeaderHints::default()).await.unwrap();
        assert_eq!(header.ref_block_num, 1);
    }

    #[tokio::test]
    async fn same_state_same_header() {
        let chain = FixedChain { head: 500 };
        let hints = HeaderHints::default();
        assert_eq!(
            resolve_header(&chain, &hints).await.unwrap(),
            resolve_header(&chain, &hints).await.unwrap()
        );
    }
}
