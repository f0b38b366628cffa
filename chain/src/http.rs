//! HTTP client for a ledger node's chain API.

use std::time::Duration;

use async_trait::async_trait;
use chrono::NaiveDateTime;
use freecpu_types::{Action, ChainId, NodeEndpoint, PublicKey, SignedTransaction, Timestamp};
use serde::de::DeserializeOwned;
use serde::Deserialize;
use tracing::{debug, warn};

use crate::api::{BlockSummary, ChainApi, ChainInfo, PushReceipt};
use crate::error::{ChainError, RejectionKind};

/// Default timeout for chain API requests.
const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// Default connection timeout.
const DEFAULT_CONNECT_TIMEOUT: Duration = Duration::from_secs(10);

/// Wraps `reqwest::Client` with the node's base URL.
#[derive(Clone)]
pub struct HttpChainClient {
    http: reqwest::Client,
    endpoint: NodeEndpoint,
}

#[derive(Deserialize)]
struct GetInfoResponse {
    chain_id: String,
    head_block_num: u32,
    head_block_time: String,
}

#[derive(Deserialize)]
struct GetBlockResponse {
    id: String,
    block_num: u32,
    timestamp: String,
}

#[derive(Deserialize)]
struct RequiredKeysResponse {
    required_keys: Vec<PublicKey>,
}

#[derive(Deserialize)]
struct PushResponse {
    transaction_id: String,
}

/// Node error body: `{"error": {"name": "...", "what": "..."}}`.
#[derive(Deserialize)]
struct NodeErrorBody {
    error: NodeErrorDetail,
}

#[derive(Deserialize)]
struct NodeErrorDetail {
    #[serde(default)]
    name: String,
    #[serde(default)]
    what: String,
}

impl HttpChainClient {
    pub fn new(endpoint: NodeEndpoint) -> Result<Self, ChainError> {
        Self::with_timeout(endpoint, DEFAULT_TIMEOUT)
    }

    pub fn with_timeout(endpoint: NodeEndpoint, timeout: Duration) -> Result<Self, ChainError> {
        let http = reqwest::Client::builder()
            .timeout(timeout)
            .connect_timeout(DEFAULT_CONNECT_TIMEOUT)
            .build()
            .map_err(|e| ChainError::Transport(format!("failed to create HTTP client: {e}")))?;
        Ok(Self { http, endpoint })
    }

    pub fn endpoint(&self) -> &NodeEndpoint {
        &self.endpoint
    }

    async fn call<T: DeserializeOwned>(
        &self,
        path: &str,
        body: serde_json::Value,
    ) -> Result<T, ChainError> {
        let url = format!("{}/v1/chain/{path}", self.endpoint.url());
        debug!(%url, "chain API request");

        let response = self.http.post(&url).json(&body).send().await.map_err(|e| {
            if e.is_timeout() {
                ChainError::Transport(format!("request timed out: {e}"))
            } else {
                ChainError::Transport(e.to_string())
            }
        })?;

        let status = response.status();
        let bytes = response
            .bytes()
            .await
            .map_err(|e| ChainError::Transport(e.to_string()))?;

        if !status.is_success() {
            return Err(match serde_json::from_slice::<NodeErrorBody>(&bytes) {
                Ok(body) => ChainError::Rejected {
                    kind: classify(&body.error.name),
                    message: format!("{}: {}", body.error.name, body.error.what),
                },
                Err(_) => ChainError::InvalidResponse(format!("node returned HTTP {status}")),
            });
        }

        serde_json::from_slice(&bytes)
            .map_err(|e| ChainError::InvalidResponse(format!("{path}: {e}")))
    }
}

/// Map node exception names onto rejection kinds.
fn classify(name: &str) -> RejectionKind {
    match name {
        "expired_tx_exception" => RejectionKind::Expired,
        "tx_duplicate" => RejectionKind::Duplicate,
        "unsatisfied_authorization" | "irrelevant_auth_exception" | "missing_auth_exception" => {
            RejectionKind::Authorization
        }
        _ => RejectionKind::Other,
    }
}

/// Node timestamps look like `2019-08-30T12:00:00.500` (UTC, no zone suffix).
fn parse_block_time(s: &str) -> Result<Timestamp, ChainError> {
    let parsed = NaiveDateTime::parse_from_str(s, "%Y-%m-%dT%H:%M:%S%.f")
        .map_err(|e| ChainError::InvalidResponse(format!("bad timestamp {s:?}: {e}")))?;
    let secs = u32::try_from(parsed.and_utc().timestamp())
        .map_err(|_| ChainError::InvalidResponse(format!("timestamp {s:?} out of range")))?;
    Ok(Timestamp::new(secs))
}

fn parse_block_id(s: &str) -> Result<[u8; 32], ChainError> {
    let bytes = hex::decode(s).map_err(|e| ChainError::InvalidResponse(e.to_string()))?;
    bytes
        .try_into()
        .map_err(|_| ChainError::InvalidResponse(format!("block id {s:?} is not 32 bytes")))
}

#[async_trait]
impl ChainApi for HttpChainClient {
    async fn chain_info(&self) -> Result<ChainInfo, ChainError> {
        let info: GetInfoResponse = self.call("get_info", serde_json::json!({})).await?;
        Ok(ChainInfo {
            chain_id: info
                .chain_id
                .parse::<ChainId>()
                .map_err(|e| ChainError::InvalidResponse(e.to_string()))?,
            head_block_num: info.head_block_num,
            head_block_time: parse_block_time(&info.head_block_time)?,
        })
    }

    async fn block(&self, block_num: u32) -> Result<BlockSummary, ChainError> {
        let block: GetBlockResponse = self
            .call(
                "get_block",
                serde_json::json!({ "block_num_or_id": block_num }),
            )
            .await
            .map_err(|e| match e {
                ChainError::Rejected { .. } => ChainError::BlockNotFound(block_num),
                other => other,
            })?;
        Ok(BlockSummary {
            block_num: block.block_num,
            id: parse_block_id(&block.id)?,
            timestamp: parse_block_time(&block.timestamp)?,
        })
    }

    async fn required_keys(
        &self,
        actions: &[Action],
        available_keys: &[PublicKey],
    ) -> Result<Vec<PublicKey>, ChainError> {
        let resp: RequiredKeysResponse = self
            .call(
                "get_required_keys",
                serde_json::json!({
                    "transaction": { "actions": actions },
                    "available_keys": available_keys,
                }),
            )
            .await?;
        Ok(resp.required_keys)
    }

    async fn push_transaction(
        &self,
        signed: &SignedTransaction,
    ) -> Result<PushReceipt, ChainError> {
        let result: Result<PushResponse, ChainError> = self
            .call(
                "push_transaction",
                serde_json::json!({
                    "signatures": signed.signatures,
                    "compression": 0,
                    "packed_context_free_data": "",
                    "packed_trx": signed.serialized_transaction.to_hex(),
                }),
            )
            .await;
        match result {
            Ok(resp) => Ok(PushReceipt {
                transaction_id: resp.transaction_id,
            }),
            Err(e) => {
                warn!("push_transaction failed: {e}");
                Err(e)
            }
        }
    }
}
