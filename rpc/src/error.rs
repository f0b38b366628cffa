//! RPC error types.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use freecpu_chain::ChainError;
use freecpu_codec::CodecError;
use freecpu_crypto::CryptoError;
use freecpu_policy::PolicyRejection;
use freecpu_types::ErrorResponse;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum RpcError {
    #[error("No transaction passed")]
    MissingTransaction,

    #[error("invalid request: {0}")]
    InvalidRequest(String),

    #[error(transparent)]
    Policy(#[from] PolicyRejection),

    #[error(transparent)]
    Chain(#[from] ChainError),

    #[error("encoding failed: {0}")]
    Codec(#[from] CodecError),

    #[error("signing failed: {0}")]
    Signing(#[from] CryptoError),

    #[error("configuration error: {0}")]
    Config(String),

    #[error("server error: {0}")]
    Server(String),
}

impl RpcError {
    /// Every failure a client can cause or observe on the signing endpoint is a 400.
    pub fn status(&self) -> StatusCode {
        match self {
            Self::Config(_) | Self::Server(_) => StatusCode::INTERNAL_SERVER_ERROR,
            _ => StatusCode::BAD_REQUEST,
        }
    }
}

impl IntoResponse for RpcError {
    fn into_response(self) -> Response {
        let body = ErrorResponse {
            error: self.to_string(),
        };
        (self.status(), Json(body)).into_response()
    }
}
