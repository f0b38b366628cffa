//! HTTP handlers.

use std::collections::BTreeMap;
use std::sync::Arc;

use axum::extract::rejection::JsonRejection;
use axum::extract::State;
use axum::http::StatusCode;
use axum::Json;
use freecpu_types::{SignRequest, SignResponse};
use serde::Serialize;
use tracing::debug;

use crate::error::RpcError;
use crate::server::AppState;

// ── Signing ──────────────────────────────────────────────────────────────

/// `POST /api/eos/sign`: 201 with the sponsor's encoding and signatures.
///
/// Unparseable bodies are answered with the same `{error}` shape as policy
/// rejections rather than axum's plain-text rejection.
pub async fn sign(
    State(state): State<Arc<AppState>>,
    payload: Result<Json<SignRequest>, JsonRejection>,
) -> Result<(StatusCode, Json<SignResponse>), RpcError> {
    let Json(request) = payload.map_err(|e| RpcError::InvalidRequest(e.body_text()))?;
    debug!(
        actions = request.transaction.as_ref().map(|t| t.actions.len()),
        "sign request"
    );
    let response = state.service.sign(request).await?;
    Ok((StatusCode::CREATED, Json(response)))
}

// ── Health ───────────────────────────────────────────────────────────────

#[derive(Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub sponsor: Option<String>,
    pub chain_id: String,
    pub counters: BTreeMap<&'static str, u64>,
}

/// `GET /api/health`
pub async fn health(State(state): State<Arc<AppState>>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok",
        sponsor: state.service.sponsor().map(ToString::to_string),
        chain_id: state.service.chain_id().to_string(),
        counters: state.service.stats(),
    })
}
