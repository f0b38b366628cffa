//! Client side of the sponsor signing endpoint.

use std::time::Duration;

use async_trait::async_trait;
use freecpu_types::{ErrorResponse, SignRequest, SignResponse};
use tracing::debug;

use crate::error::SponsorError;

/// Path of the signing endpoint below the sponsor's base URL.
pub const SIGN_PATH: &str = "/api/eos/sign";

const DEFAULT_CONNECT_TIMEOUT: Duration = Duration::from_secs(5);

/// The sponsor's signing capability as seen by a client.
#[async_trait]
pub trait SponsorApi: Send + Sync {
    async fn request_signature(&self, request: &SignRequest) -> Result<SignResponse, SponsorError>;
}

/// [`SponsorApi`] over HTTP.
#[derive(Clone)]
pub struct HttpSponsorClient {
    http: reqwest::Client,
    sign_url: String,
}

impl HttpSponsorClient {
    /// `base_url` is the sponsor's origin, e.g. `http://127.0.0.1:3031`.
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self, SponsorError> {
        let http = reqwest::Client::builder()
            .timeout(timeout)
            .connect_timeout(DEFAULT_CONNECT_TIMEOUT.min(timeout))
            .build()
            .map_err(|e| SponsorError::Transport(format!("failed to create HTTP client: {e}")))?;
        Ok(Self {
            http,
            sign_url: format!("{}{SIGN_PATH}", base_url.trim_end_matches('/')),
        })
    }

    pub fn sign_url(&self) -> &str {
        &self.sign_url
    }
}

#[async_trait]
impl SponsorApi for HttpSponsorClient {
    async fn request_signature(&self, request: &SignRequest) -> Result<SignResponse, SponsorError> {
        debug!(url = %self.sign_url, "requesting sponsor signature");
        let response = self
            .http
            .post(&self.sign_url)
            .json(request)
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    SponsorError::Timeout
                } else {
                    SponsorError::Transport(e.to_string())
                }
            })?;

        let status = response.status();
        let bytes = response.bytes().await.map_err(|e| {
            if e.is_timeout() {
                SponsorError::Timeout
            } else {
                SponsorError::Transport(e.to_string())
            }
        })?;

        if status.is_success() {
            return serde_json::from_slice(&bytes)
                .map_err(|e| SponsorError::MalformedResponse(e.to_string()));
        }
        match serde_json::from_slice::<ErrorResponse>(&bytes) {
            Ok(body) => Err(SponsorError::Rejected(body.error)),
            Err(_) => Err(SponsorError::MalformedResponse(format!(
                "sponsor returned HTTP {status}"
            ))),
        }
    }
}
