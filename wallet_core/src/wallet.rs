//! Core wallet: one sender, its signing keys, and an optional sponsor.

use std::sync::Arc;
use std::time::Duration;

use freecpu_chain::{ChainApi, HttpChainClient};
use freecpu_crypto::SignatureProvider;
use freecpu_types::{Action, PermissionLevel};
use tracing::info;

use crate::config::ClientConfig;
use crate::cosign::{CosignCoordinator, CosignReceipt};
use crate::error::WalletError;
use crate::sponsor_client::{HttpSponsorClient, SponsorApi};
use crate::transaction_builder::{TransactionBuilder, TransferRequest};

pub struct Wallet {
    sender: PermissionLevel,
    builder: TransactionBuilder,
    coordinator: CosignCoordinator,
}

impl Wallet {
    pub fn new(
        sender: PermissionLevel,
        chain: Arc<dyn ChainApi>,
        signer: Arc<dyn SignatureProvider>,
    ) -> Self {
        Self {
            builder: TransactionBuilder::new().sender(sender.clone()),
            sender,
            coordinator: CosignCoordinator::new(chain, signer),
        }
    }

    /// Route transactions through a sponsor, falling back to self-pay when it
    /// declines or does not answer within `timeout`.
    pub fn with_sponsor(
        mut self,
        api: Arc<dyn SponsorApi>,
        permission: PermissionLevel,
        timeout: Duration,
    ) -> Self {
        self.builder = self.builder.sponsored_by(permission.clone());
        self.coordinator = self
            .coordinator
            .with_sponsor(api, permission)
            .with_timeout(timeout);
        self
    }

    /// Replace the transaction builder, keeping the wallet's sender. Call
    /// before [`with_sponsor`](Self::with_sponsor), which configures the builder too.
    pub fn with_builder(mut self, builder: TransactionBuilder) -> Self {
        self.builder = builder.sender(self.sender.clone());
        self
    }

    /// Build a wallet talking to the configured node and sponsor over HTTP.
    pub fn from_config(
        config: &ClientConfig,
        signer: Arc<dyn SignatureProvider>,
    ) -> Result<Self, WalletError> {
        let endpoint = config.node_endpoint()?;
        let chain = HttpChainClient::with_timeout(endpoint, config.chain_timeout())
            .map_err(WalletError::Chain)?;
        let mut wallet = Self::new(config.sender.clone(), Arc::new(chain), signer).with_builder(
            TransactionBuilder::new()
                .token_contract(config.token_contract.clone())
                .header_hints(config.header),
        );
        if let Some(sponsor) = &config.sponsor {
            let client = HttpSponsorClient::new(&sponsor.url, sponsor.timeout())
                .map_err(WalletError::Sponsor)?;
            wallet = wallet.with_sponsor(
                Arc::new(client),
                sponsor.permission.clone(),
                sponsor.timeout(),
            );
        }
        Ok(wallet)
    }

    pub fn sender(&self) -> &PermissionLevel {
        &self.sender
    }

    pub fn is_sponsored(&self) -> bool {
        self.builder.sponsor().is_some()
    }

    /// Transfer tokens. Input is validated before any network call.
    pub async fn transfer(&self, request: &TransferRequest) -> Result<CosignReceipt, WalletError> {
        let tx = self.builder.transfer(request)?;
        info!(
            from = %self.sender,
            to = ?request.receiver.as_ref().map(ToString::to_string),
            repetitions = request.repetitions,
            "submitting transfer"
        );
        self.coordinator.cosign(tx).await
    }

    /// Submit arbitrary actions, each repeated `repetitions` times.
    pub async fn submit(
        &self,
        actions: Vec<Action>,
        repetitions: usize,
    ) -> Result<CosignReceipt, WalletError> {
        let tx = self.builder.build(actions, repetitions)?;
        self.coordinator.cosign(tx).await
    }
}
