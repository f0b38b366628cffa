//! Wallet core library for freecpu.
//!
//! Provides everything a client needs to get its transactions paid for by a
//! sponsor:
//! - Transaction building, with the sponsor's authorization placed first
//! - The sponsor HTTP client
//! - The co-signing coordinator (sponsor round trip, self-pay fallback)
//! - Signature merging and its ordering invariant

pub mod config;
pub mod cosign;
pub mod error;
pub mod merge;
pub mod outcome;
pub mod sponsor_client;
pub mod transaction_builder;
pub mod wallet;

pub use config::{ClientConfig, SponsorConfig};
pub use cosign::{CosignCoordinator, CosignReceipt, CosignStage};
pub use error::{SponsorError, ValidationError, WalletError};
pub use merge::merge;
pub use outcome::{SponsorOutcome, UnavailableReason};
pub use sponsor_client::{HttpSponsorClient, SponsorApi};
pub use transaction_builder::{strip_sponsor_authorization, TransactionBuilder, TransferRequest};
pub use wallet::Wallet;
