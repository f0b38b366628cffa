use freecpu_chain::ChainError;
use freecpu_codec::CodecError;
use freecpu_crypto::CryptoError;
use thiserror::Error;

/// Bad caller input, caught before any network call.
#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum ValidationError {
    #[error("no sender authorization given")]
    MissingSender,

    #[error("no receiver given")]
    MissingReceiver,

    #[error("amount must be positive: {0}")]
    InvalidAmount(String),

    #[error("transaction has no actions")]
    NoActions,

    #[error("repetitions must be at least 1")]
    InvalidRepetitions,
}

/// Errors talking to a sponsor. All of them lead to the self-pay fallback.
#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum SponsorError {
    #[error("sponsor declined: {0}")]
    Rejected(String),

    #[error("sponsor unreachable: {0}")]
    Transport(String),

    #[error("sponsor request timed out")]
    Timeout,

    #[error("malformed sponsor response: {0}")]
    MalformedResponse(String),
}

#[derive(Debug, Error)]
pub enum WalletError {
    #[error(transparent)]
    Validation(#[from] ValidationError),

    /// The sponsor signed something other than what was asked for.
    #[error("sponsor encoding does not match the requested transaction: {0}")]
    EncodingMismatch(String),

    #[error("signature count mismatch: expected {expected}, got {actual}")]
    SignatureCountMismatch { expected: usize, actual: usize },

    /// The ledger refused the final transaction. Not retried.
    #[error("ledger rejected transaction: {0}")]
    LedgerRejection(ChainError),

    #[error("chain error: {0}")]
    Chain(ChainError),

    #[error("encoding error: {0}")]
    Codec(#[from] CodecError),

    #[error("signing error: {0}")]
    Signing(#[from] CryptoError),

    #[error("sponsor client error: {0}")]
    Sponsor(SponsorError),

    #[error("configuration error: {0}")]
    Config(String),
}
