use thiserror::Error;

/// Why the ledger refused a transaction.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum RejectionKind {
    Expired,
    Duplicate,
    Authorization,
    Other,
}

#[derive(Debug, Error)]
pub enum ChainError {
    #[error("ledger rejected transaction ({kind:?}): {message}")]
    Rejected { kind: RejectionKind, message: String },

    #[error("block {0} not found")]
    BlockNotFound(u32),

    #[error("node unreachable: {0}")]
    Transport(String),

    #[error("invalid node response: {0}")]
    InvalidResponse(String),
}
