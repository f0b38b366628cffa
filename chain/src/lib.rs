//! Access to the ledger.
//!
//! The ledger is an external collaborator: it tells us the current chain state,
//! which keys an authorization list requires, and accepts or refuses signed
//! transactions. [`ChainApi`] is that capability; [`HttpChainClient`] talks to a
//! node over HTTP and `freecpu-nullables` provides an in-memory stand-in.

pub mod api;
pub mod error;
pub mod header;
pub mod http;

pub use api::{BlockSummary, ChainApi, ChainInfo, PushReceipt};
pub use error::{ChainError, RejectionKind};
pub use header::resolve_header;
pub use http::HttpChainClient;
