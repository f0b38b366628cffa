//! Nullable infrastructure for deterministic testing.
//!
//! External collaborators (the ledger node, the sponsor service, wall-clock
//! time) sit behind traits elsewhere in the workspace. This crate provides
//! in-memory implementations that:
//! - Return deterministic values
//! - Can be controlled programmatically
//! - Never touch the network
//!
//! Usage: swap real implementations for nullables in tests.

pub mod chain;
pub mod clock;
pub mod sponsor;

pub use chain::NullChain;
pub use clock::NullClock;
pub use sponsor::{NullSponsor, SponsorBehavior};
