//! Sponsor policy.
//!
//! The policy is the only thing standing between a client and arbitrary
//! actions billed to the sponsor, so it denies by default and rejects the
//! whole transaction when any single action fails a rule.

pub mod error;
pub mod placement;
pub mod policy;

pub use error::PolicyRejection;
pub use placement::check_sponsor_placement;
pub use policy::{AccountRule, Policy, PolicyConfig, TRANSFER_ACTION};
