//! Timestamp type used for block times and transaction expiration.
//!
//! The ledger stores expiration as 32-bit Unix epoch seconds (UTC).

use serde::{Deserialize, Serialize};
use std::fmt;

/// A Unix timestamp in seconds since epoch (UTC), 32-bit as on the wire.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Timestamp(u32);

impl Timestamp {
    /// The epoch (time zero).
    pub const EPOCH: Self = Self(0);

    pub fn new(secs: u32) -> Self {
        Self(secs)
    }

    pub fn as_secs(&self) -> u32 {
        self.0
    }

    /// This timestamp shifted forward, saturating at the 32-bit limit.
    pub fn plus_secs(&self, secs: u32) -> Self {
        Self(self.0.saturating_add(secs))
    }

    /// Whether this instant is at or before `now`.
    pub fn has_passed(&self, now: Timestamp) -> bool {
        self.0 <= now.0
    }
}

impl fmt::Display for Timestamp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}s", self.0)
    }
}
