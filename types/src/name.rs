//! Ledger names (accounts, actions, permissions).
//!
//! A name is up to 12 characters from `.12345abcdefghijklmnopqrstuvwxyz` and is
//! packed into a `u64` on the wire: 5 bits per character, most significant first.

use serde::{Deserialize, Serialize};
use std::borrow::Borrow;
use std::fmt;
use std::str::FromStr;

use crate::error::TypesError;

const CHARMAP: &[u8; 32] = b".12345abcdefghijklmnopqrstuvwxyz";

/// Maximum length of a name we accept.
pub const MAX_NAME_LEN: usize = 12;

/// A validated ledger name.
#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Name(String);

impl Name {
    /// Validate and wrap a name.
    pub fn new(raw: impl Into<String>) -> Result<Self, TypesError> {
        let s = raw.into();
        let invalid = |reason: &str| TypesError::InvalidName {
            name: s.clone(),
            reason: reason.to_string(),
        };

        if s.is_empty() {
            return Err(invalid("empty"));
        }
        if s.len() > MAX_NAME_LEN {
            return Err(invalid("longer than 12 characters"));
        }
        if let Some(bad) = s.bytes().find(|b| symbol_value(*b).is_none()) {
            return Err(invalid(&format!("character {:?} not allowed", bad as char)));
        }
        if s.ends_with('.') {
            return Err(invalid("must not end with '.'"));
        }
        Ok(Self(s))
    }

    /// Wrap a built-in constant such as `"eosio.token"`.
    ///
    /// # Panics
    ///
    /// Panics if the literal is not a valid name.
    pub fn from_static(raw: &'static str) -> Self {
        match Self::new(raw) {
            Ok(name) => name,
            Err(e) => panic!("built-in name {raw:?} is invalid: {e}"),
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Pack into the ledger's 64-bit representation.
    pub fn to_u64(&self) -> u64 {
        let mut value = 0u64;
        for (i, b) in self.0.bytes().enumerate() {
            // validated in `new`, every byte is in the charmap
            let symbol = symbol_value(b).unwrap_or(0) as u64;
            value |= (symbol & 0x1f) << (64 - 5 * (i + 1));
        }
        value
    }

    /// Unpack from the ledger's 64-bit representation.
    pub fn from_u64(value: u64) -> Result<Self, TypesError> {
        let mut chars = [b'.'; 13];
        let mut tmp = value;
        for i in 0..=12 {
            let (mask, shift) = if i == 0 { (0x0f, 4) } else { (0x1f, 5) };
            chars[12 - i] = CHARMAP[(tmp & mask) as usize];
            tmp >>= shift;
        }
        let text = String::from_utf8_lossy(&chars);
        Self::new(text.trim_end_matches('.'))
    }
}

fn symbol_value(b: u8) -> Option<u8> {
    CHARMAP.iter().position(|c| *c == b).map(|p| p as u8)
}

impl fmt::Display for Name {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl FromStr for Name {
    type Err = TypesError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s)
    }
}

impl TryFrom<String> for Name {
    type Error = TypesError;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        Self::new(s)
    }
}

impl From<Name> for String {
    fn from(name: Name) -> Self {
        name.0
    }
}

impl PartialEq<str> for Name {
    fn eq(&self, other: &str) -> bool {
        self.0 == other
    }
}

impl PartialEq<&str> for Name {
    fn eq(&self, other: &&str) -> bool {
        self.0 == *other
    }
}

// Ordering and hashing are those of the inner string, so sets keyed by `Name`
// can be queried with a plain `&str`.
impl Borrow<str> for Name {
    fn borrow(&self) -> &str {
        &self.0
    }
}
