//! Token quantities such as `1.0000 EOS`.
//!
//! Amounts are fixed-point integers; `precision` is the number of decimal digits.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::TypesError;

/// Maximum symbol length accepted by the ledger.
pub const MAX_SYMBOL_LEN: usize = 7;

#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Asset {
    amount: i64,
    precision: u8,
    symbol: String,
}

impl Asset {
    pub fn new(amount: i64, precision: u8, symbol: impl Into<String>) -> Result<Self, TypesError> {
        let symbol = symbol.into();
        if symbol.is_empty()
            || symbol.len() > MAX_SYMBOL_LEN
            || !symbol.bytes().all(|b| b.is_ascii_uppercase())
        {
            return Err(TypesError::InvalidAsset {
                asset: format!("{amount} {symbol}"),
                reason: "symbol must be 1-7 uppercase letters".into(),
            });
        }
        if precision > 18 {
            return Err(TypesError::InvalidAsset {
                asset: format!("{amount} {symbol}"),
                reason: "precision above 18".into(),
            });
        }
        Ok(Self {
            amount,
            precision,
            symbol,
        })
    }

    /// Raw amount in the smallest unit.
    pub fn amount(&self) -> i64 {
        self.amount
    }

    pub fn precision(&self) -> u8 {
        self.precision
    }

    pub fn symbol(&self) -> &str {
        &self.symbol
    }

    pub fn is_positive(&self) -> bool {
        self.amount > 0
    }
}

impl fmt::Display for Asset {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let sign = if self.amount < 0 { "-" } else { "" };
        let abs = self.amount.unsigned_abs();
        if self.precision == 0 {
            return write!(f, "{sign}{abs} {}", self.symbol);
        }
        let scale = 10u64.pow(self.precision as u32);
        write!(
            f,
            "{sign}{}.{:0width$} {}",
            abs / scale,
            abs % scale,
            self.symbol,
            width = self.precision as usize
        )
    }
}

impl FromStr for Asset {
    type Err = TypesError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = |reason: &str| TypesError::InvalidAsset {
            asset: s.to_string(),
            reason: reason.to_string(),
        };

        let (number, symbol) = s
            .trim()
            .split_once(' ')
            .ok_or_else(|| invalid("expected \"<amount> <SYMBOL>\""))?;
        let (negative, digits) = match number.strip_prefix('-') {
            Some(rest) => (true, rest),
            None => (false, number),
        };
        let (int_part, frac_part) = digits.split_once('.').unwrap_or((digits, ""));
        if int_part.is_empty() || !int_part.bytes().chain(frac_part.bytes()).all(|b| b.is_ascii_digit()) {
            return Err(invalid("amount is not a decimal number"));
        }
        if digits.ends_with('.') {
            return Err(invalid("missing digits after decimal point"));
        }

        let precision = u8::try_from(frac_part.len()).map_err(|_| invalid("precision too large"))?;
        let magnitude: i64 = format!("{int_part}{frac_part}")
            .parse()
            .map_err(|_| invalid("amount out of range"))?;
        let amount = if negative { -magnitude } else { magnitude };
        Self::new(amount, precision, symbol.trim())
    }
}

impl TryFrom<String> for Asset {
    type Error = TypesError;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        s.parse()
    }
}

impl From<Asset> for String {
    fn from(asset: Asset) -> Self {
        asset.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_ledger_quantity() {
        let a: Asset = "1.0000 EOS".parse().unwrap();
        assert_eq!(a.amount(), 10_000);
        assert_eq!(a.precision(), 4);
        assert_eq!(a.symbol(), "EOS");
        assert_eq!(a.to_string(), "1.0000 EOS");
        assert!(a.is_positive());
    }

    #[test]
    fn zero_is_not_positive() {
        let a: Asset = "0.0000 EOS".parse().unwrap();
        assert!(!a.is_positive());
        assert_eq!(a.to_string(), "0.0000 EOS");
    }

    #[test]
    fn negative_display() {
        let a = Asset::new(-5, 4, "EOS").unwrap();
        assert_eq!(a.to_string(), "-0.0005 EOS");
    }

    #[test]
    fn rejects_malformed() {
        for s in ["1.0000", "abc EOS", "1.0000 eos", "1. EOS", "1.0 TOOLONGSYM", ".5 EOS"] {
            assert!(s.parse::<Asset>().is_err(), "{s} should be rejected");
        }
    }
}
