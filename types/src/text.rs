//! Serde adapter for fields stored in their `Display` / `FromStr` text form,
//! e.g. a permission level written as `"eosiactester@freecpu"` in TOML.
//!
//! ```ignore
//! #[serde(with = "freecpu_types::text")]
//! pub sponsor: PermissionLevel,
//! ```

use serde::{de, Deserialize, Deserializer, Serializer};
use std::fmt::Display;
use std::str::FromStr;

pub fn serialize<T: Display, S: Serializer>(value: &T, serializer: S) -> Result<S::Ok, S::Error> {
    serializer.collect_str(value)
}

pub fn deserialize<'de, T, D>(deserializer: D) -> Result<T, D::Error>
where
    T: FromStr,
    T::Err: Display,
    D: Deserializer<'de>,
{
    let s = String::deserialize(deserializer)?;
    s.parse().map_err(de::Error::custom)
}
