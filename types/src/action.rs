//! Actions and the permission levels that authorize them.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::TypesError;
use crate::name::Name;

/// An `(actor, permission)` pair authorizing an action.
#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct PermissionLevel {
    pub actor: Name,
    pub permission: Name,
}

impl PermissionLevel {
    pub fn new(actor: Name, permission: Name) -> Self {
        Self { actor, permission }
    }
}

impl fmt::Display for PermissionLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}@{}", self.actor, self.permission)
    }
}

impl FromStr for PermissionLevel {
    type Err = TypesError;

    /// Parse `actor@permission`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (actor, permission) = s
            .split_once('@')
            .ok_or_else(|| TypesError::InvalidPermissionLevel(s.to_string()))?;
        Ok(Self {
            actor: actor.parse()?,
            permission: permission.parse()?,
        })
    }
}

/// A single contract invocation inside a transaction.
///
/// `data` is the structured payload as the contract's ABI would describe it.
/// The first entry of `authorization` on the first action is the account the
/// ledger bills for CPU/NET.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Action {
    pub account: Name,
    pub name: Name,
    #[serde(alias = "authorizations")]
    pub authorization: Vec<PermissionLevel>,
    #[serde(default)]
    pub data: serde_json::Value,
}

impl Action {
    pub fn new(
        account: Name,
        name: Name,
        authorization: Vec<PermissionLevel>,
        data: serde_json::Value,
    ) -> Self {
        Self {
            account,
            name,
            authorization,
            data,
        }
    }

    /// Look up a string field of the payload, if the payload is an object.
    pub fn data_str(&self, field: &str) -> Option<&str> {
        self.data.get(field).and_then(|v| v.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn permission_level_parse_and_display() {
        let level: PermissionLevel = "eosiactester@freecpu".parse().unwrap();
        assert_eq!(level.actor, "eosiactester");
        assert_eq!(level.permission, "freecpu");
        assert_eq!(level.to_string(), "eosiactester@freecpu");
    }

    #[test]
    fn permission_level_requires_separator() {
        assert!("alice".parse::<PermissionLevel>().is_err());
        assert!("alice@".parse::<PermissionLevel>().is_err());
    }

    #[test]
    fn action_accepts_both_authorization_spellings() {
        let a: Action = serde_json::from_value(json!({
            "account": "eosio.token",
            "name": "transfer",
            "authorizations": [{"actor": "alice", "permission": "active"}],
            "data": {"to": "bob"}
        }))
        .unwrap();
        assert_eq!(a.authorization.len(), 1);
        assert_eq!(a.data_str("to"), Some("bob"));
        assert_eq!(a.data_str("missing"), None);
    }
}
