//! Per-account action rules.

use std::collections::{BTreeMap, BTreeSet};

use freecpu_types::{Action, Name, PermissionLevel};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::PolicyRejection;
use crate::placement::check_sponsor_placement;

/// Action name of a token transfer.
pub const TRANSFER_ACTION: &str = "transfer";

/// What the sponsor accepts for actions on a given contract account.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AccountRule {
    /// Only `transfer` actions whose `to` is an allowed account.
    TransferToAllowed,
    /// Any action. Used for the allowed accounts' own contracts, whose logic
    /// is trusted wholesale.
    Unrestricted,
}

/// Policy as written in the service configuration file.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct PolicyConfig {
    /// Token contracts whose transfers are paid for when sent to an allowed account.
    #[serde(default = "default_token_contracts")]
    pub token_contracts: Vec<Name>,

    /// Accounts that may receive sponsored transfers and whose own contracts
    /// are sponsored unconditionally.
    #[serde(default)]
    pub allowed_accounts: Vec<Name>,
}

fn default_token_contracts() -> Vec<Name> {
    vec![Name::from_static("eosio.token")]
}

impl Default for PolicyConfig {
    fn default() -> Self {
        Self {
            token_contracts: default_token_contracts(),
            allowed_accounts: Vec::new(),
        }
    }
}

/// Immutable sponsor policy, built once at startup.
///
/// Accounts without a rule are rejected.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Policy {
    allowed_accounts: BTreeSet<Name>,
    rules: BTreeMap<Name, AccountRule>,
    sponsor: Option<PermissionLevel>,
}

impl Policy {
    /// A policy that accepts nothing.
    pub fn deny_all() -> Self {
        Self {
            allowed_accounts: BTreeSet::new(),
            rules: BTreeMap::new(),
            sponsor: None,
        }
    }

    /// Build from configuration.
    ///
    /// If a name is configured both as a token contract and as an allowed
    /// account, the stricter token rule wins.
    pub fn from_config(config: &PolicyConfig) -> Self {
        let mut policy = Self::deny_all();
        for account in &config.allowed_accounts {
            policy.allowed_accounts.insert(account.clone());
            policy
                .rules
                .insert(account.clone(), AccountRule::Unrestricted);
        }
        for contract in &config.token_contracts {
            policy
                .rules
                .insert(contract.clone(), AccountRule::TransferToAllowed);
        }
        policy
    }

    /// Also require the sponsor's authorization to sit at `actions[0].authorization[0]`
    /// and nowhere else (see [`check_sponsor_placement`]).
    pub fn with_sponsor(mut self, sponsor: PermissionLevel) -> Self {
        self.sponsor = Some(sponsor);
        self
    }

    pub fn sponsor(&self) -> Option<&PermissionLevel> {
        self.sponsor.as_ref()
    }

    pub fn is_allowed_account(&self, name: &str) -> bool {
        self.allowed_accounts.contains(name)
    }

    pub fn rule_for(&self, account: &Name) -> Option<&AccountRule> {
        self.rules.get(account)
    }

    /// Validate every action. The first failing action rejects the whole list.
    pub fn validate(&self, actions: &[Action]) -> Result<(), PolicyRejection> {
        if actions.is_empty() {
            return Err(PolicyRejection::transaction("transaction has no actions"));
        }
        for (index, action) in actions.iter().enumerate() {
            self.validate_action(index, action)?;
        }
        debug!(actions = actions.len(), "policy accepted all actions");
        Ok(())
    }

    /// Full sponsor-side check: action rules, then sponsor placement if a
    /// sponsor is configured.
    pub fn check(&self, actions: &[Action]) -> Result<(), PolicyRejection> {
        self.validate(actions)?;
        if let Some(sponsor) = &self.sponsor {
            check_sponsor_placement(actions, sponsor)?;
        }
        Ok(())
    }

    fn validate_action(&self, index: usize, action: &Action) -> Result<(), PolicyRejection> {
        if action.authorization.is_empty() {
            return Err(PolicyRejection::action(index, "action has no authorization"));
        }

        match self.rules.get(&action.account) {
            Some(AccountRule::Unrestricted) => Ok(()),
            Some(AccountRule::TransferToAllowed) => {
                if action.name != TRANSFER_ACTION {
                    return Err(PolicyRejection::action(
                        index,
                        format!(
                            "CPU for {} actions on {} are not paid",
                            action.name, action.account
                        ),
                    ));
                }
                match action.data_str("to") {
                    Some(to) if self.is_allowed_account(to) => Ok(()),
                    Some(_) => Err(PolicyRejection::action(
                        index,
                        "CPU for transfers to other accounts are not paid",
                    )),
                    None => Err(PolicyRejection::action(
                        index,
                        "transfer is missing its destination",
                    )),
                }
            }
            None => Err(PolicyRejection::action(
                index,
                format!("CPU for actions on {} are not paid", action.account),
            )),
        }
    }
}
