//! Where the sponsor's own authorization may appear.
//!
//! The ledger bills the first authorizer of the first action. The sponsor's
//! permission belongs exactly there: anywhere else it would lend the sponsor's
//! authority to an action it never meant to authorize.

use freecpu_types::{Action, PermissionLevel};

use crate::error::PolicyRejection;

/// Require `sponsor` to be `actions[0].authorization[0]`, the sponsor account
/// to appear in no other authorization, and no action to spend `from` the sponsor.
pub fn check_sponsor_placement(
    actions: &[Action],
    sponsor: &PermissionLevel,
) -> Result<(), PolicyRejection> {
    let first = actions
        .first()
        .and_then(|a| a.authorization.first())
        .ok_or_else(|| PolicyRejection::transaction("transaction has no authorizations"))?;
    if first != sponsor {
        return Err(PolicyRejection::action(
            0,
            format!("first authorization must be the sponsor {sponsor}"),
        ));
    }

    for (index, action) in actions.iter().enumerate() {
        let skip = usize::from(index == 0);
        if action
            .authorization
            .iter()
            .skip(skip)
            .any(|level| level.actor == sponsor.actor)
        {
            return Err(PolicyRejection::action(
                index,
                format!("{} may only authorize as first authorizer", sponsor.actor),
            ));
        }
        if action.data_str("from") == Some(sponsor.actor.as_str()) {
            return Err(PolicyRejection::action(
                index,
                format!("actions spending from {} are not signed", sponsor.actor),
            ));
        }
    }
    Ok(())
}
