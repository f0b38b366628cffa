//! Transaction building.
//!
//! The ledger bills CPU/NET to the first authorizer of the first action. A
//! sponsored transaction therefore carries one extra authorization, the
//! sponsor's, at `actions[0].authorization[0]`, ahead of the sender. That
//! placement is the whole trick; it is done here and undone only by
//! [`strip_sponsor_authorization`].

use freecpu_types::{Action, Asset, HeaderHints, Name, PermissionLevel, UnsignedTransaction};
use serde_json::json;
use tracing::debug;

use crate::error::ValidationError;

/// Default contract of the native token.
pub const DEFAULT_TOKEN_CONTRACT: &str = "eosio.token";

/// Memo prefix used when repeated actions carry an empty memo.
const REPEAT_MEMO_PREFIX: &str = "Test Txn";

/// Parameters of a token transfer. `receiver` and `quantity` are optional so a
/// missing value surfaces as a [`ValidationError`] rather than a parse failure
/// somewhere upstream.
#[derive(Clone, Debug, PartialEq)]
pub struct TransferRequest {
    pub receiver: Option<Name>,
    pub quantity: Option<Asset>,
    pub memo: String,
    pub repetitions: usize,
}

impl Default for TransferRequest {
    fn default() -> Self {
        Self {
            receiver: None,
            quantity: None,
            memo: String::new(),
            repetitions: 1,
        }
    }
}

#[derive(Clone, Debug)]
pub struct TransactionBuilder {
    sender: Option<PermissionLevel>,
    sponsor: Option<PermissionLevel>,
    token_contract: Name,
    header: HeaderHints,
}

impl Default for TransactionBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl TransactionBuilder {
    pub fn new() -> Self {
        Self {
            sender: None,
            sponsor: None,
            token_contract: Name::from_static(DEFAULT_TOKEN_CONTRACT),
            header: HeaderHints::default(),
        }
    }

    pub fn sender(mut self, sender: PermissionLevel) -> Self {
        self.sender = Some(sender);
        self
    }

    /// Request sponsor delegation: `sponsor` is inserted ahead of the sender
    /// on the first action.
    pub fn sponsored_by(mut self, sponsor: PermissionLevel) -> Self {
        self.sponsor = Some(sponsor);
        self
    }

    pub fn token_contract(mut self, contract: Name) -> Self {
        self.token_contract = contract;
        self
    }

    pub fn header_hints(mut self, header: HeaderHints) -> Self {
        self.header = header;
        self
    }

    pub fn sponsor(&self) -> Option<&PermissionLevel> {
        self.sponsor.as_ref()
    }

    /// Build a transaction from action templates, each repeated `repetitions`
    /// times.
    ///
    /// Templates without an authorization are authorized by the sender. When
    /// repeating, a string `memo` field is suffixed with the repetition index
    /// so the copies are distinguishable.
    pub fn build(
        &self,
        templates: Vec<Action>,
        repetitions: usize,
    ) -> Result<UnsignedTransaction, ValidationError> {
        let sender = self.sender.as_ref().ok_or(ValidationError::MissingSender)?;
        if templates.is_empty() {
            return Err(ValidationError::NoActions);
        }
        if repetitions == 0 {
            return Err(ValidationError::InvalidRepetitions);
        }

        let mut actions = Vec::with_capacity(templates.len() * repetitions);
        for index in 1..=repetitions {
            for template in &templates {
                let mut action = template.clone();
                if action.authorization.is_empty() {
                    action.authorization.push(sender.clone());
                }
                if repetitions > 1 {
                    tag_memo(&mut action, index);
                }
                actions.push(action);
            }
        }

        if let (Some(sponsor), Some(first)) = (&self.sponsor, actions.first_mut()) {
            first.authorization.insert(0, sponsor.clone());
        }

        debug!(
            actions = actions.len(),
            sponsored = self.sponsor.is_some(),
            "built transaction"
        );
        Ok(UnsignedTransaction::new(actions, self.header))
    }

    /// Build a token transfer from the sender.
    pub fn transfer(&self, request: &TransferRequest) -> Result<UnsignedTransaction, ValidationError> {
        let sender = self.sender.as_ref().ok_or(ValidationError::MissingSender)?;
        let receiver = request
            .receiver
            .as_ref()
            .ok_or(ValidationError::MissingReceiver)?;
        let quantity = match &request.quantity {
            Some(q) if q.is_positive() => q,
            Some(q) => return Err(ValidationError::InvalidAmount(q.to_string())),
            None => return Err(ValidationError::InvalidAmount("missing".into())),
        };

        let template = Action::new(
            self.token_contract.clone(),
            Name::from_static("transfer"),
            vec![sender.clone()],
            json!({
                "from": sender.actor,
                "to": receiver,
                "quantity": quantity.to_string(),
                "memo": request.memo,
            }),
        );
        self.build(vec![template], request.repetitions)
    }
}

fn tag_memo(action: &mut Action, index: usize) {
    if let Some(memo) = action.data.get_mut("memo") {
        if let Some(text) = memo.as_str() {
            let tagged = if text.is_empty() {
                format!("{REPEAT_MEMO_PREFIX} {index}")
            } else {
                format!("{text} {index}")
            };
            *memo = json!(tagged);
        }
    }
}

/// Remove `sponsor` from the front of the first action's authorizations.
///
/// Returns the transaction unchanged if the sponsor is not there. Must run
/// before anything is signed on the fallback path.
pub fn strip_sponsor_authorization(
    tx: &UnsignedTransaction,
    sponsor: &PermissionLevel,
) -> UnsignedTransaction {
    let mut stripped = tx.clone();
    if let Some(first) = stripped.actions.first_mut() {
        if first.authorization.first() == Some(sponsor) {
            first.authorization.remove(0);
        }
    }
    stripped
}

#[cfg(test)]
mod tests {
    use super::*;

    fn level(s: &str) -> PermissionLevel {
        s.parse().unwrap()
    }

    fn builder() -> TransactionBuilder {
        TransactionBuilder::new().sender(level("alice@active"))
    }

    fn transfer(to: &str, qty: &str, reps: usize) -> TransferRequest {
        TransferRequest {
            receiver: Some(to.parse().unwrap()),
            quantity: Some(qty.parse().unwrap()),
            memo: String::new(),
            repetitions: reps,
        }
    }

    #[test]
    fn sponsor_goes_first_on_first_action_only() {
        let tx = builder()
            .sponsored_by(level("eosiactester@freecpu"))
            .transfer(&transfer("cmichelkylin", "1.0000 EOS", 2))
            .unwrap();
        assert_eq!(tx.actions.len(), 2);
        assert_eq!(
            tx.actions[0].authorization,
            vec![level("eosiactester@freecpu"), level("alice@active")]
        );
        assert_eq!(tx.actions[1].authorization, vec![level("alice@active")]);
    }

    #[test]
    fn repeated_transfers_get_distinct_memos() {
        let tx = builder().transfer(&transfer("bob", "1.0000 EOS", 2)).unwrap();
        assert_eq!(tx.actions[0].data_str("memo"), Some("Test Txn 1"));
        assert_eq!(tx.actions[1].data_str("memo"), Some("Test Txn 2"));

        let mut req = transfer("bob", "1.0000 EOS", 2);
        req.memo = "coffee".into();
        let tx = builder().transfer(&req).unwrap();
        assert_eq!(tx.actions[1].data_str("memo"), Some("coffee 2"));
    }

    #[test]
    fn single_transfer_keeps_memo() {
        let mut req = transfer("bob", "0.5000 EOS", 1);
        req.memo = "hi".into();
        let tx = builder().transfer(&req).unwrap();
        assert_eq!(tx.actions.len(), 1);
        let data = &tx.actions[0].data;
        assert_eq!(data["from"], "alice");
        assert_eq!(data["to"], "bob");
        assert_eq!(data["quantity"], "0.5000 EOS");
        assert_eq!(data["memo"], "hi");
    }

    #[test]
    fn validation_errors() {
        let no_sender = TransactionBuilder::new();
        assert_eq!(
            no_sender.transfer(&transfer("bob", "1.0000 EOS", 1)),
            Err(ValidationError::MissingSender)
        );

        let mut no_receiver = transfer("bob", "1.0000 EOS", 1);
        no_receiver.receiver = None;
        assert_eq!(
            builder().transfer(&no_receiver),
            Err(ValidationError::MissingReceiver)
        );

        assert!(matches!(
            builder().transfer(&transfer("bob", "0.0000 EOS", 1)),
            Err(ValidationError::InvalidAmount(_))
        ));

        let mut no_amount = transfer("bob", "1.0000 EOS", 1);
        no_amount.quantity = None;
        assert!(matches!(
            builder().transfer(&no_amount),
            Err(ValidationError::InvalidAmount(_))
        ));

        assert_eq!(
            builder().transfer(&transfer("bob", "1.0000 EOS", 0)),
            Err(ValidationError::InvalidRepetitions)
        );
        assert_eq!(builder().build(vec![], 1), Err(ValidationError::NoActions));
    }

    #[test]
    fn templates_without_authorization_use_sender() {
        let template = Action::new(
            "cmichelkylin".parse().unwrap(),
            "ping".parse().unwrap(),
            vec![],
            json!({}),
        );
        let tx = builder().build(vec![template], 1).unwrap();
        assert_eq!(tx.actions[0].authorization, vec![level("alice@active")]);
    }

    #[test]
    fn strip_removes_only_leading_sponsor() {
        let sponsor = level("eosiactester@freecpu");
        let tx = builder()
            .sponsored_by(sponsor.clone())
            .transfer(&transfer("bob", "1.0000 EOS", 1))
            .unwrap();
        let stripped = strip_sponsor_authorization(&tx, &sponsor);
        assert_eq!(stripped.actions[0].authorization, vec![level("alice@active")]);

        let again = strip_sponsor_authorization(&stripped, &sponsor);
        assert_eq!(again, stripped);
    }
}
