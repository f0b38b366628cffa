use freecpu_types::{Asset, PermissionLevel};
use freecpu_wallet_core::{strip_sponsor_authorization, TransactionBuilder, TransferRequest};
use proptest::prelude::*;

fn alice() -> PermissionLevel {
    "alice@active".parse().unwrap()
}

fn sponsor() -> PermissionLevel {
    "eosiactester@freecpu".parse().unwrap()
}

fn request(amount: i64, repetitions: usize, memo: String) -> TransferRequest {
    TransferRequest {
        receiver: Some("bob".parse().unwrap()),
        quantity: Some(Asset::new(amount, 4, "EOS").unwrap()),
        memo,
        repetitions,
    }
}

proptest! {
    #[test]
    fn sponsor_is_only_ever_first_authorizer(
        amount in 1i64..1_000_000,
        repetitions in 1usize..8,
        memo in "[a-z ]{0,12}",
    ) {
        let tx = TransactionBuilder::new()
            .sender(alice())
            .sponsored_by(sponsor())
            .transfer(&request(amount, repetitions, memo))
            .unwrap();

        prop_assert_eq!(tx.actions.len(), repetitions);
        prop_assert_eq!(&tx.actions[0].authorization, &vec![sponsor(), alice()]);
        for action in &tx.actions[1..] {
            prop_assert_eq!(&action.authorization, &vec![alice()]);
        }
    }

    #[test]
    fn stripping_leaves_only_sender(
        amount in 1i64..1_000_000,
        repetitions in 1usize..8,
    ) {
        let sponsored = TransactionBuilder::new()
            .sender(alice())
            .sponsored_by(sponsor())
            .transfer(&request(amount, repetitions, String::new()))
            .unwrap();
        let own = TransactionBuilder::new()
            .sender(alice())
            .transfer(&request(amount, repetitions, String::new()))
            .unwrap();

        prop_assert_eq!(strip_sponsor_authorization(&sponsored, &sponsor()), own);
    }

    #[test]
    fn non_positive_amounts_are_rejected(amount in -1_000_000i64..=0) {
        let result = TransactionBuilder::new()
            .sender(alice())
            .transfer(&request(amount, 1, String::new()));
        prop_assert!(result.is_err());
    }
}
