use proptest::prelude::*;
use serde_json::{Map, Value};

use freecpu_codec::{decode, encode};
use freecpu_types::{
    Action, HeaderHints, Name, PermissionLevel, Timestamp, TransactionHeader, UnsignedTransaction,
};

fn level(actor: &str, permission: &str) -> PermissionLevel {
    PermissionLevel::new(Name::new(actor).unwrap(), Name::new(permission).unwrap())
}

fn action_with(fields: &[(String, String)]) -> Action {
    let mut data = Map::new();
    for (k, v) in fields {
        data.insert(k.clone(), Value::String(v.clone()));
    }
    Action::new(
        Name::new("eosio.token").unwrap(),
        Name::new("transfer").unwrap(),
        vec![level("alice", "active")],
        Value::Object(data),
    )
}

fn header(expiration: u32, ref_block_num: u16, ref_block_prefix: u32) -> TransactionHeader {
    TransactionHeader {
        expiration: Timestamp::new(expiration),
        ref_block_num,
        ref_block_prefix,
    }
}

proptest! {
    /// Encoding the same transaction twice yields identical bytes, and building
    /// the payload in a different key order does not change them.
    #[test]
    fn encoding_is_deterministic(
        fields in prop::collection::btree_map("[a-z]{1,8}", "[ -~]{0,16}", 0..6),
        expiration in any::<u32>(),
        ref_block_num in any::<u16>(),
        ref_block_prefix in any::<u32>(),
    ) {
        let forward: Vec<(String, String)> = fields.into_iter().collect();
        let mut backward = forward.clone();
        backward.reverse();

        let h = header(expiration, ref_block_num, ref_block_prefix);
        let a = UnsignedTransaction::new(vec![action_with(&forward)], HeaderHints::default());
        let b = UnsignedTransaction::new(vec![action_with(&backward)], HeaderHints::default());

        let first = encode(&a, &h).unwrap();
        prop_assert_eq!(&first, &encode(&a, &h).unwrap());
        prop_assert_eq!(&first, &encode(&b, &h).unwrap());
    }

    /// Any single-byte corruption is either rejected or decodes to a different
    /// transaction; it never silently decodes to the original.
    #[test]
    fn corruption_is_never_invisible(index in 0usize..64, flip in 1u8..=255) {
        let tx = UnsignedTransaction::new(
            vec![action_with(&[("memo".into(), "Test Txn 0".into())])],
            HeaderHints::default(),
        );
        let h = header(1_000, 7, 42);
        let original = encode(&tx, &h).unwrap();
        let mut bytes = original.as_bytes().to_vec();
        let i = index % bytes.len();
        bytes[i] ^= flip;

        let corrupted = freecpu_types::CanonicalEncoding::new(bytes);
        if let Ok(decoded) = decode(&corrupted) {
            prop_assert!(decoded.actions != tx.actions || decoded.header != h);
        }
    }
}
