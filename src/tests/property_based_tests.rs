//! Property tests for the two structural invariants the build/parse pair
//! must uphold for any valid item set: a full round trip, and canonical
//! (ascending-length) serialization order.
//!
//! The generator is bounded and avoids the documented edge cases on
//! purpose (those get their own literal-vector tests in `ape_tests`)
//! rather than gridding every type exhaustively.

use std::collections::HashMap;

use proptest::collection::vec as pvec;
use proptest::prelude::*;

use crate::ape::{ApeItem, ApeTag};

fn key_strategy() -> impl Strategy<Value = String> {
    "[a-zA-Z]{3,12}"
}

fn value_strategy() -> impl Strategy<Value = String> {
    "[^\\x00]{0,40}"
}

fn item_set_strategy() -> impl Strategy<Value = Vec<(String, String)>> {
    pvec((key_strategy(), value_strategy()), 0..12).prop_map(|pairs| {
        let mut seen = std::collections::HashSet::new();
        pairs
            .into_iter()
            .filter(|(k, _)| seen.insert(k.to_ascii_lowercase()))
            .collect()
    })
}

fn build_tag(pairs: &[(String, String)]) -> ApeTag {
    let mut tag = ApeTag::new();
    for (key, value) in pairs {
        tag.insert(ApeItem::new_text(key, vec![value.clone()]).unwrap());
    }
    tag
}

proptest! {
    #[test]
    fn round_trip_preserves_every_item(pairs in item_set_strategy()) {
        let tag = build_tag(&pairs);
        let bytes = tag.build();
        prop_assume!(bytes.is_ok());
        let parsed = ApeTag::parse(&bytes.unwrap()).unwrap();

        prop_assert_eq!(parsed.len(), tag.len());
        let expected: HashMap<String, String> = pairs
            .into_iter()
            .map(|(k, v)| (k.to_ascii_lowercase(), v))
            .collect();
        for (lower, value) in &expected {
            let item = parsed.get(lower).expect("item should survive the round trip");
            prop_assert_eq!(item.as_single_text(), Some(value.as_str()));
        }
    }

    #[test]
    fn build_output_is_sorted_by_ascending_item_length(pairs in item_set_strategy()) {
        let tag = build_tag(&pairs);
        let bytes = tag.build();
        prop_assume!(bytes.is_ok());
        let bytes = bytes.unwrap();

        let mut offset = 32;
        let mut last_len = 0usize;
        let footer_offset = bytes.len() - 32;
        while offset < footer_offset {
            let value_size = crate::util::read_u32_le(&bytes, offset) as usize;
            let key_start = offset + 8;
            let nul = crate::util::find_nul(&bytes, key_start).unwrap();
            let item_len = 8 + (nul - key_start) + 1 + value_size;
            prop_assert!(item_len >= last_len);
            last_len = item_len;
            offset += item_len;
        }
    }
}
