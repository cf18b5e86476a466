//! Property-based invariants for building keys and the canonical order.
//!
//! 1. A key never contains the address separator.
//! 2. Appending an address suffix never changes the key.
//! 3. Every canonical entry resolves to itself.

use postaid_core::{CanonicalOrder, building_key};
use proptest::prelude::*;

fn name_strategy() -> impl Strategy<Value = String> {
    "[가-힣A-Za-z0-9]{1,8}"
}

proptest! {
    #[test]
    fn key_has_no_separator(name in "[가-힣A-Za-z0-9 ()]{0,16}") {
        prop_assert!(!building_key(&name).contains(" ("));
    }

    #[test]
    fn suffix_does_not_change_key(name in name_strategy(), addr in "[가-힣0-9 ]{0,10}") {
        let full = format!("{name} ({addr})");
        prop_assert_eq!(building_key(&full), building_key(&name));
    }

    #[test]
    fn entries_resolve_to_themselves(names in prop::collection::vec(name_strategy(), 0..8)) {
        let order = CanonicalOrder::new(names);
        for entry in order.iter() {
            prop_assert_eq!(order.resolve(entry), Some(entry));
        }
    }
}
