//! Property-based tests for the payload set operations.

use std::cmp::Ordering;
use std::collections::HashSet;

use aerocache::cache::{add, is_member, remove, resort};
use aerocache::sort::ResultSorter;
use aerocache::{CachedQueryPayload, Document, Selector, SortSpec};
use proptest::prelude::*;
use serde_json::json;

fn scored(id: &str, score: i64) -> Document {
    Document::from_value(json!({"_id": id, "score": score})).unwrap()
}

fn payload_strategy() -> impl Strategy<Value = CachedQueryPayload> {
    prop::collection::btree_map("[a-z]{1,3}", -50i64..50, 0..30).prop_map(|entries| {
        let results = entries.into_iter().map(|(id, score)| scored(&id, score)).collect();
        CachedQueryPayload::new(results)
    })
}

proptest! {
    /// Adding after a negative membership check never duplicates an id.
    #[test]
    fn add_after_membership_check_keeps_ids_unique(
        payload in payload_strategy(),
        id in "[a-z]{1,3}",
        score in -50i64..50,
    ) {
        let document = scored(&id, score);
        let next = if is_member(&payload, &document) {
            payload.clone()
        } else {
            add(payload.clone(), &document)
        };

        let ids: Vec<&str> = next.ids();
        let unique: HashSet<&str> = ids.iter().copied().collect();
        prop_assert_eq!(ids.len(), unique.len());
        prop_assert!(is_member(&next, &document));
    }

    /// Removing twice is the same as removing once.
    #[test]
    fn remove_is_idempotent(payload in payload_strategy(), id in "[a-z]{1,3}") {
        let document = scored(&id, 0);
        let once = remove(payload, &document);
        let twice = remove(once.clone(), &document);
        prop_assert_eq!(once, twice);
    }

    /// Removing what was just added restores ids, order and count.
    #[test]
    fn add_then_remove_round_trips(
        payload in payload_strategy(),
        id in "[a-z]{1,3}",
        score in -50i64..50,
    ) {
        let document = scored(&id, score);
        prop_assume!(!is_member(&payload, &document));

        let restored = remove(add(payload.clone(), &document), &document);
        prop_assert_eq!(restored.ids(), payload.ids());
        prop_assert_eq!(restored.total_count, payload.total_count);
    }

    /// After a re-sort no adjacent pair is strictly out of order.
    #[test]
    fn resort_orders_adjacent_pairs(payload in payload_strategy(), descending in any::<bool>()) {
        let spec = if descending {
            SortSpec::desc("score").then_asc("_id")
        } else {
            SortSpec::asc("score")
        };
        let count = payload.total_count;

        let sorted = resort(payload, &Selector::All, &spec);
        for pair in sorted.results.windows(2) {
            let ordering = ResultSorter::compare(&pair[0], &pair[1], &spec).unwrap();
            prop_assert_ne!(ordering, Ordering::Greater);
        }
        prop_assert_eq!(sorted.total_count, count);
    }

    /// Removal never lets the count underflow or go up.
    #[test]
    fn remove_never_increases_count(payload in payload_strategy(), id in "[a-z]{1,3}") {
        let before = payload.total_count;
        let after = remove(payload, &scored(&id, 0)).total_count;
        prop_assert!(after <= before);
        prop_assert!(before - after <= 1);
    }
}
