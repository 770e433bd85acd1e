//! Property-based tests for the collections using proptest.

use std::collections::HashSet;
use std::sync::Arc;

use proptest::prelude::*;
use quiver::{filter, CollectionError, Keyed, Record, Sequence};

// ============================================================================
// Test helpers
// ============================================================================

#[derive(Debug, Clone, PartialEq, Record)]
struct Entry {
    #[record(String)]
    code: String,
    #[record(Number)]
    serial: u32,
    #[record(Number)]
    score: i64,
}

/// Entries whose codes and serials are all distinct, and never collide
/// with each other (codes are alphabetic, serials numeric).
fn distinct_entries(max: usize) -> impl Strategy<Value = Vec<Entry>> {
    (
        prop::collection::hash_set("[A-Z]{2,4}", 0..max),
        prop::collection::vec(any::<i64>(), max),
    )
        .prop_map(|(codes, scores)| {
            codes
                .into_iter()
                .zip(scores)
                .enumerate()
                .map(|(i, (code, score))| Entry {
                    code,
                    serial: i as u32,
                    score,
                })
                .collect()
        })
}

fn keyed(entries: &[Entry]) -> Keyed<Entry> {
    let mut c = Keyed::new([Entry::CODE, Entry::SERIAL]);
    c.extend(entries.iter().cloned()).unwrap();
    c
}

fn identities<'a>(items: impl IntoIterator<Item = &'a Arc<Entry>>) -> HashSet<*const Entry> {
    items.into_iter().map(Arc::as_ptr).collect()
}

// ============================================================================
// Keyed collection properties
// ============================================================================

proptest! {
    /// Without collisions every add lands, in order.
    #[test]
    fn len_and_order_follow_adds(entries in distinct_entries(40)) {
        let c = keyed(&entries);
        prop_assert_eq!(c.len(), entries.len());
        let codes: Vec<&str> = c.iter().map(|e| e.code.as_str()).collect();
        let expected: Vec<&str> = entries.iter().map(|e| e.code.as_str()).collect();
        prop_assert_eq!(codes, expected);
    }

    /// Every key of every item resolves to that very item.
    #[test]
    fn every_key_resolves_to_its_item(entries in distinct_entries(40)) {
        let c = keyed(&entries);
        for item in c.iter() {
            prop_assert!(Arc::ptr_eq(c.index(item.code.as_str()).unwrap(), item));
            prop_assert!(Arc::ptr_eq(c.index(item.serial).unwrap(), item));
        }
    }

    /// A duplicate on either key is rejected and changes nothing.
    #[test]
    fn duplicate_leaves_membership_unchanged(
        entries in distinct_entries(30),
        pick in any::<prop::sample::Index>(),
        by_code in any::<bool>(),
    ) {
        prop_assume!(!entries.is_empty());
        let mut c = keyed(&entries);
        let victim = &entries[pick.index(entries.len())];
        let clash = if by_code {
            Entry { code: victim.code.clone(), serial: 1_000_000, score: 0 }
        } else {
            Entry { code: "clash".to_string(), serial: victim.serial, score: 0 }
        };

        let before = identities(c.iter());
        let err = c.add(clash).unwrap_err();
        let is_duplicate = matches!(err, CollectionError::DuplicateKey { .. });
        prop_assert!(is_duplicate);
        prop_assert_eq!(identities(c.iter()), before);
        prop_assert!(!c.contains_key(1_000_000u32));
        prop_assert!(!c.contains_key("clash"));
    }

    /// Missing keys miss both ways.
    #[test]
    fn missing_keys_miss(entries in distinct_entries(30), absent in "[a-z]{1,6}") {
        let c = keyed(&entries);
        prop_assert!(c.get(absent.as_str()).is_none());
        let missing = matches!(
            c.index(absent.as_str()),
            Err(CollectionError::NonExistentKey { .. })
        );
        prop_assert!(missing);
    }

    /// Removing by one key frees the other.
    #[test]
    fn remove_by_one_key_frees_all(
        entries in distinct_entries(30),
        pick in any::<prop::sample::Index>(),
    ) {
        prop_assume!(!entries.is_empty());
        let mut c = keyed(&entries);
        let victim = &entries[pick.index(entries.len())];

        c.remove(victim.code.as_str()).unwrap();
        prop_assert!(c.get(victim.serial).is_none());
        prop_assert!(c.get(victim.code.as_str()).is_none());
        prop_assert_eq!(c.len(), entries.len() - 1);
    }
}

// ============================================================================
// Filtering and set properties
// ============================================================================

proptest! {
    /// Filtering keeps relative order and is idempotent.
    #[test]
    fn filter_preserves_order_and_is_idempotent(
        entries in distinct_entries(40),
        threshold in any::<i64>(),
    ) {
        let seq: Sequence<Entry> = entries.iter().cloned().collect();
        let f = filter!(score__gte = threshold);

        let once = seq.filter(&f).unwrap();
        let expected: Vec<i64> = entries.iter().map(|e| e.score).filter(|s| *s >= threshold).collect();
        let got: Vec<i64> = once.iter().map(|e| e.score).collect();
        prop_assert_eq!(got, expected);

        let twice = once.filter(&f).unwrap();
        prop_assert_eq!(identities(twice.iter()), identities(once.iter()));
        prop_assert_eq!(twice.len(), once.len());
    }

    /// Union is commutative on membership and idempotent.
    #[test]
    fn union_commutative_and_idempotent(
        entries in distinct_entries(40),
        a in any::<i64>(),
        b in any::<i64>(),
    ) {
        let c = keyed(&entries);
        let left = c.filter_by("score__lt", a).unwrap();
        let right = c.filter_by("score__gt", b).unwrap();

        let lr = (&left | &right).unwrap();
        let rl = (&right | &left).unwrap();
        prop_assert_eq!(identities(lr.iter()), identities(rl.iter()));

        let ll = (&left | &left).unwrap();
        prop_assert_eq!(ll.len(), left.len());

        let seq = c.as_sequence();
        prop_assert_eq!((seq | seq).len(), seq.len());
    }

    /// Intersection holds exactly the items both sides hold.
    #[test]
    fn intersection_is_common_membership(
        entries in distinct_entries(40),
        a in any::<i64>(),
        b in any::<i64>(),
    ) {
        let c = keyed(&entries);
        let left = c.filter_by("score__lt", a).unwrap();
        let right = c.filter_by("score__gt", b).unwrap();

        let both = &left & &right;
        let expected: HashSet<_> = identities(left.iter())
            .intersection(&identities(right.iter()))
            .copied()
            .collect();
        prop_assert_eq!(identities(both.iter()), expected);
    }
}
