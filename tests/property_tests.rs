//! Differential checks against `BTreeMap`.

use std::collections::BTreeMap;

use proptest::prelude::*;

use artree::{AdaptiveRadixTree, ArtError, TreeStatsTrait};

/// Terminated keys over a small alphabet, so paths share long prefixes but no key is a
/// prefix of another.
fn arb_terminated_key() -> impl Strategy<Value = Vec<u8>> {
    prop::collection::vec(1u8..5, 0..24).prop_map(|mut key| {
        key.push(0);
        key
    })
}

#[derive(Debug, Clone)]
enum Op {
    Insert(Vec<u8>, u32),
    Remove(Vec<u8>),
}

fn arb_ops() -> impl Strategy<Value = Vec<Op>> {
    let op = prop_oneof![
        3 => (arb_terminated_key(), any::<u32>()).prop_map(|(k, v)| Op::Insert(k, v)),
        1 => arb_terminated_key().prop_map(Op::Remove),
    ];
    prop::collection::vec(op, 0..200)
}

fn conflicts(model: &BTreeMap<Vec<u8>, u32>, key: &[u8]) -> bool {
    model.keys().any(|existing| {
        existing.as_slice() != key && (existing.starts_with(key) || key.starts_with(existing))
    })
}

fn assert_matches(tree: &AdaptiveRadixTree<u32>, model: &BTreeMap<Vec<u8>, u32>) {
    assert_eq!(tree.len(), model.len());
    assert_eq!(tree.is_empty(), model.is_empty());
    let entries: Vec<(Vec<u8>, u32)> = tree.iter().map(|(k, v)| (k.to_vec(), *v)).collect();
    let expected: Vec<(Vec<u8>, u32)> = model.iter().map(|(k, v)| (k.clone(), *v)).collect();
    assert_eq!(entries, expected);

    let stats = tree.get_tree_stats();
    assert_eq!(stats.num_leaves, model.len());
}

proptest! {
    #[test]
    fn prop_insert_remove_matches_btreemap(ops in arb_ops()) {
        let mut tree = AdaptiveRadixTree::<u32>::new();
        let mut model = BTreeMap::new();

        for op in ops {
            match op {
                Op::Insert(key, value) => {
                    let result = tree.insert_k(&key, value);
                    prop_assert_eq!(result, Ok(model.insert(key, value)));
                }
                Op::Remove(key) => {
                    let expected = model
                        .remove(&key)
                        .ok_or_else(|| ArtError::KeyNotFound { key: key.clone() });
                    prop_assert_eq!(tree.remove_k(&key), expected);
                }
            }
        }

        assert_matches(&tree, &model);
        for (key, value) in &model {
            prop_assert_eq!(tree.get_k(key), Some(value));
        }
    }

    #[test]
    fn prop_insertion_order_does_not_matter(keys in prop::collection::btree_set(arb_terminated_key(), 0..100)) {
        let keys: Vec<Vec<u8>> = keys.into_iter().collect();

        let mut forward = AdaptiveRadixTree::<usize>::new();
        for (i, key) in keys.iter().enumerate() {
            forward.insert_k(key, i).unwrap();
        }
        let mut backward = AdaptiveRadixTree::<usize>::new();
        for (i, key) in keys.iter().enumerate().rev() {
            backward.insert_k(key, i).unwrap();
        }

        let sorted: Vec<&[u8]> = keys.iter().map(Vec::as_slice).collect();
        prop_assert_eq!(forward.keys().collect::<Vec<_>>(), sorted.clone());
        prop_assert_eq!(backward.keys().collect::<Vec<_>>(), sorted);
        prop_assert!(forward.iter().eq(backward.iter()));
    }

    #[test]
    fn prop_prefix_conflicts_leave_tree_untouched(
        keys in prop::collection::vec(prop::collection::vec(0u8..3, 0..6), 0..60)
    ) {
        let mut tree = AdaptiveRadixTree::<u32>::new();
        let mut model = BTreeMap::new();

        for (i, key) in keys.into_iter().enumerate() {
            let value = i as u32;
            let result = tree.insert_k(&key, value);
            if key.is_empty() {
                prop_assert_eq!(result, Err(ArtError::EmptyKey));
            } else if conflicts(&model, &key) {
                prop_assert_eq!(result, Err(ArtError::PrefixConflict { key: key.clone() }));
            } else {
                prop_assert_eq!(result, Ok(model.insert(key, value)));
            }
        }

        assert_matches(&tree, &model);
    }

    #[test]
    fn prop_removing_everything_empties_the_tree(keys in prop::collection::btree_set(arb_terminated_key(), 1..100)) {
        let mut tree = AdaptiveRadixTree::<usize>::new();
        for (i, key) in keys.iter().enumerate() {
            tree.insert_k(key, i).unwrap();
        }
        for (i, key) in keys.iter().enumerate() {
            prop_assert_eq!(tree.remove_k(key), Ok(i));
            prop_assert!(!tree.contains_key_k(key));
        }
        prop_assert!(tree.is_empty());
        prop_assert_eq!(tree.to_string(), "<>");
    }
}
