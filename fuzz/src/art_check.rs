#![no_main]

use std::collections::BTreeMap;

use arbitrary::Arbitrary;
use libfuzzer_sys::fuzz_target;

use artree::{AdaptiveRadixTree, ArtError};

#[derive(Arbitrary, Debug)]
enum MapMethod {
    Get { key: Vec<u8> },
    Insert { key: Vec<u8>, val: usize },
    Update { key: Vec<u8>, val: usize },
    Delete { key: Vec<u8> },
}

/// Whether `key` is a strict prefix of a stored key, or a stored key is a strict prefix of it.
fn conflicts(map: &BTreeMap<Vec<u8>, usize>, key: &[u8]) -> bool {
    let prefixed_by_stored = (1..key.len()).any(|n| map.contains_key(&key[..n]));
    let prefixes_stored = map
        .range(key.to_vec()..)
        .next()
        .is_some_and(|(k, _)| k.len() > key.len() && k.starts_with(key));
    prefixed_by_stored || prefixes_stored
}

fuzz_target!(|methods: Vec<MapMethod>| {
    let mut art = AdaptiveRadixTree::<usize>::new();
    let mut bt_map = BTreeMap::<Vec<u8>, usize>::new();

    for m in &methods {
        match m {
            MapMethod::Get { key } => {
                assert_eq!(art.get_k(key), bt_map.get(key));
            }
            MapMethod::Insert { key, val } => {
                let result = art.insert_k(key, *val);
                if key.is_empty() {
                    assert_eq!(result, Err(ArtError::EmptyKey));
                } else if conflicts(&bt_map, key) {
                    assert_eq!(result, Err(ArtError::PrefixConflict { key: key.clone() }));
                } else {
                    assert_eq!(result, Ok(bt_map.insert(key.clone(), *val)));
                }
            }
            MapMethod::Update { key, val } => {
                let old_bt = bt_map.get_mut(key);
                let old_art = art.get_mut_k(key);
                assert_eq!(old_art, old_bt);
                if let (Some(old_bt), Some(old_art)) = (old_bt, old_art) {
                    *old_bt = *val;
                    *old_art = *val;
                }
                assert_eq!(art.get_k(key), bt_map.get(key));
            }
            MapMethod::Delete { key } => {
                let btr = bt_map.remove(key);
                let artr = art.remove_k(key).ok();
                assert_eq!(artr, btr);
            }
        }
        assert_eq!(art.len(), bt_map.len());
    }

    let art_entries: Vec<(&[u8], &usize)> = art.iter().collect();
    let bt_entries: Vec<(&[u8], &usize)> = bt_map.iter().map(|(k, v)| (k.as_slice(), v)).collect();
    assert_eq!(art_entries, bt_entries);
});
