//! Cross-module tests for probeset-core

use crate::{Frame, HashTable, Slot};
use std::collections::HashSet;

/// Check bookkeeping against the slot array itself
fn assert_consistent(ht: &HashTable) {
    let occupied = ht.slots().iter().filter(|s| s.is_occupied()).count();
    let tombstones = ht
        .slots()
        .iter()
        .filter(|s| **s == Slot::Tombstone)
        .count();

    assert_eq!(ht.len(), occupied, "occupied count drifted");
    assert_eq!(ht.tombstones(), tombstones, "tombstone count drifted");
    assert!(occupied + tombstones <= ht.capacity());

    let unique: HashSet<i64> = ht.keys().collect();
    assert_eq!(unique.len(), occupied, "duplicate live key");
}

/// Every trace starts searching at the hash index and ends on a terminal frame
fn assert_frame_contract(frames: &[Frame], start: usize) {
    assert!(!frames.is_empty());
    assert_eq!(frames[0], Frame::searching(start));
    assert!(frames.last().unwrap().is_terminal());
}

#[cfg(test)]
mod integration_tests {
    use super::{assert_consistent, assert_frame_contract};
    use crate::{
        hash_index, is_prime, FrameKind, HashTable, InsertOutcome, Message, ProbeSetError,
        ProbeStrategy, Rehash, TableConfig, Trace,
    };
    use rand::{Rng, SeedableRng};
    use rand_chacha::ChaCha8Rng;
    use std::collections::HashSet;

    #[test]
    fn test_seeded_workload_matches_model() {
        for strategy in ProbeStrategy::ALL {
            let mut rng = ChaCha8Rng::seed_from_u64(0x5eed + strategy.tag() as u64);
            let mut ht = HashTable::new();
            let mut model = HashSet::new();

            for _ in 0..2_000 {
                let key: i64 = rng.gen_range(-40..40);
                let start = hash_index(key, ht.capacity());
                let roll: f64 = rng.gen();

                if roll < 0.6 {
                    let frames = ht.insert(key, strategy).unwrap();
                    assert_frame_contract(&frames, start);
                    if model.insert(key) {
                        let placed = frames[frames.len() - 2];
                        assert_eq!(placed.message, Message::Adding);
                        assert_eq!(frames.last().unwrap().kind, FrameKind::Found);
                    } else {
                        assert_eq!(frames.last().unwrap().message, Message::AlreadyPresent);
                    }
                } else if roll < 0.85 {
                    let frames = ht.delete(key, strategy);
                    assert_frame_contract(&frames, start);
                    let expected = if model.remove(&key) {
                        Message::Deleting
                    } else {
                        Message::NotFound
                    };
                    assert_eq!(frames.last().unwrap().message, expected);
                } else {
                    let frames = ht.search(key, strategy);
                    assert_frame_contract(&frames, start);
                    let found = frames.last().unwrap().kind == FrameKind::Found;
                    assert_eq!(found, model.contains(&key));
                }

                assert_consistent(&ht);
                assert_eq!(ht.len(), model.len());
            }

            for key in &model {
                assert!(ht.contains(*key, strategy), "{} lost under {}", key, strategy);
            }
        }
    }

    #[test]
    fn test_tombstone_skip_without_resize() {
        let mut ht = HashTable::with_capacity(13);
        ht.insert(2, ProbeStrategy::Linear).unwrap();
        ht.insert(15, ProbeStrategy::Linear).unwrap();
        ht.delete(2, ProbeStrategy::Linear);

        assert_eq!(ht.capacity(), 13);
        let frames = ht.search(15, ProbeStrategy::Linear);
        assert_eq!(frames.last().unwrap().kind, FrameKind::Found);
        assert_eq!(frames.last().unwrap().index, 3);
    }

    #[test]
    fn test_growth_keeps_every_key_reachable() {
        for strategy in ProbeStrategy::ALL {
            let mut ht = HashTable::new();
            let mut inserted = Vec::new();

            for key in (0..60).map(|k| k * 7 + 3) {
                let before = ht.capacity();
                let mut trace = Trace::new();
                let outcome = ht.insert_traced(key, strategy, &mut trace).unwrap();
                inserted.push(key);

                if let InsertOutcome::Added {
                    rehash: Rehash::Grown { from, to },
                    ..
                } = outcome
                {
                    assert_eq!(from, before);
                    assert_eq!(to, ht.capacity());
                    assert!(is_prime(to));
                    assert!(to > 2 * from);
                    assert_eq!(ht.tombstones(), 0);
                    for k in &inserted {
                        assert!(ht.contains(*k, strategy));
                    }
                }
            }
            assert!(ht.load_factor() <= 0.5);
        }
    }

    #[test]
    fn test_tables_with_different_tuning_coexist() {
        let eager = HashTable::with_config(TableConfig {
            load_factor_threshold: 0.25,
            ..TableConfig::default()
        });
        let mut eager = eager.unwrap();
        let mut relaxed = HashTable::with_config(TableConfig {
            load_factor_threshold: 0.75,
            ..TableConfig::default()
        })
        .unwrap();

        for key in 0..2 {
            eager.insert(key, ProbeStrategy::Linear).unwrap();
            relaxed.insert(key, ProbeStrategy::Linear).unwrap();
        }

        assert_eq!(eager.capacity(), 17);
        assert_eq!(relaxed.capacity(), 7);
    }

    #[test]
    fn test_small_probe_bound_is_detectable() {
        let mut ht = HashTable::with_config(TableConfig {
            max_probes: 1,
            ..TableConfig::default()
        })
        .unwrap();

        ht.insert(0, ProbeStrategy::Linear).unwrap();
        ht.insert(7, ProbeStrategy::Linear).unwrap();
        let before = ht.clone();

        // 0 and 1 taken, one attempt allowed
        let result = ht.insert(14, ProbeStrategy::Linear);
        assert!(result.is_err());
        assert_eq!(ht, before);
    }

    #[test]
    fn test_failed_growth_restores_table() {
        let mut ht = HashTable::with_config(TableConfig {
            max_probes: 1,
            ..TableConfig::default()
        })
        .unwrap();
        for key in [0, 17, 34] {
            ht.insert(key, ProbeStrategy::Linear).unwrap();
        }
        let before = ht.clone();

        // 51 lands at 2 and forces growth to 17, where reinserting 17
        // collides with 0 and 51 under a one-attempt bound
        match ht.insert(51, ProbeStrategy::Linear) {
            Err(ProbeSetError::ProbeExhausted { key, attempts, .. }) => {
                assert_eq!(key, 51);
                assert_eq!(attempts, 1);
            }
            other => panic!("expected ProbeExhausted, got {:?}", other),
        }
        assert_eq!(ht, before);
        assert_eq!(ht.capacity(), 7);
        assert!(!ht.contains(51, ProbeStrategy::Linear));
        assert_consistent(&ht);
    }
}

#[cfg(test)]
mod property_tests {
    use super::assert_consistent;
    use crate::{is_prime, FrameKind, HashTable, ProbeStrategy};
    use proptest::prelude::*;

    fn any_probe_strategy() -> impl Strategy<Value = ProbeStrategy> {
        prop::sample::select(ProbeStrategy::ALL.to_vec())
    }

    proptest! {
        #[test]
        fn proptest_strategy_is_pure(
            strategy in any_probe_strategy(),
            start in 0usize..10_000,
            attempt in 0usize..1_000,
            capacity in 1usize..10_000,
        ) {
            let first = strategy.index_for(start, attempt, capacity);
            let second = strategy.index_for(start, attempt, capacity);
            prop_assert_eq!(first, second);
            prop_assert!(first < capacity);
        }

        #[test]
        fn proptest_insert_delete_search(
            strategy in any_probe_strategy(),
            keys in prop::collection::vec(-500i64..500, 0..60),
            probe in -500i64..500,
        ) {
            let mut ht = HashTable::new();
            for key in &keys {
                ht.insert(*key, strategy).unwrap();
            }

            let len_before = ht.len();
            let second = ht.insert(probe, strategy).unwrap();
            let len_after = ht.len();
            let again = ht.insert(probe, strategy).unwrap();
            prop_assert_eq!(ht.len(), len_after);
            prop_assert!(len_after == len_before || len_after == len_before + 1);
            prop_assert_eq!(second.last().unwrap().kind, FrameKind::Found);
            prop_assert_eq!(again.last().unwrap().kind, FrameKind::Found);

            let deleted = ht.delete(probe, strategy);
            prop_assert_eq!(deleted.last().unwrap().kind, FrameKind::Found);

            let frames = ht.search(probe, strategy);
            prop_assert_eq!(frames.last().unwrap().kind, FrameKind::NotFound);
            assert_consistent(&ht);
        }

        #[test]
        fn proptest_capacity_stays_prime(
            strategy in any_probe_strategy(),
            keys in prop::collection::vec(any::<i64>(), 0..80),
        ) {
            let mut ht = HashTable::new();
            for key in keys {
                let before = ht.capacity();
                ht.insert(key, strategy).unwrap();
                if ht.capacity() != before {
                    prop_assert!(is_prime(ht.capacity()));
                    prop_assert!(ht.capacity() > 2 * before);
                    prop_assert_eq!(ht.tombstones(), 0);
                }
            }
            assert_consistent(&ht);
        }
    }
}
