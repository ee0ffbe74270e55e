//! Property-Based Tests for Cache Module
//!
//! Uses proptest to check the bounded store and expiring cache against simple models.

use proptest::prelude::*;
use serde_json::Value;

use crate::cache::{BoundedStore, CacheOptions, ExpiringCache, MemoryBackend, Storage};

// == Strategies ==
/// Generates cache keys from a small alphabet so collisions are common
fn key_strategy() -> impl Strategy<Value = String> {
    "[a-f]{1,2}".prop_map(|s| s)
}

fn value_strategy() -> impl Strategy<Value = String> {
    "[a-zA-Z0-9 ]{0,32}".prop_map(|s| s)
}

/// Generates arbitrary JSON values a cache caller might store
fn json_strategy() -> impl Strategy<Value = Value> {
    let leaf = prop_oneof![
        Just(Value::Null),
        any::<bool>().prop_map(Value::from),
        any::<i64>().prop_map(Value::from),
        value_strategy().prop_map(Value::from),
    ];
    leaf.prop_recursive(3, 16, 4, |inner| {
        prop_oneof![
            prop::collection::vec(inner.clone(), 0..4).prop_map(Value::from),
            prop::collection::btree_map("[a-z]{1,4}", inner, 0..4)
                .prop_map(|map| Value::Object(map.into_iter().collect())),
        ]
    })
}

#[derive(Debug, Clone)]
enum StoreOp {
    Set { key: String, value: String },
    Remove { key: String },
}

fn store_op_strategy() -> impl Strategy<Value = StoreOp> {
    prop_oneof![
        3 => (key_strategy(), value_strategy()).prop_map(|(key, value)| StoreOp::Set { key, value }),
        1 => key_strategy().prop_map(|key| StoreOp::Remove { key }),
    ]
}

fn runtime() -> tokio::runtime::Runtime {
    tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .unwrap()
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(100))]

    // The store never holds more than `capacity` log entries, and what it holds
    // is exactly the tail of the append log.
    #[test]
    fn prop_capacity_keeps_last_appended(
        capacity in 0usize..8,
        keys in prop::collection::vec(key_strategy(), 1..40)
    ) {
        let mut store = BoundedStore::new(Some(capacity));

        for (i, key) in keys.iter().enumerate() {
            store.set(key.clone(), i.to_string());
            prop_assert!(store.len() <= capacity);
        }

        let expected: Vec<String> = keys[keys.len().saturating_sub(capacity)..].to_vec();
        prop_assert_eq!(store.keys(), expected);
    }

    // The store matches a plain insertion-log model under mixed operations.
    #[test]
    fn prop_store_matches_log_model(
        capacity in prop::option::of(0usize..6),
        ops in prop::collection::vec(store_op_strategy(), 1..60)
    ) {
        let mut store = BoundedStore::new(capacity);
        let mut log: Vec<String> = Vec::new();

        for op in ops {
            match op {
                StoreOp::Set { key, value } => {
                    store.set(key.clone(), value);
                    log.push(key);
                    if let Some(capacity) = capacity {
                        while log.len() > capacity {
                            log.remove(0);
                        }
                    }
                }
                StoreOp::Remove { key } => {
                    store.remove(&key);
                    if let Some(index) = log.iter().position(|k| *k == key) {
                        log.remove(index);
                    }
                }
            }
        }

        prop_assert_eq!(store.keys(), log);
    }

    // After remove(k), get(k) is absent regardless of history.
    #[test]
    fn prop_remove_then_get_absent(
        entries in prop::collection::vec((key_strategy(), value_strategy()), 1..20),
        pick in any::<prop::sample::Index>()
    ) {
        let mut store = BoundedStore::new(None);
        for (key, value) in &entries {
            store.set(key.clone(), value.clone());
        }

        let key = &entries[pick.index(entries.len())].0;
        store.remove(key);

        prop_assert_eq!(store.get(key), None);
    }
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(50))]

    // set then immediate get returns a deep-equal value.
    #[test]
    fn prop_expiring_roundtrip(key in key_strategy(), value in json_strategy()) {
        let rt = runtime();
        let fetched = rt.block_on(async {
            let cache = ExpiringCache::new(CacheOptions {
                max_age: Some(60_000),
                version: Some("1".into()),
                ..Default::default()
            });
            cache.set(&key, &value).await.unwrap();
            cache.get::<Value>(&key).await
        });

        prop_assert_eq!(fetched, Some(value));
    }

    // Keys written in one namespace never show up in another.
    #[test]
    fn prop_namespaces_do_not_leak(
        left_keys in prop::collection::btree_set(key_strategy(), 0..6),
        right_keys in prop::collection::btree_set(key_strategy(), 0..6)
    ) {
        let rt = runtime();
        let (left_seen, right_seen) = rt.block_on(async {
            let storage = Storage::bulk(MemoryBackend::new(None));
            let left = ExpiringCache::new(CacheOptions {
                storage: Some(storage.clone()),
                ns: Some("left".into()),
                ..Default::default()
            });
            let right = ExpiringCache::new(CacheOptions {
                storage: Some(storage),
                ns: Some("right".into()),
                ..Default::default()
            });

            for key in &left_keys {
                left.set(key, &1).await.unwrap();
            }
            for key in &right_keys {
                right.set(key, &2).await.unwrap();
            }

            (left.keys().await.unwrap(), right.keys().await.unwrap())
        });

        prop_assert_eq!(left_seen, left_keys.into_iter().collect::<Vec<_>>());
        prop_assert_eq!(right_seen, right_keys.into_iter().collect::<Vec<_>>());
    }
}
