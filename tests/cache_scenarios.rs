//! End-to-end cache scenarios through the public library API.

use std::time::Duration;

use volatile_store::cache::{FileBackend, MemoryBackend, SWEEP_DELAY};
use volatile_store::{CacheOptions, ExpiringCache, Storage};

async fn after_sweep() {
    tokio::time::sleep(SWEEP_DELAY * 3).await;
}

#[tokio::test]
async fn test_oldest_key_evicted_after_debounce() {
    let cache = ExpiringCache::new(CacheOptions {
        capacity: Some(2),
        max_age: Some(1000),
        ..Default::default()
    });

    cache.set("a", &1).await.unwrap();
    cache.set("b", &2).await.unwrap();
    cache.set("c", &3).await.unwrap();

    // Nothing is evicted before the debounce delay elapses
    assert_eq!(cache.keys().await.unwrap(), vec!["a", "b", "c"]);

    after_sweep().await;

    assert_eq!(cache.keys().await.unwrap(), vec!["b", "c"]);
    assert_eq!(cache.get::<i32>("a").await, None);
    assert_eq!(cache.get::<i32>("c").await, Some(3));
}

#[tokio::test]
async fn test_entry_expires_and_disappears_from_keys() {
    let cache = ExpiringCache::new(CacheOptions {
        max_age: Some(10),
        ..Default::default()
    });

    cache.set("x", "y").await.unwrap();
    tokio::time::sleep(Duration::from_millis(20)).await;

    assert_eq!(cache.get::<String>("x").await, None);

    tokio::time::sleep(Duration::from_millis(5)).await;
    assert!(cache.keys().await.unwrap().is_empty());
}

#[tokio::test]
async fn test_new_version_ignores_old_entries() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("cache.json");

    {
        let v1 = ExpiringCache::new(CacheOptions {
            storage: Some(Storage::indexed(FileBackend::open(&path).await.unwrap())),
            ns: Some("tmpl".into()),
            version: Some("1".into()),
            ..Default::default()
        });
        v1.set("card", "<div>v1</div>").await.unwrap();
        v1.shutdown();
    }

    let v2 = ExpiringCache::new(CacheOptions {
        storage: Some(Storage::indexed(FileBackend::open(&path).await.unwrap())),
        ns: Some("tmpl".into()),
        version: Some("2".into()),
        ..Default::default()
    });

    assert_eq!(v2.get::<String>("card").await, None);

    after_sweep().await;
    assert!(v2.keys().await.unwrap().is_empty());

    let raw = tokio::fs::read_to_string(&path).await.unwrap();
    assert_eq!(raw, "{}");
}

#[tokio::test]
async fn test_repeated_set_consumes_backend_slots() {
    let storage = Storage::bulk(MemoryBackend::new(Some(2)));
    let cache = ExpiringCache::new(CacheOptions {
        storage: Some(storage.clone()),
        ..Default::default()
    });

    cache.set("a", &1).await.unwrap();
    cache.set("a", &2).await.unwrap();

    // Each set appends to the backend log, so "a" is listed twice
    assert_eq!(storage.keys().await.unwrap(), vec!["a", "a"]);
    assert_eq!(cache.get::<i32>("a").await, Some(2));

    // The third append evicts the first "a" log entry and, with it, the value
    cache.set("b", &3).await.unwrap();
    assert_eq!(storage.keys().await.unwrap(), vec!["a", "b"]);
    assert_eq!(cache.get::<i32>("a").await, None);
    assert_eq!(cache.get::<i32>("b").await, Some(3));
}

#[tokio::test]
async fn test_dropping_cache_cancels_pending_sweep() {
    let storage = Storage::bulk(MemoryBackend::new(None));

    {
        let cache = ExpiringCache::new(CacheOptions {
            storage: Some(storage.clone()),
            capacity: Some(1),
            ..Default::default()
        });
        cache.set("a", &1).await.unwrap();
        cache.set("b", &2).await.unwrap();
    }

    after_sweep().await;

    // The sweep that would have evicted "a" never ran
    assert_eq!(storage.keys().await.unwrap(), vec!["a", "b"]);
}
