//! Result Cache Integration Tests
//!
//! Bound and eviction, removal, and persistence round-trips through SQLite.

use std::sync::Arc;

use flora_lens::services::{ResultCache, HISTORY_LIMIT};
use flora_lens::storage::Database;
use flora_lens_core::{KeyValueStore, MemoryStore, HISTORY_KEY};

use crate::support::identification;

#[test]
fn test_twenty_first_record_evicts_exactly_the_oldest() {
    let mut cache = ResultCache::load(Arc::new(MemoryStore::new()));
    let mut ids = Vec::new();
    for i in 0..HISTORY_LIMIT {
        ids.push(cache.record(identification(&format!("Plant {}", i)), None).id);
    }
    assert_eq!(cache.len(), 20);

    let newest = cache.record(identification("Plant 20"), None);

    assert_eq!(cache.len(), 20);
    assert_eq!(cache.list()[0], newest);
    assert!(cache.get(ids[0]).is_none(), "oldest record should be evicted");
    assert!(cache.get(ids[1]).is_some());
    assert_eq!(cache.list()[19].id, ids[1]);
}

#[test]
fn test_order_is_strictly_descending_by_insertion() {
    let mut cache = ResultCache::load(Arc::new(MemoryStore::new()));
    for i in 0..5 {
        cache.record(identification(&format!("Plant {}", i)), None);
    }
    let ids: Vec<i64> = cache.list().iter().map(|r| r.id).collect();
    assert!(ids.windows(2).all(|w| w[0] > w[1]));
}

#[test]
fn test_removing_unknown_id_is_noop() {
    let store = Arc::new(MemoryStore::new());
    let mut cache = ResultCache::load(store.clone());
    cache.record(identification("Basil"), None);
    cache.record(identification("Mint"), None);
    let before = cache.list().to_vec();
    let persisted_before = store.get(HISTORY_KEY).unwrap();

    assert!(!cache.remove(-1));

    assert_eq!(cache.list(), before.as_slice());
    assert_eq!(store.get(HISTORY_KEY).unwrap(), persisted_before);
}

#[test]
fn test_round_trip_through_database() {
    let db = Database::new_in_memory().unwrap();
    let store: Arc<dyn KeyValueStore> = Arc::new(db.clone());

    let mut cache = ResultCache::load(store.clone());
    cache.record(identification("Basil"), None);
    cache.record(
        identification("Monstera"),
        Some("data:image/jpeg;base64,/9j/4AAQ".to_string()),
    );
    cache.record(identification("Fern"), None);
    let expected = cache.list().to_vec();

    let reloaded = ResultCache::load(store);
    assert_eq!(reloaded.list(), expected.as_slice());
}

#[test]
fn test_round_trip_through_database_file() {
    let temp_dir = tempfile::tempdir().unwrap();
    let expected = {
        let db = Database::new(temp_dir.path()).unwrap();
        let mut cache = ResultCache::load(Arc::new(db));
        cache.record(identification("Aloe"), None);
        cache.record(identification("Jade"), None);
        cache.list().to_vec()
    };

    let db = Database::new(temp_dir.path()).unwrap();
    let reloaded = ResultCache::load(Arc::new(db));
    assert_eq!(reloaded.list(), expected.as_slice());
}

#[test]
fn test_removal_survives_reload() {
    let store = Arc::new(MemoryStore::new());
    let mut cache = ResultCache::load(store.clone());
    let keep = cache.record(identification("Basil"), None);
    let removed = cache.record(identification("Mint"), None);

    assert!(cache.remove(removed.id));

    let reloaded = ResultCache::load(store);
    assert_eq!(reloaded.len(), 1);
    assert_eq!(reloaded.list()[0], keep);
}
