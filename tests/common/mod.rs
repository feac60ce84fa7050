//! Shared fixtures for integration tests

#![allow(dead_code)]

use std::sync::{Arc, Mutex};

use aerocache::{
    CacheConfig, CacheUpdater, CachedQueryPayload, Document, MemoryStore, QueryDescriptor,
    QueryParameters, Refetcher, Selector, SortSpec, Watch, WatchId,
};
use serde_json::{json, Value};

/// Refetcher that only remembers which watches it was asked to refetch
#[derive(Debug, Default)]
pub struct RecordingRefetcher {
    calls: Mutex<Vec<WatchId>>,
}

impl RecordingRefetcher {
    pub fn calls(&self) -> Vec<WatchId> {
        self.calls.lock().unwrap().clone()
    }

    pub fn count_for(&self, id: &WatchId) -> usize {
        self.calls().iter().filter(|call| *call == id).count()
    }
}

impl Refetcher for RecordingRefetcher {
    fn refetch(&self, watch: &Watch) {
        self.calls.lock().unwrap().push(watch.id);
    }
}

pub struct Harness {
    pub store: Arc<MemoryStore>,
    pub refetcher: Arc<RecordingRefetcher>,
    pub updater: CacheUpdater,
}

impl Harness {
    pub fn new() -> Self {
        Self::with_config(CacheConfig::default())
    }

    pub fn with_config(config: CacheConfig) -> Self {
        let store = Arc::new(MemoryStore::new());
        let refetcher = Arc::new(RecordingRefetcher::default());
        let updater = CacheUpdater::new(store.clone(), refetcher.clone(), config);
        Self {
            store,
            refetcher,
            updater,
        }
    }

    /// Registers `multi{type_name}Query` with the given selector and sort
    pub fn watch(
        &self,
        type_name: &str,
        selector: Selector,
        sort: SortSpec,
        payload: CachedQueryPayload,
    ) -> WatchId {
        self.store
            .register(
                QueryDescriptor::new(format!("multi{}Query", type_name), json!({})),
                QueryParameters::new(selector, sort),
                payload,
            )
            .unwrap()
    }

    pub fn payload(&self, id: &WatchId) -> CachedQueryPayload {
        use aerocache::ObjectStore;
        self.store.read_payload(id).unwrap()
    }
}

pub fn doc(value: Value) -> Document {
    Document::from_value(value).unwrap()
}

/// A post with a status and a creation tick
pub fn post(id: &str, status: &str, created_at: i64) -> Document {
    doc(json!({"_id": id, "__typename": "Post", "status": status, "createdAt": created_at}))
}

pub fn open_selector() -> Selector {
    Selector::eq("status", json!("open"))
}
