//! Refetch Pipeline Tests
//!
//! Create outcomes routed through a real `TokioRefetcher`:
//! - The refetched payload replaces the cached one wholesale
//! - Failures and teardown never reach the caller

use std::sync::Arc;
use std::time::Duration;

use aerocache::observability::CacheMetrics;
use aerocache::{
    CacheConfig, CacheError, CacheUpdater, CachedQueryPayload, Document, FetchFuture, MemoryStore,
    ObjectStore, QueryDescriptor, QueryParameters, Selector, SortSpec, TokioRefetcher, WatchId,
};
use futures_util::FutureExt;
use serde_json::json;
use tokio::sync::oneshot;

fn post(id: &str, created_at: i64) -> Document {
    Document::from_value(json!({"_id": id, "status": "open", "createdAt": created_at})).unwrap()
}

fn register_open_posts(store: &MemoryStore) -> WatchId {
    store
        .register(
            QueryDescriptor::new("multiPostQuery", json!({"input": {"terms": {"view": "open"}}})),
            QueryParameters::new(
                Selector::eq("status", json!("open")),
                SortSpec::desc("createdAt"),
            ),
            CachedQueryPayload::new(vec![post("A", 1)]),
        )
        .unwrap()
}

async fn wait_for_generation(store: &MemoryStore, id: &WatchId, generation: u64) {
    for _ in 0..100 {
        if store.generation(id) == Some(generation) {
            return;
        }
        tokio::time::sleep(Duration::from_millis(5)).await;
    }
    panic!("watch {} never reached generation {}", id, generation);
}

// =============================================================================
// Create Path
// =============================================================================

/// A create outcome ends with the server's payload in the store.
#[tokio::test]
async fn test_create_replaces_payload_from_server() {
    let store = Arc::new(MemoryStore::new());
    let id = register_open_posts(&store);
    let metrics = Arc::new(CacheMetrics::new());

    let server = CachedQueryPayload::with_total(vec![post("N", 9), post("A", 1)], 12);
    let served = server.clone();
    let fetcher = move |query: QueryDescriptor| -> FetchFuture {
        assert_eq!(query.operation_name, "multiPostQuery");
        let payload = served.clone();
        async move { Ok::<_, CacheError>(payload) }.boxed()
    };

    let refetcher = TokioRefetcher::new(store.clone(), fetcher)
        .unwrap()
        .with_metrics(metrics.clone());
    let updater = CacheUpdater::new(store.clone(), Arc::new(refetcher), CacheConfig::default())
        .with_metrics(metrics.clone());

    let report = updater.on_create("Post", &post("N", 9)).unwrap();
    assert_eq!(report.refetched, 1);

    wait_for_generation(&store, &id, 1).await;
    assert_eq!(store.read_payload(&id).unwrap(), server);

    let snapshot = metrics.snapshot();
    assert_eq!(snapshot.refetches_issued, 1);
    assert_eq!(snapshot.payloads_written, 1);
}

/// A watch torn down while its refetch is in flight drops the result.
#[tokio::test]
async fn test_teardown_during_refetch_is_harmless() {
    let store = Arc::new(MemoryStore::new());
    let id = register_open_posts(&store);
    let metrics = Arc::new(CacheMetrics::new());

    let (release, gate) = oneshot::channel::<()>();
    let gate = Arc::new(std::sync::Mutex::new(Some(gate)));
    let fetcher = move |_query: QueryDescriptor| -> FetchFuture {
        let gate = gate.lock().unwrap().take();
        async move {
            if let Some(gate) = gate {
                let _ = gate.await;
            }
            Ok::<_, CacheError>(CachedQueryPayload::default())
        }
        .boxed()
    };

    let refetcher = TokioRefetcher::new(store.clone(), fetcher)
        .unwrap()
        .with_metrics(metrics.clone());
    let watch = store
        .active_watches()
        .into_iter()
        .find(|watch| watch.id == id)
        .unwrap();

    let task = refetcher.spawn(&watch);
    store.unregister(&id).unwrap();
    release.send(()).unwrap();
    task.await.unwrap();

    assert!(store.read_payload(&id).is_none());
    assert_eq!(metrics.snapshot().refetches_dropped, 1);
}

/// A failing fetch leaves the cached payload as it was.
#[tokio::test]
async fn test_failed_fetch_keeps_cache() {
    let store = Arc::new(MemoryStore::new());
    let id = register_open_posts(&store);
    let metrics = Arc::new(CacheMetrics::new());

    let fetcher = |_query: QueryDescriptor| -> FetchFuture {
        async { Err::<CachedQueryPayload, _>(CacheError::Fetch("503".into())) }.boxed()
    };
    let refetcher = TokioRefetcher::new(store.clone(), fetcher)
        .unwrap()
        .with_metrics(metrics.clone());
    let watch = store.active_watches().remove(0);

    refetcher.spawn(&watch).await.unwrap();

    assert_eq!(store.read_payload(&id).unwrap().ids(), vec!["A"]);
    assert_eq!(metrics.snapshot().refetches_failed, 1);
}
