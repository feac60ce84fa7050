//! Refetch dispatch
//!
//! Created documents are never spliced into a cached list locally; the
//! matching watches are refetched instead. A refetch is fire-and-forget:
//! the handler does not wait for it, and whatever the server returns
//! replaces the payload wholesale.

use std::sync::Arc;

use futures_util::future::BoxFuture;
use tokio::runtime::Handle;
use tokio::task::JoinHandle;

use crate::cache::CachedQueryPayload;
use crate::errors::{CacheError, CacheResult};
use crate::observability::{CacheMetrics, Event, Logger};
use crate::registry::{ObjectStore, QueryDescriptor, Watch, WatchId};

/// Asks the network layer to re-execute a watch's query
pub trait Refetcher: Send + Sync {
    /// Requests a refetch; must not block
    fn refetch(&self, watch: &Watch);
}

/// Future resolving to a freshly fetched payload
pub type FetchFuture = BoxFuture<'static, CacheResult<CachedQueryPayload>>;

/// Executes a query against the server
pub trait QueryFetcher: Send + Sync + 'static {
    fn fetch(&self, query: QueryDescriptor) -> FetchFuture;
}

impl<F> QueryFetcher for F
where
    F: Fn(QueryDescriptor) -> FetchFuture + Send + Sync + 'static,
{
    fn fetch(&self, query: QueryDescriptor) -> FetchFuture {
        self(query)
    }
}

/// Refetcher that runs each fetch as a detached tokio task
pub struct TokioRefetcher {
    store: Arc<dyn ObjectStore>,
    fetcher: Arc<dyn QueryFetcher>,
    handle: Handle,
    metrics: Arc<CacheMetrics>,
}

impl TokioRefetcher {
    /// Binds to the runtime of the calling context
    pub fn new(store: Arc<dyn ObjectStore>, fetcher: impl QueryFetcher) -> CacheResult<Self> {
        let handle = Handle::try_current()
            .map_err(|e| CacheError::Internal(format!("no tokio runtime: {}", e)))?;
        Ok(Self::with_handle(store, fetcher, handle))
    }

    pub fn with_handle(
        store: Arc<dyn ObjectStore>,
        fetcher: impl QueryFetcher,
        handle: Handle,
    ) -> Self {
        Self {
            store,
            fetcher: Arc::new(fetcher),
            handle,
            metrics: Arc::new(CacheMetrics::new()),
        }
    }

    /// Shares counters with the updater
    pub fn with_metrics(mut self, metrics: Arc<CacheMetrics>) -> Self {
        self.metrics = metrics;
        self
    }

    /// Spawns the refetch and returns its task handle
    ///
    /// `Refetcher::refetch` discards the handle; tests await it.
    pub fn spawn(&self, watch: &Watch) -> JoinHandle<()> {
        let store = Arc::clone(&self.store);
        let fetcher = Arc::clone(&self.fetcher);
        let metrics = Arc::clone(&self.metrics);
        let id = watch.id;
        let query = watch.query.clone();

        self.handle.spawn(async move {
            let operation = query.operation_name.clone();
            let fetched = fetcher.fetch(query).await;
            apply_refetch(store.as_ref(), &id, &operation, fetched, &metrics);
        })
    }
}

impl Refetcher for TokioRefetcher {
    fn refetch(&self, watch: &Watch) {
        let _ = self.spawn(watch);
    }
}

impl std::fmt::Debug for TokioRefetcher {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TokioRefetcher").finish_non_exhaustive()
    }
}

/// Writes a refetch result back; every failure ends here as a log line
fn apply_refetch(
    store: &dyn ObjectStore,
    id: &WatchId,
    operation: &str,
    fetched: CacheResult<CachedQueryPayload>,
    metrics: &CacheMetrics,
) {
    let watch = id.to_string();

    let payload = match fetched {
        Ok(payload) => payload,
        Err(err) => {
            metrics.increment_refetches_failed();
            Logger::event(
                Event::RefetchFailed,
                &[
                    ("code", err.code()),
                    ("operation", operation),
                    ("reason", &err.to_string()),
                    ("watch", &watch),
                ],
            );
            return;
        }
    };

    let results = payload.len().to_string();
    match store.write_payload(id, payload) {
        Ok(()) => {
            metrics.increment_payloads_written();
            Logger::event(
                Event::RefetchApplied,
                &[("operation", operation), ("results", &results), ("watch", &watch)],
            );
        }
        Err(err) if err.is_benign() => {
            metrics.increment_refetches_dropped();
            Logger::event(
                Event::RefetchDropped,
                &[("operation", operation), ("watch", &watch)],
            );
        }
        Err(err) => {
            metrics.increment_refetches_failed();
            Logger::event(
                Event::RefetchFailed,
                &[
                    ("code", err.code()),
                    ("operation", operation),
                    ("reason", &err.to_string()),
                    ("watch", &watch),
                ],
            );
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cache::Document;
    use crate::registry::{MemoryStore, QueryParameters};
    use futures_util::FutureExt;
    use serde_json::json;

    fn fresh_payload() -> CachedQueryPayload {
        CachedQueryPayload::new(vec![
            Document::from_value(json!({"_id": "server-1"})).unwrap(),
            Document::from_value(json!({"_id": "server-2"})).unwrap(),
        ])
    }

    fn serving(payload: CachedQueryPayload) -> impl QueryFetcher {
        move |_query: QueryDescriptor| -> FetchFuture {
            let payload = payload.clone();
            async move { Ok::<_, CacheError>(payload) }.boxed()
        }
    }

    fn failing() -> impl QueryFetcher {
        |_query: QueryDescriptor| -> FetchFuture {
            async { Err::<CachedQueryPayload, _>(CacheError::Fetch("connection reset".into())) }
                .boxed()
        }
    }

    fn register(store: &MemoryStore) -> Watch {
        let id = store
            .register(
                QueryDescriptor::new("multiPostQuery", json!({})),
                QueryParameters::default(),
                CachedQueryPayload::default(),
            )
            .unwrap();
        store
            .active_watches()
            .into_iter()
            .find(|watch| watch.id == id)
            .unwrap()
    }

    #[tokio::test]
    async fn test_refetch_replaces_payload() {
        let store = Arc::new(MemoryStore::new());
        let watch = register(&store);
        let metrics = Arc::new(CacheMetrics::new());

        let refetcher = TokioRefetcher::new(store.clone(), serving(fresh_payload()))
            .unwrap()
            .with_metrics(metrics.clone());
        refetcher.spawn(&watch).await.unwrap();

        assert_eq!(store.read_payload(&watch.id).unwrap(), fresh_payload());
        assert_eq!(store.generation(&watch.id), Some(1));
        assert_eq!(metrics.snapshot().payloads_written, 1);
    }

    #[tokio::test]
    async fn test_refetch_after_teardown_is_dropped() {
        let store = Arc::new(MemoryStore::new());
        let watch = register(&store);
        store.unregister(&watch.id).unwrap();
        let metrics = Arc::new(CacheMetrics::new());

        let refetcher = TokioRefetcher::new(store.clone(), serving(fresh_payload()))
            .unwrap()
            .with_metrics(metrics.clone());
        refetcher.spawn(&watch).await.unwrap();

        assert!(store.read_payload(&watch.id).is_none());
        assert_eq!(metrics.snapshot().refetches_dropped, 1);
        assert_eq!(metrics.snapshot().refetches_failed, 0);
    }

    #[tokio::test]
    async fn test_fetch_failure_leaves_payload() {
        let store = Arc::new(MemoryStore::new());
        let watch = register(&store);
        let metrics = Arc::new(CacheMetrics::new());

        let refetcher = TokioRefetcher::new(store.clone(), failing())
            .unwrap()
            .with_metrics(metrics.clone());
        refetcher.spawn(&watch).await.unwrap();

        assert_eq!(store.read_payload(&watch.id).unwrap(), CachedQueryPayload::default());
        assert_eq!(store.generation(&watch.id), Some(0));
        assert_eq!(metrics.snapshot().refetches_failed, 1);
    }

    #[test]
    fn test_apply_refetch_logs_drop() {
        let store = MemoryStore::new();
        let metrics = CacheMetrics::new();
        let id = WatchId::new();

        let ((), lines) = Logger::capture(|| {
            apply_refetch(&store, &id, "multiPostQuery", Ok(fresh_payload()), &metrics)
        });

        assert_eq!(lines.len(), 1);
        assert!(lines[0].contains("REFETCH_DROPPED"));
    }

    #[test]
    fn test_new_outside_runtime_fails() {
        let store: Arc<dyn ObjectStore> = Arc::new(MemoryStore::new());
        let err = TokioRefetcher::new(store, failing()).unwrap_err();
        assert!(matches!(err, CacheError::Internal(_)));
    }
}
