//! aerocache - keeps cached list queries consistent with mutation outcomes
//!
//! A client holds many live list queries ("watches"), each a selector, a
//! sort and a cached page of results. When a mutation completes, the
//! matching watches are patched locally (update, delete) or refetched
//! (create) so the UI never shows a stale list.
//!
//! Wiring:
//!
//! ```ignore
//! let store = Arc::new(MemoryStore::new());
//! let refetcher = Arc::new(TokioRefetcher::new(store.clone(), fetch_from_server)?);
//! let config = CacheConfig::default();
//! config.apply_logging();
//!
//! let updater = CacheUpdater::new(store, refetcher, config);
//! updater.handle(&MutationOutcome::from_value(wire_json)?)?;
//! ```

pub mod cache;
pub mod config;
pub mod errors;
pub mod handlers;
pub mod observability;
pub mod registry;
pub mod selector;
pub mod sort;

pub use cache::{CachedQueryPayload, Document};
pub use config::CacheConfig;
pub use errors::{CacheError, CacheResult};
pub use handlers::{
    CacheUpdater, FetchFuture, MutationKind, MutationOutcome, QueryFetcher, Refetcher,
    TokioRefetcher, UpdateReport,
};
pub use registry::{
    find_watches, list_resolver_name, ListQueryNaming, MemoryStore, ObjectStore, QueryDescriptor,
    QueryParameters, Watch, WatchId, WatchRegistry,
};
pub use selector::{matches, Selector};
pub use sort::{SortDirection, SortSpec};
