//! Watch registry
//!
//! Finds the cached list queries that could contain a document of a given
//! type. A watch belongs to a type when its operation name is that type's
//! canonical list-query name.

mod naming;
mod store;
mod watch;

use std::sync::Arc;

pub use naming::{list_resolver_name, ListQueryNaming};
pub use store::{MemoryStore, ObjectStore};
pub use watch::{QueryDescriptor, QueryParameters, Watch, WatchId};

/// Type-name lookup over an object store
#[derive(Clone)]
pub struct WatchRegistry {
    store: Arc<dyn ObjectStore>,
    naming: ListQueryNaming,
}

impl WatchRegistry {
    pub fn new(store: Arc<dyn ObjectStore>, naming: ListQueryNaming) -> Self {
        Self { store, naming }
    }

    /// Live watches listing `type_name`; empty is normal
    pub fn find_watches(&self, type_name: &str) -> Vec<Watch> {
        find_watches(self.store.as_ref(), type_name, &self.naming)
    }

    pub fn store(&self) -> &Arc<dyn ObjectStore> {
        &self.store
    }

    pub fn naming(&self) -> &ListQueryNaming {
        &self.naming
    }
}

impl std::fmt::Debug for WatchRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("WatchRegistry")
            .field("naming", &self.naming)
            .finish_non_exhaustive()
    }
}

/// Filters `store`'s active watches down to the list queries of `type_name`
pub fn find_watches(
    store: &dyn ObjectStore,
    type_name: &str,
    naming: &ListQueryNaming,
) -> Vec<Watch> {
    let expected = naming.query_name(type_name);
    store
        .active_watches()
        .into_iter()
        .filter(|watch| watch.operation_name() == expected)
        .collect()
}
