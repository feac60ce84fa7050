//! Object store boundary
//!
//! The store owns watch payloads. The engine only reads a payload, computes
//! the next one and writes it back wholesale.

use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::RwLock;

use chrono::{DateTime, Utc};

use super::watch::{QueryDescriptor, QueryParameters, Watch, WatchId};
use crate::cache::CachedQueryPayload;
use crate::errors::{CacheError, CacheResult};

/// Where cached list-query payloads live
///
/// Implementations are shared with refetch tasks, so they must be
/// `Send + Sync`.
pub trait ObjectStore: Send + Sync {
    /// Every live watch, in registration order
    fn active_watches(&self) -> Vec<Watch>;

    /// Current payload, or `None` if the watch is gone
    fn read_payload(&self, id: &WatchId) -> Option<CachedQueryPayload>;

    /// Replaces the payload wholesale
    ///
    /// Fails with `WatchNotFound` if the watch has been torn down.
    fn write_payload(&self, id: &WatchId, payload: CachedQueryPayload) -> CacheResult<()>;
}

#[derive(Debug, Clone)]
struct Slot {
    watch: Watch,
    payload: CachedQueryPayload,
    generation: u64,
    written_at: DateTime<Utc>,
    seq: u64,
}

/// In-memory store for embedders and tests
#[derive(Debug, Default)]
pub struct MemoryStore {
    slots: RwLock<HashMap<WatchId, Slot>>,
    next_seq: AtomicU64,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a watch with its initial payload
    pub fn register(
        &self,
        query: QueryDescriptor,
        parameters: QueryParameters,
        payload: CachedQueryPayload,
    ) -> CacheResult<WatchId> {
        let id = WatchId::new();
        let slot = Slot {
            watch: Watch::new(id, query, parameters),
            payload,
            generation: 0,
            written_at: Utc::now(),
            seq: self.next_seq.fetch_add(1, Ordering::Relaxed),
        };

        let mut slots = self
            .slots
            .write()
            .map_err(|_| CacheError::Internal("Lock poisoned".into()))?;
        slots.insert(id, slot);

        Ok(id)
    }

    /// Tears a watch down; returns whether it existed
    pub fn unregister(&self, id: &WatchId) -> CacheResult<bool> {
        let mut slots = self
            .slots
            .write()
            .map_err(|_| CacheError::Internal("Lock poisoned".into()))?;
        Ok(slots.remove(id).is_some())
    }

    /// Number of writes since registration
    pub fn generation(&self, id: &WatchId) -> Option<u64> {
        self.slots.read().ok()?.get(id).map(|slot| slot.generation)
    }

    /// Time of the last write (or of registration)
    pub fn written_at(&self, id: &WatchId) -> Option<DateTime<Utc>> {
        self.slots.read().ok()?.get(id).map(|slot| slot.written_at)
    }

    pub fn len(&self) -> usize {
        self.slots.read().map(|slots| slots.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl ObjectStore for MemoryStore {
    fn active_watches(&self) -> Vec<Watch> {
        let Ok(slots) = self.slots.read() else {
            return Vec::new();
        };

        let mut live: Vec<&Slot> = slots.values().collect();
        live.sort_by_key(|slot| slot.seq);
        live.into_iter().map(|slot| slot.watch.clone()).collect()
    }

    fn read_payload(&self, id: &WatchId) -> Option<CachedQueryPayload> {
        self.slots.read().ok()?.get(id).map(|slot| slot.payload.clone())
    }

    fn write_payload(&self, id: &WatchId, payload: CachedQueryPayload) -> CacheResult<()> {
        let mut slots = self
            .slots
            .write()
            .map_err(|_| CacheError::Internal("Lock poisoned".into()))?;

        let slot = slots
            .get_mut(id)
            .ok_or_else(|| CacheError::WatchNotFound(id.to_string()))?;
        slot.payload = payload;
        slot.generation += 1;
        slot.written_at = Utc::now();

        Ok(())
    }
}
