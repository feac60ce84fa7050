//! Cache maintenance counters
//!
//! - Counters only
//! - Monotonic increase
//! - Thread-safe, Relaxed ordering

use std::sync::atomic::{AtomicU64, Ordering};

use serde::Serialize;

/// Operational counters for one cache engine instance
///
/// Shared between the updater and its refetcher through an `Arc`.
#[derive(Debug, Default)]
pub struct CacheMetrics {
    /// Mutation outcomes processed
    mutations_handled: AtomicU64,
    /// Mutation outcomes rejected before processing
    mutations_rejected: AtomicU64,
    /// Payload writes issued to the store
    payloads_written: AtomicU64,
    /// Selector evaluations that failed closed
    selector_errors: AtomicU64,
    /// Re-sorts that kept the previous payload
    sort_errors: AtomicU64,
    /// Refetches requested on the create path
    refetches_issued: AtomicU64,
    /// Refetch results discarded because the watch was gone
    refetches_dropped: AtomicU64,
    /// Refetches that failed in the network layer
    refetches_failed: AtomicU64,
}

impl CacheMetrics {
    /// Create a new registry with all counters at zero
    pub fn new() -> Self {
        Self::default()
    }

    pub fn increment_mutations_handled(&self) {
        self.mutations_handled.fetch_add(1, Ordering::Relaxed);
    }

    pub fn increment_mutations_rejected(&self) {
        self.mutations_rejected.fetch_add(1, Ordering::Relaxed);
    }

    pub fn increment_payloads_written(&self) {
        self.payloads_written.fetch_add(1, Ordering::Relaxed);
    }

    pub fn increment_selector_errors(&self) {
        self.selector_errors.fetch_add(1, Ordering::Relaxed);
    }

    pub fn increment_sort_errors(&self) {
        self.sort_errors.fetch_add(1, Ordering::Relaxed);
    }

    pub fn increment_refetches_issued(&self) {
        self.refetches_issued.fetch_add(1, Ordering::Relaxed);
    }

    pub fn increment_refetches_dropped(&self) {
        self.refetches_dropped.fetch_add(1, Ordering::Relaxed);
    }

    pub fn increment_refetches_failed(&self) {
        self.refetches_failed.fetch_add(1, Ordering::Relaxed);
    }

    /// Get all counters as a snapshot
    pub fn snapshot(&self) -> MetricsSnapshot {
        MetricsSnapshot {
            mutations_handled: self.mutations_handled.load(Ordering::Relaxed),
            mutations_rejected: self.mutations_rejected.load(Ordering::Relaxed),
            payloads_written: self.payloads_written.load(Ordering::Relaxed),
            selector_errors: self.selector_errors.load(Ordering::Relaxed),
            sort_errors: self.sort_errors.load(Ordering::Relaxed),
            refetches_issued: self.refetches_issued.load(Ordering::Relaxed),
            refetches_dropped: self.refetches_dropped.load(Ordering::Relaxed),
            refetches_failed: self.refetches_failed.load(Ordering::Relaxed),
        }
    }
}

/// A point-in-time snapshot of all counters
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct MetricsSnapshot {
    pub mutations_handled: u64,
    pub mutations_rejected: u64,
    pub payloads_written: u64,
    pub selector_errors: u64,
    pub sort_errors: u64,
    pub refetches_issued: u64,
    pub refetches_dropped: u64,
    pub refetches_failed: u64,
}
