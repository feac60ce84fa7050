//! Mutation outcome handlers
//!
//! Applies one server mutation to every cached list query of the mutated
//! type. Create, update and delete are deliberately asymmetric:
//!
//! - delete: remove the document everywhere, no selector involved
//! - update: patch, enter or leave each watch depending on the selector
//! - create: never spliced in locally; matching watches are refetched
//!
//! Handlers run synchronously to completion. Refetches are not awaited.

use std::sync::Arc;

use serde::Serialize;

use super::outcome::{validate_target, MutationKind, MutationOutcome};
use super::refetch::Refetcher;
use crate::cache::{self, CachedQueryPayload, Document};
use crate::config::CacheConfig;
use crate::errors::{CacheError, CacheResult};
use crate::observability::{CacheMetrics, Event, Logger};
use crate::registry::{ObjectStore, QueryParameters, WatchRegistry};
use crate::selector;

/// What a handler did to the watches of one type
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct UpdateReport {
    /// Watches of the type found in the store
    pub watches: usize,
    /// Payloads written back
    pub written: usize,
    /// Watches the document entered
    pub entered: usize,
    /// Watches where the document was patched in place
    pub patched: usize,
    /// Watches the document left
    pub removed: usize,
    /// Refetches issued
    pub refetched: usize,
    /// Watches left untouched (no change, no match, or gone)
    pub skipped: usize,
    /// Watches whose payload the store refused to write
    pub failed: usize,
}

/// How a strategy changed a payload
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Change {
    Entered,
    Patched,
    Removed,
    Rewritten,
}

/// Keeps cached list queries consistent with mutation outcomes
pub struct CacheUpdater {
    registry: WatchRegistry,
    refetcher: Arc<dyn Refetcher>,
    config: CacheConfig,
    metrics: Arc<CacheMetrics>,
}

impl CacheUpdater {
    pub fn new(
        store: Arc<dyn ObjectStore>,
        refetcher: Arc<dyn Refetcher>,
        config: CacheConfig,
    ) -> Self {
        Self {
            registry: WatchRegistry::new(store, config.naming()),
            refetcher,
            config,
            metrics: Arc::new(CacheMetrics::new()),
        }
    }

    /// Shares counters with the refetcher or the embedder
    pub fn with_metrics(mut self, metrics: Arc<CacheMetrics>) -> Self {
        self.metrics = metrics;
        self
    }

    pub fn metrics(&self) -> &Arc<CacheMetrics> {
        &self.metrics
    }

    pub fn config(&self) -> &CacheConfig {
        &self.config
    }

    pub fn registry(&self) -> &WatchRegistry {
        &self.registry
    }

    /// Dispatches an outcome to its handler
    pub fn handle(&self, outcome: &MutationOutcome) -> CacheResult<UpdateReport> {
        match outcome.kind {
            MutationKind::Create => self.on_create(&outcome.type_name, &outcome.document),
            MutationKind::Update => self.on_update(&outcome.type_name, &outcome.document),
            MutationKind::Delete => self.on_delete(&outcome.type_name, &outcome.document),
        }
    }

    /// Refetches every watch whose selector admits the new document.
    ///
    /// The document is never added locally: its position and the page
    /// boundaries are the server's call.
    pub fn on_create(&self, type_name: &str, document: &Document) -> CacheResult<UpdateReport> {
        self.accept(MutationKind::Create, type_name, document)?;

        let watches = self.registry.find_watches(type_name);
        let mut report = UpdateReport {
            watches: watches.len(),
            ..UpdateReport::default()
        };

        if !self.config.refetch_on_create {
            report.skipped = watches.len();
            Logger::event(
                Event::RefetchDisabled,
                &[("document_id", document.id()), ("type_name", type_name)],
            );
            self.finish(MutationKind::Create, type_name, &report);
            return Ok(report);
        }

        for watch in &watches {
            if !selector::matches_observed(document, &watch.parameters.selector, &self.metrics) {
                report.skipped += 1;
                continue;
            }

            self.refetcher.refetch(watch);
            self.metrics.increment_refetches_issued();
            report.refetched += 1;
            Logger::event(
                Event::RefetchIssued,
                &[
                    ("document_id", document.id()),
                    ("operation", watch.operation_name()),
                    ("watch", &watch.id.to_string()),
                ],
            );
        }

        self.finish(MutationKind::Create, type_name, &report);
        Ok(report)
    }

    /// Moves the updated document into, within, or out of each watch
    pub fn on_update(&self, type_name: &str, document: &Document) -> CacheResult<UpdateReport> {
        self.accept(MutationKind::Update, type_name, document)?;

        let metrics = Arc::clone(&self.metrics);
        let report = self.apply_each(type_name, document, |doc, payload, parameters| {
            apply_update(doc, payload, parameters, &metrics)
        });

        self.finish(MutationKind::Update, type_name, &report);
        Ok(report)
    }

    /// Removes the document from every watch of the type
    pub fn on_delete(&self, type_name: &str, document: &Document) -> CacheResult<UpdateReport> {
        self.accept(MutationKind::Delete, type_name, document)?;

        let report = self.apply_each(type_name, document, |doc, payload, _| {
            (cache::remove(payload, doc), Change::Removed)
        });

        self.finish(MutationKind::Delete, type_name, &report);
        Ok(report)
    }

    /// Runs `strategy` over the payload of every watch of `type_name`.
    ///
    /// A payload is only written back when the strategy changed it. Store
    /// failures are logged per watch and never abort the pass.
    pub fn update_each_query_result_of_type<F>(
        &self,
        type_name: &str,
        document: &Document,
        strategy: F,
    ) -> CacheResult<UpdateReport>
    where
        F: Fn(&Document, CachedQueryPayload, &QueryParameters) -> CachedQueryPayload,
    {
        validate_target(type_name, document)?;
        Ok(self.apply_each(type_name, document, |doc, payload, parameters| {
            (strategy(doc, payload, parameters), Change::Rewritten)
        }))
    }

    fn apply_each<F>(&self, type_name: &str, document: &Document, strategy: F) -> UpdateReport
    where
        F: Fn(&Document, CachedQueryPayload, &QueryParameters) -> (CachedQueryPayload, Change),
    {
        let store = self.registry.store();
        let watches = self.registry.find_watches(type_name);
        let mut report = UpdateReport {
            watches: watches.len(),
            ..UpdateReport::default()
        };

        for watch in &watches {
            let watch_id = watch.id.to_string();

            let Some(current) = store.read_payload(&watch.id) else {
                report.skipped += 1;
                Logger::event(Event::WatchVanished, &[("watch", &watch_id)]);
                continue;
            };

            let (next, change) = strategy(document, current.clone(), &watch.parameters);
            if next == current {
                report.skipped += 1;
                continue;
            }

            let results = next.len().to_string();
            let total_count = next.total_count.to_string();
            match store.write_payload(&watch.id, next) {
                Ok(()) => {}
                Err(err) if err.is_benign() => {
                    report.skipped += 1;
                    Logger::event(Event::WatchVanished, &[("watch", &watch_id)]);
                    continue;
                }
                Err(err) => {
                    report.failed += 1;
                    Logger::event(
                        Event::WatchWriteFailed,
                        &[
                            ("code", err.code()),
                            ("reason", &err.to_string()),
                            ("watch", &watch_id),
                        ],
                    );
                    continue;
                }
            }

            self.metrics.increment_payloads_written();
            report.written += 1;
            match change {
                Change::Entered => report.entered += 1,
                Change::Patched => report.patched += 1,
                Change::Removed => report.removed += 1,
                Change::Rewritten => {}
            }

            Logger::event(
                Event::WatchPatched,
                &[
                    ("document_id", document.id()),
                    ("operation", watch.operation_name()),
                    ("results", &results),
                    ("total_count", &total_count),
                    ("watch", &watch_id),
                ],
            );
        }

        report
    }

    fn accept(&self, kind: MutationKind, type_name: &str, document: &Document) -> CacheResult<()> {
        validate_target(type_name, document).map_err(|err| self.reject(kind, type_name, err))
    }

    fn reject(&self, kind: MutationKind, type_name: &str, err: CacheError) -> CacheError {
        self.metrics.increment_mutations_rejected();
        Logger::event(
            Event::MutationRejected,
            &[
                ("code", err.code()),
                ("kind", kind.as_str()),
                ("reason", &err.to_string()),
                ("type_name", type_name),
            ],
        );
        err
    }

    fn finish(&self, kind: MutationKind, type_name: &str, report: &UpdateReport) {
        self.metrics.increment_mutations_handled();
        Logger::event(
            Event::MutationHandled,
            &[
                ("failed", &report.failed.to_string()),
                ("kind", kind.as_str()),
                ("refetched", &report.refetched.to_string()),
                ("type_name", type_name),
                ("watches", &report.watches.to_string()),
                ("written", &report.written.to_string()),
            ],
        );
    }
}

impl std::fmt::Debug for CacheUpdater {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CacheUpdater")
            .field("registry", &self.registry)
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

/// Update policy for a single watch
///
/// 1. matches and cached: merge, then re-sort
/// 2. matches, not cached: append, then re-sort
/// 3. no match: remove (a no-op if it was never there)
fn apply_update(
    document: &Document,
    payload: CachedQueryPayload,
    parameters: &QueryParameters,
    metrics: &CacheMetrics,
) -> (CachedQueryPayload, Change) {
    let QueryParameters { selector, sort, .. } = parameters;

    if !selector::matches_observed(document, selector, metrics) {
        return (cache::remove(payload, document), Change::Removed);
    }

    if cache::is_member(&payload, document) {
        let merged = cache::update_in_place(payload, document);
        (cache::resort_observed(merged, selector, sort, metrics), Change::Patched)
    } else {
        let added = cache::add(payload, document);
        (cache::resort_observed(added, selector, sort, metrics), Change::Entered)
    }
}
