//! Set operations over cached payloads
//!
//! Every operation consumes a payload and returns the next one. None of
//! them fail: `resort` hands back its input when sorting is impossible.

use super::document::Document;
use super::payload::CachedQueryPayload;
use crate::observability::{CacheMetrics, Event, Logger};
use crate::selector::Selector;
use crate::sort::{ResultSorter, SortError, SortResult, SortSpec};

/// Is a document with this `_id` already in `results`?
pub fn is_member(payload: &CachedQueryPayload, document: &Document) -> bool {
    payload.results.iter().any(|doc| doc.id() == document.id())
}

/// Appends `document` and counts it.
///
/// The caller checks `is_member` first; adding a present document
/// duplicates it.
pub fn add(mut payload: CachedQueryPayload, document: &Document) -> CachedQueryPayload {
    payload.results.push(document.clone());
    payload.total_count += 1;
    payload
}

/// Merges `document` over the cached entry with the same `_id`.
///
/// Count and position are untouched; an absent id leaves the payload as is.
pub fn update_in_place(mut payload: CachedQueryPayload, document: &Document) -> CachedQueryPayload {
    if let Some(entry) = payload
        .results
        .iter_mut()
        .find(|doc| doc.id() == document.id())
    {
        *entry = entry.merged(document);
    }
    payload
}

/// Drops the entry with `document`'s `_id`.
///
/// The count only moves if something was actually removed, so repeated
/// removals are idempotent.
pub fn remove(mut payload: CachedQueryPayload, document: &Document) -> CachedQueryPayload {
    let before = payload.results.len();
    payload.results.retain(|doc| doc.id() != document.id());
    if payload.results.len() < before {
        payload.total_count = payload.total_count.saturating_sub(1);
    }
    payload
}

/// Re-filters `results` with `selector` and orders them by `sort`.
///
/// Entries that no longer match are dropped and uncounted. Errors leave the
/// input untouched for the caller to keep.
pub fn try_resort(
    payload: &CachedQueryPayload,
    selector: &Selector,
    sort: &SortSpec,
) -> SortResult<CachedQueryPayload> {
    if let Some(reason) = selector.first_unsupported() {
        return Err(SortError::Refilter(reason.to_string()));
    }

    let kept: Vec<Document> = payload
        .results
        .iter()
        .filter(|doc| selector.evaluate(doc).unwrap_or(false))
        .cloned()
        .collect();
    let dropped = (payload.results.len() - kept.len()) as u64;

    let results = ResultSorter::sort(kept, sort)?;
    Ok(CachedQueryPayload {
        results,
        total_count: payload.total_count.saturating_sub(dropped),
    })
}

/// `try_resort`, falling back to the input payload on failure
pub fn resort(
    payload: CachedQueryPayload,
    selector: &Selector,
    sort: &SortSpec,
) -> CachedQueryPayload {
    resort_or_keep(payload, selector, sort, None)
}

/// Like `resort`, also counting failures in `metrics`
pub fn resort_observed(
    payload: CachedQueryPayload,
    selector: &Selector,
    sort: &SortSpec,
    metrics: &CacheMetrics,
) -> CachedQueryPayload {
    resort_or_keep(payload, selector, sort, Some(metrics))
}

fn resort_or_keep(
    payload: CachedQueryPayload,
    selector: &Selector,
    sort: &SortSpec,
    metrics: Option<&CacheMetrics>,
) -> CachedQueryPayload {
    match try_resort(&payload, selector, sort) {
        Ok(resorted) => resorted,
        Err(err) => {
            if let Some(metrics) = metrics {
                metrics.increment_sort_errors();
            }
            Logger::event(
                Event::SortFailed,
                &[
                    ("reason", &err.to_string()),
                    ("results", &payload.results.len().to_string()),
                ],
            );
            payload
        }
    }
}
