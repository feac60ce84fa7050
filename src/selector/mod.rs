//! Selector subsystem for aerocache
//!
//! Decides whether a document belongs to a cached query.
//!
//! # Fail-closed
//!
//! `matches` never errors. A selector that cannot be evaluated (unknown
//! operator, malformed shape) is logged and treated as a non-match: a false
//! negative costs a refetch or a skipped local patch, a false positive
//! shows a document that does not belong.

mod ast;
mod errors;
mod evaluator;
mod parser;

pub use ast::{FieldOp, Pattern, Selector};
pub use errors::{SelectorError, SelectorResult};

use crate::cache::Document;
use crate::observability::{CacheMetrics, Event, Logger};

/// Returns whether `document` satisfies `selector`, failing closed
pub fn matches(document: &Document, selector: &Selector) -> bool {
    evaluate_or_deny(document, selector, None)
}

/// Like `matches`, also counting failures in `metrics`
pub fn matches_observed(document: &Document, selector: &Selector, metrics: &CacheMetrics) -> bool {
    evaluate_or_deny(document, selector, Some(metrics))
}

fn evaluate_or_deny(
    document: &Document,
    selector: &Selector,
    metrics: Option<&CacheMetrics>,
) -> bool {
    match selector.evaluate(document) {
        Ok(matched) => matched,
        Err(err) => {
            if let Some(metrics) = metrics {
                metrics.increment_selector_errors();
            }
            Logger::event(
                Event::SelectorEvalFailed,
                &[("document_id", document.id()), ("reason", &err.to_string())],
            );
            false
        }
    }
}
