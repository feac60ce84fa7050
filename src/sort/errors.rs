//! Sort errors
//!
//! Recovered by `cache::resort`, which keeps the previous payload.

use thiserror::Error;

/// Result type for sorting
pub type SortResult<T> = Result<T, SortError>;

/// Sort errors
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SortError {
    /// A sort key resolved to a value with no defined order
    #[error("Cannot sort on {path}: document {document_id} holds an {kind}")]
    UnsortableValue {
        path: String,
        document_id: String,
        kind: &'static str,
    },

    /// The selector used for re-filtering cannot be evaluated
    #[error("Cannot re-filter before sorting: {0}")]
    Refilter(String),
}
