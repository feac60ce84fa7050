//! Error types surfaced by aerocache
//!
//! Selector and sort failures never reach callers; they are recovered
//! locally (see `selector::SelectorError` and `sort::SortError`). The
//! errors here cover malformed inputs and store boundary failures.

use thiserror::Error;

/// Result type for cache operations
pub type CacheResult<T> = Result<T, CacheError>;

/// Cache engine errors
#[derive(Debug, Clone, PartialEq, Error)]
pub enum CacheError {
    // ==================
    // Input Errors
    // ==================
    /// Document is not a JSON object
    #[error("Invalid document: {0}")]
    InvalidDocument(String),

    /// Document has no string `_id`
    #[error("Document is missing a string _id")]
    MissingId,

    /// Mutation outcome is inconsistent with its document
    #[error("Invalid mutation outcome: {0}")]
    InvalidOutcome(String),

    /// Sort description could not be parsed
    #[error("Invalid sort specification: {0}")]
    InvalidSortSpec(String),

    // ==================
    // Store Errors
    // ==================
    /// Watch is not (or no longer) registered
    #[error("Watch not found: {0}")]
    WatchNotFound(String),

    // ==================
    // Network Errors
    // ==================
    /// Refetch failed in the network layer
    #[error("Fetch failed: {0}")]
    Fetch(String),

    // ==================
    // Internal Errors
    // ==================
    /// Internal error
    #[error("Internal error: {0}")]
    Internal(String),
}

impl CacheError {
    /// Returns the stable error code
    pub fn code(&self) -> &'static str {
        match self {
            CacheError::InvalidDocument(_) => "AERO_CACHE_INVALID_DOCUMENT",
            CacheError::MissingId => "AERO_CACHE_MISSING_ID",
            CacheError::InvalidOutcome(_) => "AERO_CACHE_INVALID_OUTCOME",
            CacheError::InvalidSortSpec(_) => "AERO_CACHE_INVALID_SORT",
            CacheError::WatchNotFound(_) => "AERO_CACHE_WATCH_NOT_FOUND",
            CacheError::Fetch(_) => "AERO_CACHE_FETCH_FAILED",
            CacheError::Internal(_) => "AERO_CACHE_INTERNAL",
        }
    }

    /// Returns true for conditions callers are expected to shrug off
    pub fn is_benign(&self) -> bool {
        matches!(self, CacheError::WatchNotFound(_))
    }
}
