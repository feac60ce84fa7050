//! Selector evaluation errors
//!
//! These never escape `selector::matches`; they are logged and the document
//! is treated as a non-match.

use thiserror::Error;

/// Result type for selector evaluation
pub type SelectorResult<T> = Result<T, SelectorError>;

/// Selector evaluation errors
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SelectorError {
    /// Selector contains a shape the AST does not cover
    #[error("Unsupported selector: {0}")]
    Unsupported(String),

    /// Logical operator with no operands
    #[error("Empty {0} clause")]
    EmptyClause(&'static str),
}
