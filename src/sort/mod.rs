//! Sorting subsystem for aerocache
//!
//! Produces the required total order of a watch's results.

mod errors;
mod sorter;
mod spec;

pub use errors::{SortError, SortResult};
pub use sorter::ResultSorter;
pub use spec::{SortDirection, SortField, SortSpec};
