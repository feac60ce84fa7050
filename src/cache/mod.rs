//! Cached query payloads and the set operations that maintain them
//!
//! # Operations
//!
//! - `is_member`: membership by `_id`
//! - `add`: append and count
//! - `update_in_place`: shallow merge, count unchanged
//! - `remove`: drop and uncount (only if present)
//! - `resort`: re-filter and reorder, keeping the input on failure

mod document;
mod number;
mod payload;
mod set_ops;

pub use document::{Document, ID_FIELD, TYPENAME_FIELD};
pub use number::compare_numbers;
pub use payload::CachedQueryPayload;
pub use set_ops::{add, is_member, remove, resort, resort_observed, try_resort, update_in_place};
