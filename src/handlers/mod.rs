//! Mutation-outcome handlers and refetch dispatch

mod outcome;
mod refetch;
mod updater;

pub use outcome::{MutationKind, MutationOutcome};
pub use refetch::{FetchFuture, QueryFetcher, Refetcher, TokioRefetcher};
pub use updater::{CacheUpdater, UpdateReport};
