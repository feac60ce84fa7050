//! Observable cache-maintenance events
//!
//! Every log line the engine emits names one of these events.

use std::fmt;

use super::logger::Severity;

/// Observable events in aerocache
///
/// Covers:
/// - Selector evaluation
/// - Re-sorting
/// - Per-watch patching
/// - Create-path refetches
/// - Rejected mutation outcomes
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Event {
    // Selector evaluation
    /// Selector could not be evaluated; treated as non-match
    SelectorEvalFailed,

    // Sorting
    /// Re-sort failed; previous payload kept
    SortFailed,

    // Watch maintenance
    /// A watch payload was rewritten
    WatchPatched,
    /// A watch disappeared between lookup and write
    WatchVanished,
    /// The store refused a payload write
    WatchWriteFailed,
    /// A mutation outcome finished processing
    MutationHandled,
    /// A mutation outcome was rejected before touching any watch
    MutationRejected,

    // Refetch
    /// A refetch was requested for a watch
    RefetchIssued,
    /// A refetch resolved and replaced the payload
    RefetchApplied,
    /// A refetch resolved after its watch was torn down
    RefetchDropped,
    /// A refetch failed in the network layer
    RefetchFailed,
    /// A create outcome was ignored because create refetches are disabled
    RefetchDisabled,
}

impl Event {
    /// Returns the event name as it appears in log output
    pub fn as_str(&self) -> &'static str {
        match self {
            Event::SelectorEvalFailed => "SELECTOR_EVAL_FAILED",
            Event::SortFailed => "SORT_FAILED",
            Event::WatchPatched => "WATCH_PATCHED",
            Event::WatchVanished => "WATCH_VANISHED",
            Event::WatchWriteFailed => "WATCH_WRITE_FAILED",
            Event::MutationHandled => "MUTATION_HANDLED",
            Event::MutationRejected => "MUTATION_REJECTED",
            Event::RefetchIssued => "REFETCH_ISSUED",
            Event::RefetchApplied => "REFETCH_APPLIED",
            Event::RefetchDropped => "REFETCH_DROPPED",
            Event::RefetchFailed => "REFETCH_FAILED",
            Event::RefetchDisabled => "REFETCH_DISABLED",
        }
    }

    /// Severity the event is logged at
    pub fn severity(&self) -> Severity {
        match self {
            Event::SelectorEvalFailed
            | Event::SortFailed
            | Event::MutationRejected
            | Event::WatchWriteFailed
            | Event::RefetchFailed => Severity::Warn,
            Event::MutationHandled | Event::RefetchIssued => Severity::Info,
            Event::WatchPatched
            | Event::WatchVanished
            | Event::RefetchApplied
            | Event::RefetchDropped
            | Event::RefetchDisabled => Severity::Trace,
        }
    }
}

impl fmt::Display for Event {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_event_names_are_screaming_snake_case() {
        let events = [
            Event::SelectorEvalFailed,
            Event::SortFailed,
            Event::WatchPatched,
            Event::WatchVanished,
            Event::WatchWriteFailed,
            Event::MutationHandled,
            Event::MutationRejected,
            Event::RefetchIssued,
            Event::RefetchApplied,
            Event::RefetchDropped,
            Event::RefetchFailed,
            Event::RefetchDisabled,
        ];

        for event in events {
            let name = event.as_str();
            assert!(name
                .chars()
                .all(|c| c.is_ascii_uppercase() || c == '_'));
        }
    }

    #[test]
    fn test_recovered_failures_are_warn() {
        assert_eq!(Event::SelectorEvalFailed.severity(), Severity::Warn);
        assert_eq!(Event::SortFailed.severity(), Severity::Warn);
        assert_eq!(Event::WatchWriteFailed.severity(), Severity::Warn);
        assert_eq!(Event::WatchPatched.severity(), Severity::Trace);
        assert_eq!(Event::RefetchDropped.severity(), Severity::Trace);
    }
}
