//! Observability subsystem for aerocache
//!
//! This module provides:
//! - Structured logging (JSON lines)
//! - Typed cache-maintenance events
//! - Monotonic counters
//!
//! # Principles
//!
//! 1. Observability is read-only
//! 2. Logging never fails the caller
//! 3. Deterministic output
//!
//! # Usage
//!
//! ```ignore
//! use aerocache::observability::{Event, Logger, CacheMetrics};
//!
//! Logger::event(Event::SortFailed, &[("watch", "w1")]);
//!
//! let metrics = CacheMetrics::new();
//! metrics.increment_sort_errors();
//! ```

mod events;
mod logger;
mod metrics;

pub use events::Event;
pub use logger::{Logger, Severity};
pub use metrics::{CacheMetrics, MetricsSnapshot};

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_event_logged_at_its_severity() {
        let ((), lines) = Logger::capture(|| {
            Logger::event(Event::SortFailed, &[("watch", "w1")]);
        });

        assert_eq!(lines.len(), 1);
        let parsed: serde_json::Value = serde_json::from_str(&lines[0]).unwrap();
        assert_eq!(parsed["event"], "SORT_FAILED");
        assert_eq!(parsed["severity"], "WARN");
        assert_eq!(parsed["watch"], "w1");
    }
}
