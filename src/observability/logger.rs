//! Structured JSON logger
//!
//! - One log line = one event
//! - `event` first, then `severity`, then fields sorted by key
//! - Synchronous, no buffering
//! - Lines below the minimum severity are discarded

use std::cell::RefCell;
use std::fmt;
use std::io::{self, Write};
use std::sync::atomic::{AtomicU8, Ordering};

use serde::{Deserialize, Serialize};

use super::events::Event;

/// Log severity levels
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Severity {
    /// Per-watch detail
    Trace = 0,
    /// Normal operations
    Info = 1,
    /// Recovered failures (fail-closed paths)
    Warn = 2,
    /// Operation failures
    Error = 3,
    /// Unrecoverable
    Fatal = 4,
}

impl Severity {
    /// Returns the string representation
    pub fn as_str(&self) -> &'static str {
        match self {
            Severity::Trace => "TRACE",
            Severity::Info => "INFO",
            Severity::Warn => "WARN",
            Severity::Error => "ERROR",
            Severity::Fatal => "FATAL",
        }
    }

    fn from_u8(raw: u8) -> Self {
        match raw {
            0 => Severity::Trace,
            1 => Severity::Info,
            2 => Severity::Warn,
            3 => Severity::Error,
            _ => Severity::Fatal,
        }
    }
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

static MIN_SEVERITY: AtomicU8 = AtomicU8::new(Severity::Info as u8);

thread_local! {
    static CAPTURED: RefCell<Option<Vec<String>>> = const { RefCell::new(None) };
}

/// A structured logger that outputs JSON lines
pub struct Logger;

impl Logger {
    /// Sets the minimum severity written to stdout/stderr
    pub fn set_min_severity(severity: Severity) {
        MIN_SEVERITY.store(severity as u8, Ordering::Relaxed);
    }

    /// Returns the current minimum severity
    pub fn min_severity() -> Severity {
        Severity::from_u8(MIN_SEVERITY.load(Ordering::Relaxed))
    }

    /// Log a typed event at its own severity
    pub fn event(event: Event, fields: &[(&str, &str)]) {
        Self::log(event.severity(), event.as_str(), fields);
    }

    /// Log an event with the given severity and fields
    ///
    /// While a capture is active on the current thread every line is
    /// recorded, regardless of the minimum severity, and nothing is written.
    pub fn log(severity: Severity, event: &str, fields: &[(&str, &str)]) {
        let captured = CAPTURED.with(|cell| {
            let mut slot = cell.borrow_mut();
            match slot.as_mut() {
                Some(lines) => {
                    lines.push(Self::render(severity, event, fields));
                    true
                }
                None => false,
            }
        });
        if captured || severity < Self::min_severity() {
            return;
        }

        let line = Self::render(severity, event, fields);
        if severity >= Severity::Error {
            Self::write_line(&line, &mut io::stderr());
        } else {
            Self::write_line(&line, &mut io::stdout());
        }
    }

    /// Runs `f` and returns every line logged on this thread while it ran
    pub fn capture<T>(f: impl FnOnce() -> T) -> (T, Vec<String>) {
        let previous = CAPTURED.with(|cell| cell.borrow_mut().replace(Vec::new()));
        let value = f();
        let lines = CAPTURED.with(|cell| {
            let mut slot = cell.borrow_mut();
            let lines = slot.take().unwrap_or_default();
            *slot = previous;
            lines
        });
        (value, lines)
    }

    /// Renders a single JSON line (without the trailing newline)
    pub fn render(severity: Severity, event: &str, fields: &[(&str, &str)]) -> String {
        let mut output = String::with_capacity(128);

        output.push_str("{\"event\":");
        output.push_str(&quote(event));
        output.push_str(",\"severity\":");
        output.push_str(&quote(severity.as_str()));

        let mut sorted_fields: Vec<_> = fields.iter().collect();
        sorted_fields.sort_by_key(|(k, _)| *k);

        for (key, value) in sorted_fields {
            output.push(',');
            output.push_str(&quote(key));
            output.push(':');
            output.push_str(&quote(value));
        }

        output.push('}');
        output
    }

    fn write_line<W: Write>(line: &str, writer: &mut W) {
        // One write per line; a failing sink never fails the caller.
        let _ = writer.write_all(format!("{}\n", line).as_bytes());
        let _ = writer.flush();
    }

    /// Log at TRACE level
    pub fn trace(event: &str, fields: &[(&str, &str)]) {
        Self::log(Severity::Trace, event, fields);
    }

    /// Log at INFO level
    pub fn info(event: &str, fields: &[(&str, &str)]) {
        Self::log(Severity::Info, event, fields);
    }

    /// Log at WARN level
    pub fn warn(event: &str, fields: &[(&str, &str)]) {
        Self::log(Severity::Warn, event, fields);
    }

    /// Log at ERROR level
    pub fn error(event: &str, fields: &[(&str, &str)]) {
        Self::log(Severity::Error, event, fields);
    }
}

fn quote(s: &str) -> String {
    serde_json::Value::String(s.to_string()).to_string()
}
