//! Cache engine configuration
//!
//! Everything has a working default; embedders usually only touch
//! `refetch_on_create` or the log threshold.

use serde::{Deserialize, Serialize};

use crate::observability::{Logger, Severity};
use crate::registry::ListQueryNaming;

/// Configuration for a `CacheUpdater`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CacheConfig {
    /// Whether create outcomes refetch matching watches.
    /// When off, creates are logged and otherwise ignored.
    pub refetch_on_create: bool,
    /// Lowest severity written to the log.
    pub min_log_severity: Severity,
    /// Prefix of list-query operation names.
    pub list_query_prefix: String,
    /// Suffix of list-query operation names.
    pub list_query_suffix: String,
}

impl Default for CacheConfig {
    fn default() -> Self {
        let naming = ListQueryNaming::default();
        Self {
            refetch_on_create: true,
            min_log_severity: Severity::Info,
            list_query_prefix: naming.prefix,
            list_query_suffix: naming.suffix,
        }
    }
}

impl CacheConfig {
    /// Create config that never refetches on create.
    pub fn without_create_refetch() -> Self {
        Self {
            refetch_on_create: false,
            ..Self::default()
        }
    }

    pub fn with_min_log_severity(mut self, severity: Severity) -> Self {
        self.min_log_severity = severity;
        self
    }

    pub fn with_list_query_naming(
        mut self,
        prefix: impl Into<String>,
        suffix: impl Into<String>,
    ) -> Self {
        self.list_query_prefix = prefix.into();
        self.list_query_suffix = suffix.into();
        self
    }

    /// Naming rule for list-query operation names.
    pub fn naming(&self) -> ListQueryNaming {
        ListQueryNaming {
            prefix: self.list_query_prefix.clone(),
            suffix: self.list_query_suffix.clone(),
        }
    }

    /// Install the log threshold process-wide.
    pub fn apply_logging(&self) {
        Logger::set_min_severity(self.min_log_severity);
    }
}
