//! Watch handles
//!
//! A watch is a live cached list query. The store owns its payload; the
//! engine holds a handle that names the query and carries the parameters
//! used to decide membership and order.

use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::Value;
use uuid::Uuid;

use crate::errors::CacheResult;
use crate::selector::Selector;
use crate::sort::SortSpec;

/// Store-assigned watch identifier
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct WatchId(Uuid);

impl WatchId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for WatchId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for WatchId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// The network-layer description of a query, handed back on refetch
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QueryDescriptor {
    /// Declared operation name, e.g. `multiPostQuery`
    pub operation_name: String,
    /// Variables the query was issued with
    #[serde(default)]
    pub variables: Value,
}

impl QueryDescriptor {
    pub fn new(operation_name: impl Into<String>, variables: Value) -> Self {
        Self {
            operation_name: operation_name.into(),
            variables,
        }
    }
}

/// Membership and ordering rules of a cached query
#[derive(Debug, Clone, Default, PartialEq)]
pub struct QueryParameters {
    pub selector: Selector,
    pub sort: SortSpec,
}

impl QueryParameters {
    pub fn new(selector: Selector, sort: SortSpec) -> Self {
        Self { selector, sort }
    }

    /// Reads `{"selector": {...}, "options": {"sort": {...}}}`
    ///
    /// The selector never fails to parse (unsupported shapes evaluate
    /// closed); a malformed sort is an error. Paging options such as
    /// `limit` belong to the server and are ignored.
    pub fn from_terms(terms: &Value) -> CacheResult<Self> {
        let selector = Selector::from_json(terms.get("selector").unwrap_or(&Value::Null));

        let options = terms.get("options").unwrap_or(&Value::Null);
        let sort = SortSpec::from_json(options.get("sort").unwrap_or(&Value::Null))?;

        Ok(Self { selector, sort })
    }
}

/// A registered cached list query
#[derive(Debug, Clone, PartialEq)]
pub struct Watch {
    pub id: WatchId,
    pub query: QueryDescriptor,
    pub parameters: QueryParameters,
}

impl Watch {
    pub fn new(id: WatchId, query: QueryDescriptor, parameters: QueryParameters) -> Self {
        Self {
            id,
            query,
            parameters,
        }
    }

    pub fn operation_name(&self) -> &str {
        &self.query.operation_name
    }
}
