//! Cached documents
//!
//! A document is an opaque JSON object with a stable string `_id`.
//! Documents are values: the engine replaces them, never edits them.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::errors::{CacheError, CacheResult};

/// Identifier field present on every document
pub const ID_FIELD: &str = "_id";

/// Type tag field carried by documents that come from the network layer
pub const TYPENAME_FIELD: &str = "__typename";

/// A document held in a cached query payload
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "Value", into = "Value")]
pub struct Document {
    id: String,
    fields: Map<String, Value>,
}

impl Document {
    /// Builds a document from a JSON object with a non-empty string `_id`
    pub fn from_value(value: Value) -> CacheResult<Self> {
        let fields = match value {
            Value::Object(fields) => fields,
            other => {
                return Err(CacheError::InvalidDocument(format!(
                    "expected object, got {}",
                    json_kind(&other)
                )))
            }
        };

        let id = match fields.get(ID_FIELD) {
            Some(Value::String(id)) if !id.is_empty() => id.clone(),
            _ => return Err(CacheError::MissingId),
        };

        Ok(Self { id, fields })
    }

    /// Returns the document identifier
    pub fn id(&self) -> &str {
        &self.id
    }

    /// Returns the `__typename` tag, if the document carries one
    pub fn type_name(&self) -> Option<&str> {
        self.fields.get(TYPENAME_FIELD).and_then(Value::as_str)
    }

    /// Returns a top-level field
    pub fn get(&self, field: &str) -> Option<&Value> {
        self.fields.get(field)
    }

    /// Resolves a dotted field path (`"author.profile.name"`, `"tags.0"`)
    ///
    /// Object segments are looked up by key, array segments by numeric index.
    pub fn get_path(&self, path: &str) -> Option<&Value> {
        let mut segments = path.split('.');
        let first = segments.next()?;
        let mut current = self.fields.get(first)?;

        for segment in segments {
            current = match current {
                Value::Object(map) => map.get(segment)?,
                Value::Array(items) => items.get(segment.parse::<usize>().ok()?)?,
                _ => return None,
            };
        }

        Some(current)
    }

    /// Returns all fields
    pub fn fields(&self) -> &Map<String, Value> {
        &self.fields
    }

    /// Shallow-merges `incoming` over this document
    ///
    /// Fields present in `incoming` win, including explicit `null`.
    /// Fields absent from `incoming` are kept. The identifier never changes.
    pub fn merged(&self, incoming: &Document) -> Document {
        let mut fields = self.fields.clone();
        for (key, value) in &incoming.fields {
            if key == ID_FIELD {
                continue;
            }
            fields.insert(key.clone(), value.clone());
        }
        Document {
            id: self.id.clone(),
            fields,
        }
    }

    /// Converts back into a JSON object
    pub fn into_value(self) -> Value {
        Value::Object(self.fields)
    }
}

impl TryFrom<Value> for Document {
    type Error = CacheError;

    fn try_from(value: Value) -> Result<Self, Self::Error> {
        Document::from_value(value)
    }
}

impl From<Document> for Value {
    fn from(document: Document) -> Self {
        document.into_value()
    }
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "bool",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}
