//! Mutation outcomes as delivered by the network layer

use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::cache::Document;
use crate::errors::{CacheError, CacheResult};

/// What the server did to the document
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MutationKind {
    Create,
    Update,
    Delete,
}

impl MutationKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            MutationKind::Create => "create",
            MutationKind::Update => "update",
            MutationKind::Delete => "delete",
        }
    }
}

impl fmt::Display for MutationKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A completed server mutation
///
/// For create and update, `document` is the post-mutation state. For
/// delete it only needs its `_id`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MutationOutcome {
    pub kind: MutationKind,
    pub type_name: String,
    pub document: Document,
}

impl MutationOutcome {
    pub fn new(kind: MutationKind, type_name: impl Into<String>, document: Document) -> Self {
        Self {
            kind,
            type_name: type_name.into(),
            document,
        }
    }

    pub fn create(type_name: impl Into<String>, document: Document) -> Self {
        Self::new(MutationKind::Create, type_name, document)
    }

    pub fn update(type_name: impl Into<String>, document: Document) -> Self {
        Self::new(MutationKind::Update, type_name, document)
    }

    pub fn delete(type_name: impl Into<String>, document: Document) -> Self {
        Self::new(MutationKind::Delete, type_name, document)
    }

    /// Parses a `{kind, typeName, document}` object.
    ///
    /// Unlike plain deserialization this keeps the precise document error
    /// (`MissingId` vs `InvalidDocument`).
    pub fn from_value(value: Value) -> CacheResult<Self> {
        let mut fields = match value {
            Value::Object(fields) => fields,
            other => {
                return Err(CacheError::InvalidOutcome(format!(
                    "expected object, got {}",
                    other
                )))
            }
        };

        let kind = fields
            .remove("kind")
            .ok_or_else(|| CacheError::InvalidOutcome("missing kind".into()))?;
        let kind: MutationKind = serde_json::from_value(kind)
            .map_err(|e| CacheError::InvalidOutcome(format!("bad kind: {}", e)))?;

        let type_name = match fields.remove("typeName") {
            Some(Value::String(name)) => name,
            _ => return Err(CacheError::InvalidOutcome("typeName must be a string".into())),
        };

        let document = Document::from_value(fields.remove("document").unwrap_or(Value::Null))?;

        let outcome = Self::new(kind, type_name, document);
        outcome.validate()?;
        Ok(outcome)
    }

    /// Checks the outcome is internally consistent
    pub fn validate(&self) -> CacheResult<()> {
        validate_target(&self.type_name, &self.document)
    }
}

/// A type name must be present, and must agree with the document's own
/// `__typename` when it carries one.
pub(crate) fn validate_target(type_name: &str, document: &Document) -> CacheResult<()> {
    if type_name.is_empty() {
        return Err(CacheError::InvalidOutcome("empty type name".into()));
    }

    match document.type_name() {
        Some(declared) if declared != type_name => Err(CacheError::InvalidOutcome(format!(
            "document {} is a {}, not a {}",
            document.id(),
            declared,
            type_name
        ))),
        _ => Ok(()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_outcome_deserialize() {
        let outcome: MutationOutcome = serde_json::from_value(json!({
            "kind": "update",
            "typeName": "Post",
            "document": {"_id": "p1", "status": "open"}
        }))
        .unwrap();

        assert_eq!(outcome.kind, MutationKind::Update);
        assert_eq!(outcome.type_name, "Post");
        assert_eq!(outcome.document.id(), "p1");
    }

    #[test]
    fn test_from_value_missing_id() {
        let err = MutationOutcome::from_value(json!({
            "kind": "create",
            "typeName": "Post",
            "document": {"title": "untitled"}
        }))
        .unwrap_err();
        assert_eq!(err, CacheError::MissingId);
    }

    #[test]
    fn test_from_value_bad_kind() {
        let err = MutationOutcome::from_value(json!({
            "kind": "upsert",
            "typeName": "Post",
            "document": {"_id": "p1"}
        }))
        .unwrap_err();
        assert!(matches!(err, CacheError::InvalidOutcome(_)));
    }

    #[test]
    fn test_typename_mismatch_rejected() {
        let err = MutationOutcome::from_value(json!({
            "kind": "delete",
            "typeName": "Post",
            "document": {"_id": "c1", "__typename": "Comment"}
        }))
        .unwrap_err();
        assert_eq!(err.code(), "AERO_CACHE_INVALID_OUTCOME");
    }

    #[test]
    fn test_empty_type_name_rejected() {
        let doc = Document::from_value(json!({"_id": "p1"})).unwrap();
        assert!(MutationOutcome::update("", doc).validate().is_err());
    }

    #[test]
    fn test_kind_display() {
        assert_eq!(MutationKind::Create.to_string(), "create");
        assert_eq!(serde_json::to_value(MutationKind::Delete).unwrap(), json!("delete"));
    }
}
