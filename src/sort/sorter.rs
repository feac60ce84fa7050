//! Result sorting
//!
//! Ordering rules:
//! - missing/null < number < string < bool
//! - same type: natural ordering
//! - arrays and objects cannot be sorted on
//!
//! Sort is stable: ties keep their current relative order.

use std::cmp::Ordering;

use serde_json::{Number, Value};

use super::errors::{SortError, SortResult};
use super::spec::{SortDirection, SortSpec};
use crate::cache::{compare_numbers, Document};

/// Sorts cached documents
pub struct ResultSorter;

impl ResultSorter {
    /// Sorts documents by the given sort fields.
    ///
    /// All keys are extracted before any comparison, so a failure is
    /// reported before anything is reordered.
    pub fn sort(documents: Vec<Document>, spec: &SortSpec) -> SortResult<Vec<Document>> {
        if spec.is_empty() {
            return Ok(documents);
        }

        let keys = documents
            .iter()
            .map(|doc| Self::keys_for(doc, spec))
            .collect::<SortResult<Vec<_>>>()?;

        let mut keyed: Vec<(Vec<SortKey>, Document)> = keys.into_iter().zip(documents).collect();
        keyed.sort_by(|(a, _), (b, _)| Self::compare_keys(a, b, spec));

        Ok(keyed.into_iter().map(|(_, doc)| doc).collect())
    }

    /// Compares two documents by the given sort fields
    pub fn compare(a: &Document, b: &Document, spec: &SortSpec) -> SortResult<Ordering> {
        let a_keys = Self::keys_for(a, spec)?;
        let b_keys = Self::keys_for(b, spec)?;
        Ok(Self::compare_keys(&a_keys, &b_keys, spec))
    }

    fn keys_for(document: &Document, spec: &SortSpec) -> SortResult<Vec<SortKey>> {
        spec.fields()
            .iter()
            .map(|field| SortKey::extract(document, &field.path))
            .collect()
    }

    fn compare_keys(a: &[SortKey], b: &[SortKey], spec: &SortSpec) -> Ordering {
        for ((a_key, b_key), field) in a.iter().zip(b).zip(spec.fields()) {
            let ordering = match field.direction {
                SortDirection::Asc => a_key.order(b_key),
                SortDirection::Desc => b_key.order(a_key),
            };
            if ordering != Ordering::Equal {
                return ordering;
            }
        }
        Ordering::Equal
    }
}

/// A sortable scalar pulled out of a document
#[derive(Debug, Clone, PartialEq)]
enum SortKey {
    Null,
    Number(Number),
    String(String),
    Bool(bool),
}

impl SortKey {
    fn extract(document: &Document, path: &str) -> SortResult<SortKey> {
        match document.get_path(path) {
            None | Some(Value::Null) => Ok(SortKey::Null),
            Some(Value::Number(n)) => Ok(SortKey::Number(n.clone())),
            Some(Value::String(s)) => Ok(SortKey::String(s.clone())),
            Some(Value::Bool(b)) => Ok(SortKey::Bool(*b)),
            Some(Value::Array(_)) => Err(SortError::UnsortableValue {
                path: path.to_string(),
                document_id: document.id().to_string(),
                kind: "array",
            }),
            Some(Value::Object(_)) => Err(SortError::UnsortableValue {
                path: path.to_string(),
                document_id: document.id().to_string(),
                kind: "object",
            }),
        }
    }

    fn rank(&self) -> u8 {
        match self {
            SortKey::Null => 0,
            SortKey::Number(_) => 1,
            SortKey::String(_) => 2,
            SortKey::Bool(_) => 3,
        }
    }

    fn order(&self, other: &SortKey) -> Ordering {
        match (self, other) {
            (SortKey::Number(a), SortKey::Number(b)) => compare_numbers(a, b),
            (SortKey::String(a), SortKey::String(b)) => a.cmp(b),
            (SortKey::Bool(a), SortKey::Bool(b)) => a.cmp(b),
            _ => self.rank().cmp(&other.rank()),
        }
    }
}
