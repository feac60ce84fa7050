//! Cached list-query payloads

use serde::{Deserialize, Serialize};

use super::document::Document;

/// The `{results, totalCount}` body of a cached list query
///
/// `results` is unique by `_id` and held in the query's sort order.
/// `total_count` is maintained independently of `results.len()`, because
/// `results` may be a single page of a larger matching set.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CachedQueryPayload {
    pub results: Vec<Document>,
    #[serde(default)]
    pub total_count: u64,
}

impl CachedQueryPayload {
    /// Creates a payload whose count equals the number of results
    pub fn new(results: Vec<Document>) -> Self {
        let total_count = results.len() as u64;
        Self {
            results,
            total_count,
        }
    }

    /// Creates a payload with an explicit server-side count
    pub fn with_total(results: Vec<Document>, total_count: u64) -> Self {
        Self {
            results,
            total_count,
        }
    }

    /// Identifiers of `results`, in order
    pub fn ids(&self) -> Vec<&str> {
        self.results.iter().map(Document::id).collect()
    }

    /// Looks up a cached entry by identifier
    pub fn get(&self, id: &str) -> Option<&Document> {
        self.results.iter().find(|doc| doc.id() == id)
    }

    pub fn len(&self) -> usize {
        self.results.len()
    }

    pub fn is_empty(&self) -> bool {
        self.results.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn doc(id: &str) -> Document {
        Document::from_value(json!({"_id": id})).unwrap()
    }

    #[test]
    fn test_new_counts_results() {
        let payload = CachedQueryPayload::new(vec![doc("a"), doc("b")]);
        assert_eq!(payload.total_count, 2);
        assert_eq!(payload.ids(), vec!["a", "b"]);
    }

    #[test]
    fn test_wire_format_is_camel_case() {
        let payload = CachedQueryPayload::with_total(vec![doc("a")], 40);
        let json = serde_json::to_value(&payload).unwrap();
        assert_eq!(json["totalCount"], 40);
        assert_eq!(json["results"][0]["_id"], "a");

        let back: CachedQueryPayload = serde_json::from_value(json).unwrap();
        assert_eq!(back, payload);
    }
}
