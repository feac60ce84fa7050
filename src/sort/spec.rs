//! Sort specifications
//!
//! An ordered list of `(field path, direction)` pairs, most significant
//! first. An empty spec leaves the current order alone.

use serde_json::Value;

use crate::errors::{CacheError, CacheResult};

/// Sort direction
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortDirection {
    Asc,
    Desc,
}

impl SortDirection {
    pub fn as_str(&self) -> &'static str {
        match self {
            SortDirection::Asc => "asc",
            SortDirection::Desc => "desc",
        }
    }

    fn from_json(value: &Value) -> Option<Self> {
        match value {
            // JS clients send `-1.0` as readily as `-1`
            Value::Number(n) => match n.as_f64() {
                Some(d) if d == 1.0 => Some(SortDirection::Asc),
                Some(d) if d == -1.0 => Some(SortDirection::Desc),
                _ => None,
            },
            Value::String(s) => match s.to_ascii_lowercase().as_str() {
                "asc" | "ascending" => Some(SortDirection::Asc),
                "desc" | "descending" => Some(SortDirection::Desc),
                _ => None,
            },
            _ => None,
        }
    }
}

/// One sort key
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SortField {
    /// Dotted field path
    pub path: String,
    /// Sort direction
    pub direction: SortDirection,
}

/// Sort specification
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SortSpec {
    fields: Vec<SortField>,
}

impl SortSpec {
    /// Spec that keeps the current order
    pub fn none() -> Self {
        Self::default()
    }

    pub fn asc(path: impl Into<String>) -> Self {
        Self::none().then_asc(path)
    }

    pub fn desc(path: impl Into<String>) -> Self {
        Self::none().then_desc(path)
    }

    /// Appends a less significant ascending key
    pub fn then_asc(mut self, path: impl Into<String>) -> Self {
        self.fields.push(SortField {
            path: path.into(),
            direction: SortDirection::Asc,
        });
        self
    }

    /// Appends a less significant descending key
    pub fn then_desc(mut self, path: impl Into<String>) -> Self {
        self.fields.push(SortField {
            path: path.into(),
            direction: SortDirection::Desc,
        });
        self
    }

    pub fn fields(&self) -> &[SortField] {
        &self.fields
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// Parses `{"createdAt": -1, "_id": 1}` (key order is precedence) or
    /// `[["createdAt", -1], ["_id", 1]]`. `null` means no sort.
    pub fn from_json(value: &Value) -> CacheResult<SortSpec> {
        let pairs: Vec<(&str, &Value)> = match value {
            Value::Null => return Ok(SortSpec::none()),
            Value::Object(map) => map.iter().map(|(k, v)| (k.as_str(), v)).collect(),
            Value::Array(items) => items
                .iter()
                .map(|item| match item.as_array().map(Vec::as_slice) {
                    Some([Value::String(path), direction]) => Ok((path.as_str(), direction)),
                    _ => Err(CacheError::InvalidSortSpec(format!(
                        "expected [path, direction], got {}",
                        item
                    ))),
                })
                .collect::<CacheResult<_>>()?,
            other => {
                return Err(CacheError::InvalidSortSpec(format!(
                    "expected object or array, got {}",
                    other
                )))
            }
        };

        let mut spec = SortSpec::none();
        for (path, direction) in pairs {
            if path.is_empty() || path.split('.').any(str::is_empty) {
                return Err(CacheError::InvalidSortSpec(format!(
                    "invalid field path {:?}",
                    path
                )));
            }
            let direction = SortDirection::from_json(direction).ok_or_else(|| {
                CacheError::InvalidSortSpec(format!("invalid direction {} for {}", direction, path))
            })?;
            spec.fields.push(SortField {
                path: path.to_string(),
                direction,
            });
        }
        Ok(spec)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_object_keeps_key_precedence() {
        let spec = SortSpec::from_json(&json!({"score": -1, "createdAt": 1})).unwrap();
        assert_eq!(spec, SortSpec::desc("score").then_asc("createdAt"));
    }

    #[test]
    fn test_array_form() {
        let spec = SortSpec::from_json(&json!([["createdAt", "desc"], ["_id", 1]])).unwrap();
        assert_eq!(spec, SortSpec::desc("createdAt").then_asc("_id"));
    }

    #[test]
    fn test_integral_float_directions() {
        let spec = SortSpec::from_json(&json!({"score": -1.0, "createdAt": 1.0})).unwrap();
        assert_eq!(spec, SortSpec::desc("score").then_asc("createdAt"));
        assert!(SortSpec::from_json(&json!({"score": 0.5})).is_err());
    }

    #[test]
    fn test_null_is_no_sort() {
        assert!(SortSpec::from_json(&Value::Null).unwrap().is_empty());
    }

    #[test]
    fn test_rejects_bad_direction() {
        let err = SortSpec::from_json(&json!({"score": 2})).unwrap_err();
        assert!(matches!(err, CacheError::InvalidSortSpec(_)));
    }

    #[test]
    fn test_rejects_bad_shapes() {
        assert!(SortSpec::from_json(&json!("score")).is_err());
        assert!(SortSpec::from_json(&json!([["score"]])).is_err());
        assert!(SortSpec::from_json(&json!({"": 1})).is_err());
    }
}
