//! Selector evaluation
//!
//! No type coercion: numbers compare with numbers, strings with strings,
//! booleans with booleans. Cross-type ordering comparisons never match.
//! Array-valued fields match `Eq`, `In`, `Regex` and ordering operators if
//! any element does.

use std::cmp::Ordering;

use serde_json::Value;

use super::ast::{FieldOp, Selector};
use super::errors::{SelectorError, SelectorResult};
use crate::cache::{compare_numbers, Document};

impl Selector {
    /// Evaluates this selector against a document
    ///
    /// Any unsupported node anywhere in the tree is an error, even if
    /// short-circuiting would have skipped it.
    pub fn evaluate(&self, document: &Document) -> SelectorResult<bool> {
        if let Some(reason) = self.first_unsupported() {
            return Err(SelectorError::Unsupported(reason.to_string()));
        }
        self.eval(document)
    }

    fn eval(&self, document: &Document) -> SelectorResult<bool> {
        match self {
            Selector::All => Ok(true),
            Selector::Field { path, ops } => {
                let value = document.get_path(path);
                Ok(ops.iter().all(|op| op_matches(op, value)))
            }
            Selector::And(clauses) => {
                if clauses.is_empty() {
                    return Err(SelectorError::EmptyClause("$and"));
                }
                for clause in clauses {
                    if !clause.eval(document)? {
                        return Ok(false);
                    }
                }
                Ok(true)
            }
            Selector::Or(clauses) => {
                if clauses.is_empty() {
                    return Err(SelectorError::EmptyClause("$or"));
                }
                for clause in clauses {
                    if clause.eval(document)? {
                        return Ok(true);
                    }
                }
                Ok(false)
            }
            Selector::Nor(clauses) => {
                if clauses.is_empty() {
                    return Err(SelectorError::EmptyClause("$nor"));
                }
                for clause in clauses {
                    if clause.eval(document)? {
                        return Ok(false);
                    }
                }
                Ok(true)
            }
            Selector::Unsupported { reason } => Err(SelectorError::Unsupported(reason.clone())),
        }
    }
}

/// Checks one operator against the value at its path (`None` = missing)
fn op_matches(op: &FieldOp, value: Option<&Value>) -> bool {
    match op {
        FieldOp::Eq(expected) => equals(value, expected),
        FieldOp::Ne(expected) => !equals(value, expected),
        FieldOp::Gt(bound) => compares(value, bound, |o| o == Ordering::Greater),
        FieldOp::Gte(bound) => compares(value, bound, |o| o != Ordering::Less),
        FieldOp::Lt(bound) => compares(value, bound, |o| o == Ordering::Less),
        FieldOp::Lte(bound) => compares(value, bound, |o| o != Ordering::Greater),
        FieldOp::In(candidates) => candidates.iter().any(|c| equals(value, c)),
        FieldOp::Nin(candidates) => !candidates.iter().any(|c| equals(value, c)),
        FieldOp::Exists(expected) => value.is_some() == *expected,
        FieldOp::Regex(pattern) => match value {
            Some(Value::String(s)) => pattern.is_match(s),
            Some(Value::Array(items)) => items
                .iter()
                .any(|item| item.as_str().map(|s| pattern.is_match(s)).unwrap_or(false)),
            _ => false,
        },
        FieldOp::Not(inner) => !inner.iter().all(|op| op_matches(op, value)),
    }
}

/// Equality with missing-as-null and array-contains semantics
fn equals(actual: Option<&Value>, expected: &Value) -> bool {
    match actual {
        None => expected.is_null(),
        Some(Value::Array(items)) if !expected.is_array() => {
            items.iter().any(|item| json_eq(item, expected))
        }
        Some(value) => json_eq(value, expected),
    }
}

/// Structural equality where `1` and `1.0` are the same number
fn json_eq(a: &Value, b: &Value) -> bool {
    match (a, b) {
        (Value::Number(x), Value::Number(y)) => compare_numbers(x, y) == Ordering::Equal,
        (Value::Array(xs), Value::Array(ys)) => {
            xs.len() == ys.len() && xs.iter().zip(ys).all(|(x, y)| json_eq(x, y))
        }
        (Value::Object(xs), Value::Object(ys)) => {
            xs.len() == ys.len()
                && xs
                    .iter()
                    .all(|(k, x)| ys.get(k).map(|y| json_eq(x, y)).unwrap_or(false))
        }
        _ => a == b,
    }
}

fn compares(actual: Option<&Value>, bound: &Value, accept: impl Fn(Ordering) -> bool) -> bool {
    match actual {
        None => false,
        Some(Value::Array(items)) => items
            .iter()
            .any(|item| compare_scalar(item, bound).map(&accept).unwrap_or(false)),
        Some(value) => compare_scalar(value, bound).map(accept).unwrap_or(false),
    }
}

/// Same-type ordering; `None` for incomparable pairs
fn compare_scalar(a: &Value, b: &Value) -> Option<Ordering> {
    match (a, b) {
        (Value::Number(x), Value::Number(y)) => Some(compare_numbers(x, y)),
        (Value::String(x), Value::String(y)) => Some(x.cmp(y)),
        (Value::Bool(x), Value::Bool(y)) => Some(x.cmp(y)),
        _ => None,
    }
}
