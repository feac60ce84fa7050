//! Selector AST
//!
//! A selector is a tree of logical connectives over per-field operator
//! lists. Anything the parser cannot express becomes `Unsupported`, which
//! evaluates as an error (and therefore as a non-match).

use regex::Regex;
use serde_json::Value;

/// A compiled `$regex` pattern
#[derive(Debug, Clone)]
pub struct Pattern(Regex);

impl Pattern {
    pub fn new(regex: Regex) -> Self {
        Self(regex)
    }

    pub fn is_match(&self, haystack: &str) -> bool {
        self.0.is_match(haystack)
    }

    pub fn as_str(&self) -> &str {
        self.0.as_str()
    }
}

impl PartialEq for Pattern {
    fn eq(&self, other: &Self) -> bool {
        self.as_str() == other.as_str()
    }
}

/// A single operator applied to the value at a field path
#[derive(Debug, Clone, PartialEq)]
pub enum FieldOp {
    /// `{field: value}` or `$eq`
    Eq(Value),
    /// `$ne`
    Ne(Value),
    /// `$gt`
    Gt(Value),
    /// `$gte`
    Gte(Value),
    /// `$lt`
    Lt(Value),
    /// `$lte`
    Lte(Value),
    /// `$in`
    In(Vec<Value>),
    /// `$nin`
    Nin(Vec<Value>),
    /// `$exists`
    Exists(bool),
    /// `$regex` (with `$options`)
    Regex(Pattern),
    /// `$not`: none of the wrapped operators hold together
    Not(Vec<FieldOp>),
}

/// Filter expression tree
#[derive(Debug, Clone, PartialEq)]
pub enum Selector {
    /// Matches every document (`{}`)
    All,
    /// All operators hold for the value at `path`
    Field { path: String, ops: Vec<FieldOp> },
    /// Conjunction
    And(Vec<Selector>),
    /// Disjunction
    Or(Vec<Selector>),
    /// None of the clauses hold
    Nor(Vec<Selector>),
    /// A shape outside the supported subset
    Unsupported { reason: String },
}

impl Selector {
    /// Equality on one field
    pub fn eq(path: impl Into<String>, value: Value) -> Self {
        Self::field(path, FieldOp::Eq(value))
    }

    /// Inequality on one field
    pub fn ne(path: impl Into<String>, value: Value) -> Self {
        Self::field(path, FieldOp::Ne(value))
    }

    /// Set membership on one field
    pub fn in_list(path: impl Into<String>, values: Vec<Value>) -> Self {
        Self::field(path, FieldOp::In(values))
    }

    /// Existence check on one field
    pub fn exists(path: impl Into<String>, exists: bool) -> Self {
        Self::field(path, FieldOp::Exists(exists))
    }

    /// Single-operator field predicate
    pub fn field(path: impl Into<String>, op: FieldOp) -> Self {
        Selector::Field {
            path: path.into(),
            ops: vec![op],
        }
    }

    /// Marks a shape the evaluator cannot handle
    pub fn unsupported(reason: impl Into<String>) -> Self {
        Selector::Unsupported {
            reason: reason.into(),
        }
    }

    /// Conjunction with another selector, flattening nested `And`s
    pub fn and(self, other: Selector) -> Self {
        match (self, other) {
            (Selector::All, other) => other,
            (this, Selector::All) => this,
            (Selector::And(mut left), Selector::And(right)) => {
                left.extend(right);
                Selector::And(left)
            }
            (Selector::And(mut left), other) => {
                left.push(other);
                Selector::And(left)
            }
            (this, other) => Selector::And(vec![this, other]),
        }
    }

    /// Returns the first unsupported node, if any
    pub fn first_unsupported(&self) -> Option<&str> {
        match self {
            Selector::Unsupported { reason } => Some(reason),
            Selector::And(clauses) | Selector::Or(clauses) | Selector::Nor(clauses) => {
                clauses.iter().find_map(Selector::first_unsupported)
            }
            Selector::All | Selector::Field { .. } => None,
        }
    }
}

impl Default for Selector {
    fn default() -> Self {
        Selector::All
    }
}
