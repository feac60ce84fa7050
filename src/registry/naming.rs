//! Canonical list-query names
//!
//! A type `Post` is listed by the operation `multiPostQuery`, which resolves
//! the field `posts`.

use serde::{Deserialize, Serialize};

/// How list-query operation names are built from a type name
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ListQueryNaming {
    pub prefix: String,
    pub suffix: String,
}

impl Default for ListQueryNaming {
    fn default() -> Self {
        Self {
            prefix: "multi".to_string(),
            suffix: "Query".to_string(),
        }
    }
}

impl ListQueryNaming {
    /// Operation name of the list query for `type_name`
    pub fn query_name(&self, type_name: &str) -> String {
        format!("{}{}{}", self.prefix, type_name, self.suffix)
    }
}

/// Resolver field of the list query: camel-cased plural of the type name
pub fn list_resolver_name(type_name: &str) -> String {
    camel_case(&pluralize(type_name))
}

fn pluralize(word: &str) -> String {
    let lower = word.to_ascii_lowercase();
    let consonant_y = lower.ends_with('y')
        && !matches!(
            lower.chars().rev().nth(1),
            Some('a' | 'e' | 'i' | 'o' | 'u') | None
        );

    if consonant_y {
        format!("{}ies", &word[..word.len() - 1])
    } else if ["s", "x", "z", "ch", "sh"].iter().any(|end| lower.ends_with(end)) {
        format!("{}es", word)
    } else {
        format!("{}s", word)
    }
}

fn camel_case(word: &str) -> String {
    let mut chars = word.chars();
    match chars.next() {
        Some(first) => first.to_lowercase().chain(chars).collect(),
        None => String::new(),
    }
}
