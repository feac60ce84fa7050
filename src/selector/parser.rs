//! Mongo-style selector parsing
//!
//! `Selector::from_json` is total: every input produces a selector. Shapes
//! outside the supported subset become `Selector::Unsupported` so that
//! evaluation fails closed instead of guessing.

use regex::RegexBuilder;
use serde_json::{Map, Value};

use super::ast::{FieldOp, Pattern, Selector};

impl Selector {
    /// Parses a selector object such as
    /// `{"status": "open", "score": {"$gte": 10}, "$or": [...]}`
    pub fn from_json(value: &Value) -> Selector {
        match value {
            Value::Object(map) => parse_document(map),
            Value::Null => Selector::All,
            other => Selector::unsupported(format!("selector must be an object, got {}", other)),
        }
    }
}

fn parse_document(map: &Map<String, Value>) -> Selector {
    let mut clauses = Vec::with_capacity(map.len());

    for (key, value) in map {
        let clause = match key.as_str() {
            "$and" => parse_logical("$and", value).map(Selector::And),
            "$or" => parse_logical("$or", value).map(Selector::Or),
            "$nor" => parse_logical("$nor", value).map(Selector::Nor),
            op if op.starts_with('$') => Err(format!("unknown top-level operator {}", op)),
            path => parse_field(path, value),
        };

        clauses.push(clause.unwrap_or_else(Selector::unsupported));
    }

    match clauses.len() {
        0 => Selector::All,
        1 => clauses.pop().unwrap_or(Selector::All),
        _ => Selector::And(clauses),
    }
}

fn parse_logical(op: &str, value: &Value) -> Result<Vec<Selector>, String> {
    let items = value
        .as_array()
        .ok_or_else(|| format!("{} expects an array", op))?;
    if items.is_empty() {
        return Err(format!("{} expects a non-empty array", op));
    }

    items
        .iter()
        .map(|item| match item {
            Value::Object(map) => Ok(parse_document(map)),
            other => Err(format!("{} operands must be objects, got {}", op, other)),
        })
        .collect()
}

fn parse_field(path: &str, value: &Value) -> Result<Selector, String> {
    if path.is_empty() || path.split('.').any(str::is_empty) {
        return Err(format!("invalid field path {:?}", path));
    }

    let ops = match value {
        Value::Object(map) => {
            if is_operator_object(map)? {
                parse_operators(map)?
            } else {
                vec![FieldOp::Eq(value.clone())]
            }
        }
        literal => vec![FieldOp::Eq(literal.clone())],
    };

    Ok(Selector::Field {
        path: path.to_string(),
        ops,
    })
}

/// An object is an operator list if its keys are all `$`-prefixed; a mix of
/// operators and plain keys is rejected.
fn is_operator_object(map: &Map<String, Value>) -> Result<bool, String> {
    let operator_keys = map.keys().filter(|k| k.starts_with('$')).count();
    if operator_keys == 0 {
        return Ok(false);
    }
    if operator_keys != map.len() {
        return Err("cannot mix operators and literal fields".to_string());
    }
    Ok(true)
}

fn parse_operators(map: &Map<String, Value>) -> Result<Vec<FieldOp>, String> {
    let mut ops = Vec::with_capacity(map.len());

    for (op, operand) in map {
        let parsed = match op.as_str() {
            "$eq" => FieldOp::Eq(operand.clone()),
            "$ne" => FieldOp::Ne(operand.clone()),
            "$gt" => FieldOp::Gt(operand.clone()),
            "$gte" => FieldOp::Gte(operand.clone()),
            "$lt" => FieldOp::Lt(operand.clone()),
            "$lte" => FieldOp::Lte(operand.clone()),
            "$in" => FieldOp::In(expect_array(op, operand)?),
            "$nin" => FieldOp::Nin(expect_array(op, operand)?),
            "$exists" => FieldOp::Exists(truthy(operand)),
            "$regex" => FieldOp::Regex(compile_regex(operand, map.get("$options"))?),
            "$options" if map.contains_key("$regex") => continue,
            "$not" => FieldOp::Not(parse_negated(operand)?),
            other => return Err(format!("unknown operator {}", other)),
        };
        ops.push(parsed);
    }

    Ok(ops)
}

fn parse_negated(operand: &Value) -> Result<Vec<FieldOp>, String> {
    match operand {
        Value::Object(inner) if !inner.is_empty() => {
            if is_operator_object(inner)? {
                parse_operators(inner)
            } else {
                Err("$not expects an operator object".to_string())
            }
        }
        _ => Err("$not expects an operator object".to_string()),
    }
}

fn expect_array(op: &str, operand: &Value) -> Result<Vec<Value>, String> {
    operand
        .as_array()
        .cloned()
        .ok_or_else(|| format!("{} expects an array", op))
}

fn truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().map(|f| f != 0.0).unwrap_or(true),
        _ => true,
    }
}

fn compile_regex(pattern: &Value, options: Option<&Value>) -> Result<Pattern, String> {
    let source = pattern
        .as_str()
        .ok_or_else(|| "$regex expects a string".to_string())?;
    let flags = match options {
        None => "",
        Some(Value::String(flags)) => flags.as_str(),
        Some(_) => return Err("$options expects a string".to_string()),
    };

    let mut builder = RegexBuilder::new(source);
    for flag in flags.chars() {
        match flag {
            'i' => builder.case_insensitive(true),
            'm' => builder.multi_line(true),
            's' => builder.dot_matches_new_line(true),
            'x' => builder.ignore_whitespace(true),
            other => return Err(format!("unsupported $options flag {:?}", other)),
        };
    }

    builder
        .build()
        .map(Pattern::new)
        .map_err(|e| format!("invalid $regex: {}", e))
}
