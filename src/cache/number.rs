//! JSON number ordering
//!
//! Integers compare exactly, so values above 2^53 stay distinct. Only a
//! float on either side falls back to `f64`.

use std::cmp::Ordering;

use serde_json::Number;

/// Total order over JSON numbers; `1` and `1.0` are equal
pub fn compare_numbers(a: &Number, b: &Number) -> Ordering {
    match (as_integer(a), as_integer(b)) {
        (Some(x), Some(y)) => x.cmp(&y),
        _ => as_float(a).total_cmp(&as_float(b)),
    }
}

fn as_integer(n: &Number) -> Option<i128> {
    n.as_i64()
        .map(i128::from)
        .or_else(|| n.as_u64().map(i128::from))
}

fn as_float(n: &Number) -> f64 {
    // Without arbitrary precision every Number has an f64 view
    n.as_f64().unwrap_or(f64::NAN)
}
