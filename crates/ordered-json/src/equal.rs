//! Order-insensitive deep equality for [`Value`] trees.
//!
//! `PartialEq` on [`OrderedMap`] compares key order too; [`deep_equal`]
//! answers the document-level question "do these two encode the same data"
//! by comparing maps through key lookup.

use crate::map::OrderedMap;
use crate::value::Value;

/// Structural equality with maps compared by key, sequences element-wise and
/// numbers numerically.
pub fn deep_equal(a: &Value, b: &Value) -> bool {
    match (a, b) {
        (Value::Null, Value::Null) => true,
        (Value::Bool(a), Value::Bool(b)) => a == b,
        (Value::Number(a), Value::Number(b)) => a == b,
        (Value::String(a), Value::String(b)) => a == b,
        (Value::Sequence(a), Value::Sequence(b)) => {
            a.len() == b.len() && a.iter().zip(b).all(|(x, y)| deep_equal(x, y))
        }
        (Value::Map(a), Value::Map(b)) => maps_equal(a, b),
        // Different types are never equal
        _ => false,
    }
}

pub(crate) fn maps_equal(a: &OrderedMap, b: &OrderedMap) -> bool {
    if a.len() != b.len() {
        return false;
    }
    for (key, val_a) in a {
        match b.get(key) {
            Some(val_b) => {
                if !deep_equal(val_a, val_b) {
                    return false;
                }
            }
            None => return false,
        }
    }
    true
}
