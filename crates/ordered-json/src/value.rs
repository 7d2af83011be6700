//! [`Value`]: the tagged union stored in every pair of an [`OrderedMap`].

use std::fmt;

use crate::map::OrderedMap;

/// A numeric scalar.
///
/// Integers keep their exact 64-bit representation; everything else is an
/// `f64`. Equality is numeric across variants.
#[derive(Debug, Clone, Copy)]
pub enum Number {
    Integer(i64),
    UInteger(u64),
    Float(f64),
}

impl Number {
    pub fn as_f64(&self) -> f64 {
        match *self {
            Number::Integer(n) => n as f64,
            Number::UInteger(n) => n as f64,
            Number::Float(f) => f,
        }
    }

    pub fn as_i64(&self) -> Option<i64> {
        match *self {
            Number::Integer(n) => Some(n),
            Number::UInteger(n) => i64::try_from(n).ok(),
            Number::Float(_) => None,
        }
    }

    pub fn as_u64(&self) -> Option<u64> {
        match *self {
            Number::Integer(n) => u64::try_from(n).ok(),
            Number::UInteger(n) => Some(n),
            Number::Float(_) => None,
        }
    }

    /// `false` only for NaN and the infinities, which the format cannot hold.
    pub fn is_finite(&self) -> bool {
        match *self {
            Number::Float(f) => f.is_finite(),
            _ => true,
        }
    }
}

impl PartialEq for Number {
    fn eq(&self, other: &Self) -> bool {
        match (*self, *other) {
            (Number::Integer(a), Number::Integer(b)) => a == b,
            (Number::UInteger(a), Number::UInteger(b)) => a == b,
            (Number::Integer(a), Number::UInteger(b)) | (Number::UInteger(b), Number::Integer(a)) => {
                i128::from(a) == i128::from(b)
            }
            (Number::Float(a), Number::Float(b)) => a == b,
            (Number::Float(f), Number::Integer(n)) | (Number::Integer(n), Number::Float(f)) => {
                float_is_integer(f, i128::from(n))
            }
            (Number::Float(f), Number::UInteger(n)) | (Number::UInteger(n), Number::Float(f)) => {
                float_is_integer(f, i128::from(n))
            }
        }
    }
}

/// Exact comparison: `f` must be whole and denote exactly `n`. Every `i64`
/// and `u64` fits in `i128`, and `as` saturates, so no out-of-range float can
/// land on a valid integer.
fn float_is_integer(f: f64, n: i128) -> bool {
    f.fract() == 0.0 && f as i128 == n
}

impl fmt::Display for Number {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Number::Integer(n) => write!(f, "{n}"),
            Number::UInteger(n) => write!(f, "{n}"),
            Number::Float(x) => write!(f, "{x}"),
        }
    }
}

/// A value held by an [`OrderedMap`] pair or a sequence element.
///
/// Objects are always [`Value::Map`] and arrays always [`Value::Sequence`], at
/// any depth.
#[derive(Debug, Clone, PartialEq, Default)]
pub enum Value {
    #[default]
    Null,
    Bool(bool),
    Number(Number),
    String(String),
    Map(OrderedMap),
    Sequence(Vec<Value>),
}

impl Value {
    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Value::Bool(b) => Some(*b),
            _ => None,
        }
    }

    pub fn as_number(&self) -> Option<Number> {
        match self {
            Value::Number(n) => Some(*n),
            _ => None,
        }
    }

    pub fn as_f64(&self) -> Option<f64> {
        self.as_number().map(|n| n.as_f64())
    }

    pub fn as_i64(&self) -> Option<i64> {
        self.as_number().and_then(|n| n.as_i64())
    }

    pub fn as_u64(&self) -> Option<u64> {
        self.as_number().and_then(|n| n.as_u64())
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::String(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_map(&self) -> Option<&OrderedMap> {
        match self {
            Value::Map(m) => Some(m),
            _ => None,
        }
    }

    /// Mutable access to a nested map. Edits land in the enclosing map's
    /// storage.
    pub fn as_map_mut(&mut self) -> Option<&mut OrderedMap> {
        match self {
            Value::Map(m) => Some(m),
            _ => None,
        }
    }

    pub fn as_sequence(&self) -> Option<&[Value]> {
        match self {
            Value::Sequence(items) => Some(items),
            _ => None,
        }
    }

    pub fn as_sequence_mut(&mut self) -> Option<&mut Vec<Value>> {
        match self {
            Value::Sequence(items) => Some(items),
            _ => None,
        }
    }

    /// Recursively stamps `escape_html` on every map reachable from this value.
    pub(crate) fn propagate_escape_html(&mut self, escape_html: bool) {
        match self {
            Value::Map(m) => m.set_escape_html(escape_html),
            Value::Sequence(items) => {
                for item in items {
                    item.propagate_escape_html(escape_html);
                }
            }
            _ => {}
        }
    }
}

impl From<Number> for Value {
    fn from(n: Number) -> Self {
        Value::Number(n)
    }
}

macro_rules! from_signed {
    ($($t:ty),*) => {
        $(impl From<$t> for Value {
            fn from(n: $t) -> Self {
                Value::Number(Number::Integer(i64::from(n)))
            }
        })*
    };
}

macro_rules! from_unsigned {
    ($($t:ty),*) => {
        $(impl From<$t> for Value {
            fn from(n: $t) -> Self {
                Value::Number(Number::UInteger(u64::from(n)))
            }
        })*
    };
}

from_signed!(i8, i16, i32, i64);
from_unsigned!(u8, u16, u32, u64);

impl From<isize> for Value {
    fn from(n: isize) -> Self {
        Value::Number(Number::Integer(n as i64))
    }
}

impl From<usize> for Value {
    fn from(n: usize) -> Self {
        Value::Number(Number::UInteger(n as u64))
    }
}

impl From<f32> for Value {
    fn from(f: f32) -> Self {
        Value::Number(Number::Float(f64::from(f)))
    }
}

impl From<f64> for Value {
    fn from(f: f64) -> Self {
        Value::Number(Number::Float(f))
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Value::Bool(b)
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::String(s.to_owned())
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Value::String(s)
    }
}

impl From<OrderedMap> for Value {
    fn from(m: OrderedMap) -> Self {
        Value::Map(m)
    }
}

impl<T: Into<Value>> From<Vec<T>> for Value {
    fn from(items: Vec<T>) -> Self {
        Value::Sequence(items.into_iter().map(Into::into).collect())
    }
}

impl<T: Into<Value>> From<Option<T>> for Value {
    fn from(opt: Option<T>) -> Self {
        opt.map_or(Value::Null, Into::into)
    }
}

impl From<()> for Value {
    fn from(_: ()) -> Self {
        Value::Null
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn numbers_compare_numerically() {
        assert_eq!(Number::Integer(1), Number::UInteger(1));
        assert_eq!(Number::UInteger(4), Number::Float(4.0));
        assert_eq!(Number::Float(-2.0), Number::Integer(-2));
        assert_ne!(Number::Integer(-1), Number::UInteger(u64::MAX));
        assert_ne!(Number::Float(0.5), Number::Integer(0));
    }

    #[test]
    fn float_integer_equality_is_exact() {
        let two_53 = 9_007_199_254_740_992i64;
        assert_ne!(Number::Integer(two_53 + 1), Number::Float(two_53 as f64));
        assert_ne!(Number::Float(two_53 as f64), Number::Integer(two_53 + 1));
        assert_eq!(Number::Integer(two_53), Number::Float(two_53 as f64));
        assert_ne!(Number::UInteger(u64::MAX), Number::Float(1.8446744073709552e19));
        assert_ne!(Number::Float(f64::INFINITY), Number::UInteger(u64::MAX));
        assert_ne!(Number::Float(f64::NAN), Number::Integer(0));
        assert_eq!(Number::Float(-0.0), Number::Integer(0));
    }

    #[test]
    fn nan_is_not_finite_and_not_equal() {
        let nan = Number::Float(f64::NAN);
        assert!(!nan.is_finite());
        assert_ne!(nan, nan);
        assert!(Number::Integer(i64::MIN).is_finite());
    }

    #[test]
    fn integer_accessors_respect_range() {
        assert_eq!(Number::UInteger(u64::MAX).as_i64(), None);
        assert_eq!(Number::Integer(-3).as_u64(), None);
        assert_eq!(Number::Integer(7).as_u64(), Some(7));
        assert_eq!(Number::Float(1.0).as_i64(), None);
    }

    #[test]
    fn conversions() {
        assert_eq!(Value::from(3), Value::Number(Number::Integer(3)));
        assert_eq!(Value::from(3u8), Value::Number(Number::UInteger(3)));
        assert_eq!(Value::from("x"), Value::String("x".into()));
        assert_eq!(Value::from(None::<i32>), Value::Null);
        assert_eq!(
            Value::from(vec![1, 2]),
            Value::Sequence(vec![Value::from(1), Value::from(2)])
        );
        assert!(Value::from(()).is_null());
    }

    #[test]
    fn accessors_match_variant() {
        let v = Value::from(2.5);
        assert_eq!(v.as_f64(), Some(2.5));
        assert_eq!(v.as_str(), None);
        assert!(v.as_map().is_none());
        assert_eq!(Value::from(true).as_bool(), Some(true));
        assert_eq!(Value::from("s").as_str(), Some("s"));
    }

    #[test]
    fn display_number() {
        assert_eq!(Number::Integer(-5).to_string(), "-5");
        assert_eq!(Number::Float(0.25).to_string(), "0.25");
    }
}
