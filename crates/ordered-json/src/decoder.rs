//! JSON decoder that rebuilds key order.
//!
//! The token stream comes from serde_json's streaming deserializer: `next_key`
//! either yields the next (unescaped) key or reports the end of the object,
//! and `deserialize_any` dispatches on the kind of the next token. String
//! contents are never inspected here, so braces, brackets, colons and escaped
//! quotes inside keys or values cannot desynchronize the decoder.
//!
//! Every nested object becomes an [`OrderedMap`] and every array a
//! [`Value::Sequence`], at any depth. A key seen twice in one object keeps the
//! value *and* the position of its last occurrence.

use std::fmt;
use std::io;
use std::str::FromStr;

use serde::de::{self, Deserialize, DeserializeSeed, Deserializer, MapAccess, SeqAccess, Visitor};

use crate::error::{Error, Result};
use crate::map::OrderedMap;
use crate::pair::Pair;
use crate::value::{Number, Value};

/// Decoder configuration.
///
/// `escape_html` is stamped on every decoded map, nested ones included, and
/// later drives [`OrderedMap::to_json`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Decoder {
    pub escape_html: bool,
}

impl Default for Decoder {
    fn default() -> Self {
        Self::new()
    }
}

impl Decoder {
    pub fn new() -> Self {
        Self { escape_html: true }
    }

    pub fn escape_html(mut self, escape_html: bool) -> Self {
        self.escape_html = escape_html;
        self
    }

    /// Decodes a top-level JSON object.
    pub fn decode_str(&self, input: &str) -> Result<OrderedMap> {
        let mut de = serde_json::Deserializer::from_str(input);
        run(&mut de, self.map_seed())
    }

    pub fn decode_slice(&self, input: &[u8]) -> Result<OrderedMap> {
        let mut de = serde_json::Deserializer::from_slice(input);
        run(&mut de, self.map_seed())
    }

    /// The reader is wrapped in a `BufReader`, so raw files and sockets are fine.
    pub fn decode_reader<R: io::Read>(&self, reader: R) -> Result<OrderedMap> {
        let mut de = serde_json::Deserializer::from_reader(io::BufReader::new(reader));
        run(&mut de, self.map_seed())
    }

    /// Decodes any top-level JSON value.
    pub fn decode_value_str(&self, input: &str) -> Result<Value> {
        let mut de = serde_json::Deserializer::from_str(input);
        run(&mut de, ValueSeed {
            escape_html: self.escape_html,
        })
    }

    fn map_seed(&self) -> MapSeed {
        MapSeed {
            escape_html: self.escape_html,
        }
    }
}

fn run<'de, R, S>(de: &mut serde_json::Deserializer<R>, seed: S) -> Result<S::Value>
where
    R: serde_json::de::Read<'de>,
    S: DeserializeSeed<'de>,
{
    let value = seed.deserialize(&mut *de).map_err(Error::from_decode)?;
    de.end().map_err(Error::from_decode)?;
    Ok(value)
}

impl OrderedMap {
    /// Decodes a JSON object with default options.
    pub fn from_json(input: &str) -> Result<Self> {
        Decoder::new().decode_str(input)
    }
}

impl FromStr for OrderedMap {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        OrderedMap::from_json(s)
    }
}

#[derive(Clone, Copy)]
struct MapSeed {
    escape_html: bool,
}

impl<'de> DeserializeSeed<'de> for MapSeed {
    type Value = OrderedMap;

    fn deserialize<D: Deserializer<'de>>(self, deserializer: D) -> Result<OrderedMap, D::Error> {
        deserializer.deserialize_map(MapVisitor {
            escape_html: self.escape_html,
        })
    }
}

struct MapVisitor {
    escape_html: bool,
}

impl<'de> Visitor<'de> for MapVisitor {
    type Value = OrderedMap;

    fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("a JSON object")
    }

    fn visit_map<A: MapAccess<'de>>(self, mut access: A) -> Result<OrderedMap, A::Error> {
        let seed = ValueSeed {
            escape_html: self.escape_html,
        };
        // Repeated keys are resolved once the object closes, not per entry.
        let mut pairs = Vec::with_capacity(access.size_hint().unwrap_or(0));
        while let Some(key) = access.next_key::<String>()? {
            let value = access.next_value_seed(seed)?;
            pairs.push(Pair::new(key, value));
        }
        Ok(OrderedMap::from_decoded(pairs, self.escape_html))
    }
}

#[derive(Clone, Copy)]
struct ValueSeed {
    escape_html: bool,
}

impl<'de> DeserializeSeed<'de> for ValueSeed {
    type Value = Value;

    fn deserialize<D: Deserializer<'de>>(self, deserializer: D) -> Result<Value, D::Error> {
        deserializer.deserialize_any(ValueVisitor {
            escape_html: self.escape_html,
        })
    }
}

struct ValueVisitor {
    escape_html: bool,
}

impl<'de> Visitor<'de> for ValueVisitor {
    type Value = Value;

    fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("any JSON value")
    }

    fn visit_unit<E: de::Error>(self) -> Result<Value, E> {
        Ok(Value::Null)
    }

    fn visit_none<E: de::Error>(self) -> Result<Value, E> {
        Ok(Value::Null)
    }

    fn visit_some<D: Deserializer<'de>>(self, deserializer: D) -> Result<Value, D::Error> {
        ValueSeed {
            escape_html: self.escape_html,
        }
        .deserialize(deserializer)
    }

    fn visit_bool<E: de::Error>(self, b: bool) -> Result<Value, E> {
        Ok(Value::Bool(b))
    }

    fn visit_i64<E: de::Error>(self, n: i64) -> Result<Value, E> {
        Ok(Value::Number(Number::Integer(n)))
    }

    fn visit_u64<E: de::Error>(self, n: u64) -> Result<Value, E> {
        Ok(Value::Number(Number::UInteger(n)))
    }

    fn visit_f64<E: de::Error>(self, f: f64) -> Result<Value, E> {
        Ok(Value::Number(Number::Float(f)))
    }

    fn visit_str<E: de::Error>(self, s: &str) -> Result<Value, E> {
        Ok(Value::String(s.to_owned()))
    }

    fn visit_string<E: de::Error>(self, s: String) -> Result<Value, E> {
        Ok(Value::String(s))
    }

    fn visit_seq<A: SeqAccess<'de>>(self, mut access: A) -> Result<Value, A::Error> {
        let seed = ValueSeed {
            escape_html: self.escape_html,
        };
        let mut items = Vec::with_capacity(access.size_hint().unwrap_or(0));
        while let Some(item) = access.next_element_seed(seed)? {
            items.push(item);
        }
        Ok(Value::Sequence(items))
    }

    fn visit_map<A: MapAccess<'de>>(self, access: A) -> Result<Value, A::Error> {
        MapVisitor {
            escape_html: self.escape_html,
        }
        .visit_map(access)
        .map(Value::Map)
    }
}

impl<'de> Deserialize<'de> for OrderedMap {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        MapSeed { escape_html: true }.deserialize(deserializer)
    }
}

impl<'de> Deserialize<'de> for Value {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        ValueSeed { escape_html: true }.deserialize(deserializer)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn keys_in_document_order() {
        let m = OrderedMap::from_json(r#"{"z":1,"a":2,"m":3}"#).unwrap();
        assert_eq!(m.keys(), ["z", "a", "m"]);
    }

    #[test]
    fn duplicate_key_takes_last_value_and_position() {
        let m = OrderedMap::from_json(r#"{"a":1,"b":2,"a":3}"#).unwrap();
        assert_eq!(m.keys(), ["b", "a"]);
        assert_eq!(m.get("a"), Some(&Value::from(3)));
    }

    #[test]
    fn nested_objects_become_maps() {
        let m = OrderedMap::from_json(r#"{"x":{"y":[{"z":1},2]}}"#).unwrap();
        let y = m
            .get("x")
            .and_then(Value::as_map)
            .and_then(|x| x.get("y"))
            .and_then(Value::as_sequence)
            .unwrap();
        assert_eq!(y[0].as_map().unwrap().keys(), ["z"]);
        assert_eq!(y[1], Value::from(2));
    }

    #[test]
    fn numbers_keep_integer_precision() {
        let m = OrderedMap::from_json(r#"{"big":18446744073709551615,"neg":-9007199254740993,"f":0.5}"#)
            .unwrap();
        assert_eq!(m.get("big"), Some(&Value::Number(Number::UInteger(u64::MAX))));
        assert_eq!(m.get("neg").and_then(Value::as_i64), Some(-9_007_199_254_740_993));
        assert_eq!(m.get("f").and_then(Value::as_f64), Some(0.5));
    }

    #[test]
    fn top_level_array_is_type_mismatch() {
        let err = OrderedMap::from_json("[1,2]").unwrap_err();
        assert!(matches!(err, Error::TypeMismatch { .. }), "{err:?}");
    }

    #[test]
    fn truncated_object_is_malformed() {
        for input in [r#"{"a":1"#, r#"{"a" 1}"#, r#"{"a":tru}"#, r#"{"a":"\q"}"#, "{} x"] {
            let err = OrderedMap::from_json(input).unwrap_err();
            assert!(matches!(err, Error::MalformedInput { .. }), "{input}: {err:?}");
        }
    }

    #[test]
    fn escape_flag_reaches_nested_maps() {
        let m = Decoder::new()
            .escape_html(false)
            .decode_str(r#"{"a":{"b":[{"c":1}]}}"#)
            .unwrap();
        assert!(!m.escape_html());
        let a = m.get("a").and_then(Value::as_map).unwrap();
        assert!(!a.escape_html());
        let c = a.get("b").and_then(Value::as_sequence).unwrap()[0]
            .as_map()
            .unwrap();
        assert!(!c.escape_html());
    }

    #[test]
    fn decode_any_value() {
        let v = Decoder::new().decode_value_str(r#"[null, true, "s"]"#).unwrap();
        assert_eq!(
            v,
            Value::Sequence(vec![Value::Null, Value::Bool(true), Value::from("s")])
        );
    }

    #[test]
    fn from_str_and_reader() {
        let m: OrderedMap = r#"{"b":1,"a":2}"#.parse().unwrap();
        let r = Decoder::new().decode_reader(r#"{"b":1,"a":2}"#.as_bytes()).unwrap();
        assert_eq!(m, r);
    }
}
