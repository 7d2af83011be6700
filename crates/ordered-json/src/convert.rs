//! Conversions between [`Value`] and `serde_json::Value`.
//!
//! serde_json is built with `preserve_order`, so object order survives in
//! both directions.

use serde_json::Value as JsonValue;

use crate::error::Error;
use crate::map::OrderedMap;
use crate::value::{Number, Value};

impl From<JsonValue> for Value {
    fn from(json: JsonValue) -> Self {
        match json {
            JsonValue::Null => Value::Null,
            JsonValue::Bool(b) => Value::Bool(b),
            JsonValue::Number(n) => Value::Number(number_from_json(&n)),
            JsonValue::String(s) => Value::String(s),
            JsonValue::Array(items) => Value::Sequence(items.into_iter().map(Value::from).collect()),
            JsonValue::Object(obj) => Value::Map(obj.into_iter().collect()),
        }
    }
}

fn number_from_json(n: &serde_json::Number) -> Number {
    if let Some(u) = n.as_u64() {
        Number::UInteger(u)
    } else if let Some(i) = n.as_i64() {
        Number::Integer(i)
    } else {
        Number::Float(n.as_f64().unwrap_or(f64::NAN))
    }
}

impl TryFrom<&Value> for JsonValue {
    type Error = Error;

    fn try_from(value: &Value) -> Result<Self, Error> {
        Ok(match value {
            Value::Null => JsonValue::Null,
            Value::Bool(b) => JsonValue::Bool(*b),
            Value::Number(Number::Integer(n)) => JsonValue::from(*n),
            Value::Number(Number::UInteger(n)) => JsonValue::from(*n),
            Value::Number(Number::Float(f)) => serde_json::Number::from_f64(*f)
                .map(JsonValue::Number)
                .ok_or_else(|| Error::UnsupportedValue(format!("non-finite float {f}")))?,
            Value::String(s) => JsonValue::String(s.clone()),
            Value::Sequence(items) => JsonValue::Array(
                items
                    .iter()
                    .map(JsonValue::try_from)
                    .collect::<Result<_, _>>()?,
            ),
            Value::Map(map) => JsonValue::try_from(map)?,
        })
    }
}

impl TryFrom<&OrderedMap> for JsonValue {
    type Error = Error;

    fn try_from(map: &OrderedMap) -> Result<Self, Error> {
        let mut obj = serde_json::Map::with_capacity(map.len());
        for (key, value) in map {
            obj.insert(key.to_owned(), JsonValue::try_from(value)?);
        }
        Ok(JsonValue::Object(obj))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn object_order_survives_both_ways() {
        let json = json!({"z": 1, "a": [true, null, {"k": "v", "b": -2}], "m": 0.5});
        let value = Value::from(json.clone());
        let map = value.as_map().unwrap();
        assert_eq!(map.keys(), ["z", "a", "m"]);
        let back = JsonValue::try_from(&value).unwrap();
        assert_eq!(back, json);
        assert_eq!(serde_json::to_string(&back).unwrap(), r#"{"z":1,"a":[true,null,{"k":"v","b":-2}],"m":0.5}"#);
    }

    #[test]
    fn non_finite_float_cannot_convert() {
        let err = JsonValue::try_from(&Value::from(vec![f64::NAN])).unwrap_err();
        assert!(matches!(err, Error::UnsupportedValue(_)));
    }
}
