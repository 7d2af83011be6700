//! [`Properties`]: the capability set of a map-like JSON object.
//!
//! Anything that can get, set, delete and list keys in order can be encoded
//! with [`crate::Encoder::encode_properties`] and filled from JSON text with
//! [`decode_into`]. Adapter types wrapping an [`OrderedMap`] use this to stand
//! in for the map itself.

use serde::ser::{Error as _, Serialize, SerializeMap, Serializer};

use crate::decoder::Decoder;
use crate::error::Result;
use crate::map::OrderedMap;
use crate::value::Value;

pub trait Properties {
    fn get(&self, key: &str) -> Option<&Value>;

    fn set(&mut self, key: String, value: Value);

    fn delete(&mut self, key: &str);

    /// Keys in encoding order.
    fn keys(&self) -> Vec<String>;

    fn len(&self) -> usize {
        self.keys().len()
    }

    fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl Properties for OrderedMap {
    fn get(&self, key: &str) -> Option<&Value> {
        OrderedMap::get(self, key)
    }

    fn set(&mut self, key: String, value: Value) {
        OrderedMap::set(self, key, value);
    }

    fn delete(&mut self, key: &str) {
        OrderedMap::delete(self, key);
    }

    fn keys(&self) -> Vec<String> {
        OrderedMap::keys(self)
    }

    fn len(&self) -> usize {
        OrderedMap::len(self)
    }
}

/// Decodes `input` and moves every pair into `target` in document order.
///
/// Keys already present in `target` are moved to the position of their last
/// occurrence in `input`. On error `target` is left untouched.
pub fn decode_into<P: Properties + ?Sized>(target: &mut P, input: &str) -> Result<()> {
    decode_into_with(&Decoder::new(), target, input)
}

pub fn decode_into_with<P: Properties + ?Sized>(
    decoder: &Decoder,
    target: &mut P,
    input: &str,
) -> Result<()> {
    let decoded = decoder.decode_str(input)?;
    for (key, value) in decoded {
        target.delete(&key);
        target.set(key, value);
    }
    Ok(())
}

/// Serializes a [`Properties`] implementor as a JSON object.
pub(crate) struct PropertiesView<'a, P: ?Sized>(pub &'a P);

impl<P: Properties + ?Sized> Serialize for PropertiesView<'_, P> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let keys = self.0.keys();
        let mut map = serializer.serialize_map(Some(keys.len()))?;
        for key in &keys {
            let value = self.0.get(key).ok_or_else(|| {
                S::Error::custom(format_args!("key `{key}` is listed but has no value"))
            })?;
            map.serialize_entry(key, value)?;
        }
        map.end()
    }
}
