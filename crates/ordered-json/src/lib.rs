//! ordered-json - an insertion-ordered map with an order-preserving JSON codec.
//!
//! JSON objects are unordered by definition and most decoders collect them
//! into hash maps. [`OrderedMap`] keeps the order in which keys were set, and
//! the codec round-trips that order:
//!
//! - [`Encoder`] writes pairs in stored order, compact or indented, with an
//!   optional HTML-escaping policy applied to the whole document.
//! - [`Decoder`] rebuilds the order of the source text. Nested objects become
//!   nested maps and arrays become [`Value::Sequence`], at any depth. A key
//!   repeated within one object keeps the value and the position of its last
//!   occurrence.
//!
//! ```
//! use ordered_json::{OrderedMap, Value};
//!
//! let mut m = OrderedMap::from_json(r#"{"b":2,"a":1}"#).unwrap();
//! m.set("c", vec![Value::from(3)]);
//! assert_eq!(m.keys(), ["b", "a", "c"]);
//! assert_eq!(m.to_json().unwrap(), r#"{"b":2,"a":1,"c":[3]}"#);
//! ```
//!
//! [`OrderedMap`] also implements `Serialize` and `Deserialize`, so it can be a
//! field of any serde-derived record.

mod convert;
mod equal;
mod error;
mod pair;

pub mod decoder;
pub mod encoder;
pub mod map;
pub mod properties;
pub mod value;

pub use decoder::Decoder;
pub use encoder::Encoder;
pub use equal::deep_equal;
pub use error::{Error, Result};
pub use map::OrderedMap;
pub use pair::Pair;
pub use properties::{decode_into, decode_into_with, Properties};
pub use value::{Number, Value};
