//! JSON encoder that writes maps in their stored key order.
//!
//! Output goes through serde_json's serializer with a formatter wrapper that
//! applies the HTML-escape policy to every string fragment of the document,
//! keys included, at every nesting level.

use std::io;

use serde::ser::{Error as _, Serialize, SerializeMap, Serializer};
use serde_json::ser::{CharEscape, CompactFormatter, Formatter, PrettyFormatter};
use tracing::debug;

use crate::error::{Error, Result};
use crate::map::OrderedMap;
use crate::properties::{Properties, PropertiesView};
use crate::value::{Number, Value};

const DEFAULT_INDENT: &str = "  ";

/// Encoder configuration.
///
/// - `escape_html`: write `<`, `>` and `&` as `\u003c`, `\u003e`, `\u0026`.
/// - `indent`: `None` for compact output, otherwise the indent unit repeated
///   once per nesting level.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Encoder {
    pub escape_html: bool,
    pub indent: Option<String>,
}

impl Default for Encoder {
    fn default() -> Self {
        Self::new()
    }
}

impl Encoder {
    /// Compact output with HTML escaping.
    pub fn new() -> Self {
        Self {
            escape_html: true,
            indent: None,
        }
    }

    /// Two-space indented output with HTML escaping.
    pub fn pretty() -> Self {
        Self {
            escape_html: true,
            indent: Some(DEFAULT_INDENT.to_owned()),
        }
    }

    /// Compact output using the escaping policy stored on `map`.
    pub fn for_map(map: &OrderedMap) -> Self {
        Self {
            escape_html: map.escape_html(),
            indent: None,
        }
    }

    pub fn escape_html(mut self, escape_html: bool) -> Self {
        self.escape_html = escape_html;
        self
    }

    pub fn indent(mut self, unit: impl Into<String>) -> Self {
        self.indent = Some(unit.into());
        self
    }

    pub fn encode(&self, map: &OrderedMap) -> Result<String> {
        self.to_string(map)
    }

    pub fn encode_value(&self, value: &Value) -> Result<String> {
        self.to_string(value)
    }

    /// Encodes any [`Properties`] implementor in its `keys()` order.
    pub fn encode_properties<P: Properties + ?Sized>(&self, props: &P) -> Result<String> {
        self.to_string(&PropertiesView(props))
    }

    pub fn encode_to_vec(&self, map: &OrderedMap) -> Result<Vec<u8>> {
        self.to_vec(map)
    }

    /// Writes the encoded map to `writer`. The document is rendered in full
    /// before the first byte is written, so an unsupported value never leaves
    /// partial output behind.
    pub fn encode_to_writer<W: io::Write>(&self, mut writer: W, map: &OrderedMap) -> Result<()> {
        let bytes = self.to_vec(map)?;
        writer.write_all(&bytes)?;
        Ok(())
    }

    fn to_string<T: Serialize + ?Sized>(&self, value: &T) -> Result<String> {
        let bytes = self.to_vec(value)?;
        // serde_json only ever emits UTF-8.
        String::from_utf8(bytes).map_err(|e| Error::UnsupportedValue(e.to_string()))
    }

    fn to_vec<T: Serialize + ?Sized>(&self, value: &T) -> Result<Vec<u8>> {
        let mut out = Vec::with_capacity(128);
        let written = match &self.indent {
            None => {
                let formatter = DocumentFormatter::new(CompactFormatter, self.escape_html);
                let mut ser = serde_json::Serializer::with_formatter(&mut out, formatter);
                value.serialize(&mut ser)
            }
            Some(unit) => {
                let formatter = DocumentFormatter::new(
                    PrettyFormatter::with_indent(unit.as_bytes()),
                    self.escape_html,
                );
                let mut ser = serde_json::Serializer::with_formatter(&mut out, formatter);
                value.serialize(&mut ser)
            }
        };
        match written {
            Ok(()) => Ok(out),
            Err(err) => {
                debug!(error = %err, "encode failed");
                Err(Error::from_encode(err))
            }
        }
    }
}

impl OrderedMap {
    /// Compact JSON using this map's escaping policy.
    pub fn to_json(&self) -> Result<String> {
        Encoder::for_map(self).encode(self)
    }

    /// Two-space indented JSON using this map's escaping policy.
    pub fn to_json_pretty(&self) -> Result<String> {
        Encoder::for_map(self).indent(DEFAULT_INDENT).encode(self)
    }
}

/// Wraps a serde_json formatter and applies the HTML-escape policy to string
/// fragments. Structural calls are forwarded so the inner formatter keeps its
/// indentation state.
struct DocumentFormatter<F> {
    inner: F,
    escape_html: bool,
}

impl<F: Formatter> DocumentFormatter<F> {
    fn new(inner: F, escape_html: bool) -> Self {
        Self { inner, escape_html }
    }
}

impl<F: Formatter> Formatter for DocumentFormatter<F> {
    fn write_string_fragment<W>(&mut self, writer: &mut W, fragment: &str) -> io::Result<()>
    where
        W: ?Sized + io::Write,
    {
        if !self.escape_html {
            return self.inner.write_string_fragment(writer, fragment);
        }
        let mut start = 0;
        for (i, byte) in fragment.bytes().enumerate() {
            if matches!(byte, b'<' | b'>' | b'&') {
                if start < i {
                    self.inner.write_string_fragment(writer, &fragment[start..i])?;
                }
                self.inner
                    .write_char_escape(writer, CharEscape::AsciiControl(byte))?;
                start = i + 1;
            }
        }
        if start < fragment.len() {
            self.inner.write_string_fragment(writer, &fragment[start..])?;
        }
        Ok(())
    }

    fn write_char_escape<W>(&mut self, writer: &mut W, char_escape: CharEscape) -> io::Result<()>
    where
        W: ?Sized + io::Write,
    {
        self.inner.write_char_escape(writer, char_escape)
    }

    fn begin_array<W>(&mut self, writer: &mut W) -> io::Result<()>
    where
        W: ?Sized + io::Write,
    {
        self.inner.begin_array(writer)
    }

    fn end_array<W>(&mut self, writer: &mut W) -> io::Result<()>
    where
        W: ?Sized + io::Write,
    {
        self.inner.end_array(writer)
    }

    fn begin_array_value<W>(&mut self, writer: &mut W, first: bool) -> io::Result<()>
    where
        W: ?Sized + io::Write,
    {
        self.inner.begin_array_value(writer, first)
    }

    fn end_array_value<W>(&mut self, writer: &mut W) -> io::Result<()>
    where
        W: ?Sized + io::Write,
    {
        self.inner.end_array_value(writer)
    }

    fn begin_object<W>(&mut self, writer: &mut W) -> io::Result<()>
    where
        W: ?Sized + io::Write,
    {
        self.inner.begin_object(writer)
    }

    fn end_object<W>(&mut self, writer: &mut W) -> io::Result<()>
    where
        W: ?Sized + io::Write,
    {
        self.inner.end_object(writer)
    }

    fn begin_object_key<W>(&mut self, writer: &mut W, first: bool) -> io::Result<()>
    where
        W: ?Sized + io::Write,
    {
        self.inner.begin_object_key(writer, first)
    }

    fn end_object_key<W>(&mut self, writer: &mut W) -> io::Result<()>
    where
        W: ?Sized + io::Write,
    {
        self.inner.end_object_key(writer)
    }

    fn begin_object_value<W>(&mut self, writer: &mut W) -> io::Result<()>
    where
        W: ?Sized + io::Write,
    {
        self.inner.begin_object_value(writer)
    }

    fn end_object_value<W>(&mut self, writer: &mut W) -> io::Result<()>
    where
        W: ?Sized + io::Write,
    {
        self.inner.end_object_value(writer)
    }
}

impl Serialize for Number {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match *self {
            Number::Integer(n) => serializer.serialize_i64(n),
            Number::UInteger(n) => serializer.serialize_u64(n),
            Number::Float(f) if f.is_finite() => serializer.serialize_f64(f),
            Number::Float(f) => Err(S::Error::custom(format_args!(
                "non-finite float {f} has no JSON representation"
            ))),
        }
    }
}

impl Serialize for Value {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Value::Null => serializer.serialize_unit(),
            Value::Bool(b) => serializer.serialize_bool(*b),
            Value::Number(n) => n.serialize(serializer),
            Value::String(s) => serializer.serialize_str(s),
            Value::Map(m) => m.serialize(serializer),
            Value::Sequence(items) => serializer.collect_seq(items),
        }
    }
}

impl Serialize for OrderedMap {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.len()))?;
        for (key, value) in self {
            map.serialize_entry(key, value)?;
        }
        map.end()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> OrderedMap {
        let mut nested = OrderedMap::new();
        nested.set("e", 1);
        nested.set("a", 2);
        let mut m = OrderedMap::new();
        m.set("z", "<b>&</b>");
        m.set("list", vec![Value::from("1"), Value::from(1)]);
        m.set("nested", nested);
        m
    }

    #[test]
    fn empty_map_is_bare_braces() {
        let m = OrderedMap::new();
        assert_eq!(Encoder::new().encode(&m).unwrap(), "{}");
        assert_eq!(Encoder::pretty().encode(&m).unwrap(), "{}");
    }

    #[test]
    fn compact_keeps_order_and_escapes_html() {
        let out = Encoder::new().encode(&sample()).unwrap();
        assert_eq!(
            out,
            r#"{"z":"\u003cb\u003e\u0026\u003c/b\u003e","list":["1",1],"nested":{"e":1,"a":2}}"#
        );
    }

    #[test]
    fn html_escaping_can_be_disabled() {
        let out = Encoder::new().escape_html(false).encode(&sample()).unwrap();
        assert!(out.starts_with(r#"{"z":"<b>&</b>""#), "{out}");
    }

    #[test]
    fn keys_are_escaped_too() {
        let mut m = OrderedMap::new();
        m.set("a<b", true);
        assert_eq!(Encoder::new().encode(&m).unwrap(), r#"{"a\u003cb":true}"#);
    }

    #[test]
    fn control_characters_always_escaped() {
        let mut m = OrderedMap::new();
        m.set("test\n\r\t\\\"ing", 9);
        let out = Encoder::new().escape_html(false).encode(&m).unwrap();
        assert_eq!(out, r#"{"test\n\r\t\\\"ing":9}"#);
    }

    #[test]
    fn pretty_uses_indent_unit() {
        let out = Encoder::new().indent("    ").encode(&sample()).unwrap();
        assert!(out.contains("\n    \"nested\": {\n        \"e\": 1,"), "{out}");
    }

    #[test]
    fn non_finite_float_is_unsupported() {
        let mut m = OrderedMap::new();
        m.set("inner", vec![Value::from(f64::INFINITY)]);
        let err = Encoder::new().encode(&m).unwrap_err();
        assert!(matches!(err, Error::UnsupportedValue(_)), "{err:?}");
    }

    #[test]
    fn writer_receives_nothing_on_failure() {
        let mut m = OrderedMap::new();
        m.set("ok", 1);
        m.set("bad", f64::NAN);
        let mut sink = Vec::new();
        assert!(Encoder::new().encode_to_writer(&mut sink, &m).is_err());
        assert!(sink.is_empty());
    }

    #[test]
    fn map_policy_drives_to_json() {
        let mut m = sample();
        m.set_escape_html(false);
        assert!(m.to_json().unwrap().contains("<b>&</b>"));
        assert!(m.to_json_pretty().unwrap().starts_with("{\n  \"z\": \"<b>&</b>\""));
    }

    #[test]
    fn serialize_through_serde_json() {
        let out = serde_json::to_string(&sample()).unwrap();
        assert_eq!(out, r#"{"z":"<b>&</b>","list":["1",1],"nested":{"e":1,"a":2}}"#);
    }
}
