//! Writing values to a stream.
//!
//! This module provides the [`Encoder`] trait and its two implementations:
//!
//! - [`PlainEncoder`]: generation 1, `<kind>:<literal>`. Every occurrence of an
//!   object is written in full, and a cycle is an error.
//! - [`IdentityEncoder`]: generation 2, `<kind>:<token>:<literal>`. The first
//!   occurrence of a string or container is written in full; every later one
//!   is a single `alias:<token>:` line.
//!
//! It also provides [`ValueSerializer`], a serde serializer that turns any
//! `T: Serialize` into a [`Value`].
//!
//! ## Usage
//!
//! Most users should use the high-level functions in the crate root:
//!
//! ```rust
//! use serde_persist::{to_string, Value};
//!
//! let word = Value::str("word");
//! let value = Value::list(vec![word.clone(), word]);
//!
//! let text = to_string(&value).unwrap();
//! assert_eq!(text, "version:2\nlist:1:2\nstr:2:1\nword\nalias:2:\n");
//! ```
//!
//! ## Direct Encoder Usage
//!
//! ```rust
//! use serde_persist::ser::{Encoder, PlainEncoder};
//! use serde_persist::stream::LineWriter;
//! use serde_persist::Value;
//!
//! let mut encoder = PlainEncoder::new(LineWriter::new(Vec::new()));
//! encoder.encode(&Value::from(true)).unwrap();
//! encoder.encode(&Value::from(1.5)).unwrap();
//!
//! let bytes = encoder.finish().unwrap();
//! assert_eq!(bytes, b"bool:True\nfloat:1.5\n");
//! ```

use crate::identity::{ObjectId, Token, WriteTable};
use crate::stream::LineWriter;
use crate::{Dict, Error, Key, List, Result, Value};
use num_bigint::BigInt;
use serde::{ser, Serialize};
use std::collections::HashSet;
use std::io;
use tracing::trace;

/// Writes one value (and everything it contains) to a stream.
pub trait Encoder {
    fn encode(&mut self, value: &Value) -> Result<()>;
}

pub(crate) const TRUE_LITERAL: &str = "True";
pub(crate) const FALSE_LITERAL: &str = "False";

#[inline]
fn bool_literal(b: bool) -> &'static str {
    if b {
        TRUE_LITERAL
    } else {
        FALSE_LITERAL
    }
}

// Shortest representation that parses back to the same bits, e.g. `1.0`,
// `1e100`, `inf`, `NaN`.
#[inline]
fn float_literal(f: f64) -> String {
    format!("{:?}", f)
}

// The payload lines of a string: one per `\n`-separated segment.
fn string_lines(s: &str) -> (usize, std::str::Split<'_, char>) {
    (s.split('\n').count(), s.split('\n'))
}

/// Generation 1 encoder.
///
/// Shared objects are written once per occurrence. A container that is
/// reached again while it is still being written would never finish, so it
/// fails with [`Error::CycleInPlainFormat`].
pub struct PlainEncoder<W> {
    out: LineWriter<W>,
    ancestors: HashSet<ObjectId>,
}

impl<W: io::Write> PlainEncoder<W> {
    pub fn new(out: LineWriter<W>) -> Self {
        PlainEncoder {
            out,
            ancestors: HashSet::new(),
        }
    }

    /// Flushes and returns the underlying writer.
    pub fn finish(self) -> Result<W> {
        self.out.finish()
    }

    // Runs `write` with `id` on the current path. The id leaves the path
    // whether or not `write` succeeds, so the encoder stays usable after an
    // error.
    fn nested<F>(&mut self, id: ObjectId, write: F) -> Result<()>
    where
        F: FnOnce(&mut Self) -> Result<()>,
    {
        if !self.ancestors.insert(id) {
            return Err(Error::CycleInPlainFormat);
        }
        let result = write(self);
        self.ancestors.remove(&id);
        result
    }

    fn encode_list(&mut self, list: &List) -> Result<()> {
        self.nested(list.id(), |this| {
            let items = list.borrow();
            this.out.write_line(format_args!("list:{}", items.len()))?;
            for item in items.iter() {
                this.encode(item)?;
            }
            Ok(())
        })
    }

    fn encode_dict(&mut self, dict: &Dict) -> Result<()> {
        self.nested(dict.id(), |this| {
            let entries = dict.borrow();
            this.out.write_line(format_args!("dict:{}", entries.len()))?;
            for (key, item) in entries.iter() {
                this.encode(&Value::from(key.clone()))?;
                this.encode(item)?;
            }
            Ok(())
        })
    }
}

impl<W: io::Write> Encoder for PlainEncoder<W> {
    fn encode(&mut self, value: &Value) -> Result<()> {
        match value {
            Value::Bool(b) => self.out.write_line(format_args!("bool:{}", bool_literal(*b))),
            Value::Int(i) => self.out.write_line(format_args!("int:{}", i)),
            Value::BigInt(bi) => self.out.write_line(format_args!("int:{}", bi)),
            Value::Float(f) => self
                .out
                .write_line(format_args!("float:{}", float_literal(*f))),
            Value::Str(s) => {
                let (count, lines) = string_lines(s);
                self.out.write_line(format_args!("str:{}", count))?;
                for line in lines {
                    self.out.write_line(format_args!("{}", line))?;
                }
                Ok(())
            }
            Value::List(list) => self.encode_list(list),
            Value::Set(set) => {
                // Elements are scalars, so a set can never reach itself.
                let keys = set.borrow();
                self.out.write_line(format_args!("set:{}", keys.len()))?;
                for key in keys.iter() {
                    self.encode(&Value::from(key.clone()))?;
                }
                Ok(())
            }
            Value::Dict(dict) => self.encode_dict(dict),
        }
    }
}

/// Generation 2 encoder.
///
/// Holds the write side of the identity table for as long as it lives; one
/// encoder is one stream.
pub struct IdentityEncoder<W> {
    out: LineWriter<W>,
    table: WriteTable,
}

impl<W: io::Write> IdentityEncoder<W> {
    pub fn new(out: LineWriter<W>) -> Self {
        IdentityEncoder {
            out,
            table: WriteTable::new(),
        }
    }

    /// Flushes and returns the underlying writer.
    pub fn finish(self) -> Result<W> {
        self.out.finish()
    }

    /// Number of distinct shared objects written so far.
    #[must_use]
    pub fn objects_written(&self) -> usize {
        self.table.len()
    }

    fn write_entries(&mut self, token: Token, dict: &Dict) -> Result<()> {
        let entries = dict.borrow();
        self.out
            .write_line(format_args!("dict:{}:{}", token, entries.len()))?;
        for (key, item) in entries.iter() {
            self.encode(&Value::from(key.clone()))?;
            self.encode(item)?;
        }
        Ok(())
    }
}

impl<W: io::Write> Encoder for IdentityEncoder<W> {
    fn encode(&mut self, value: &Value) -> Result<()> {
        let (token, seen) = self.table.mark_and_check(value);
        if seen {
            trace!(%token, kind = %value.kind(), "writing alias");
            return self.out.write_line(format_args!("alias:{}:", token));
        }

        match value {
            Value::Bool(b) => self
                .out
                .write_line(format_args!("bool:{}:{}", token, bool_literal(*b))),
            Value::Int(i) => self.out.write_line(format_args!("int:{}:{}", token, i)),
            Value::BigInt(bi) => self.out.write_line(format_args!("int:{}:{}", token, bi)),
            Value::Float(f) => self
                .out
                .write_line(format_args!("float:{}:{}", token, float_literal(*f))),
            Value::Str(s) => {
                let (count, lines) = string_lines(s);
                self.out
                    .write_line(format_args!("str:{}:{}", token, count))?;
                for line in lines {
                    self.out.write_line(format_args!("{}", line))?;
                }
                Ok(())
            }
            Value::List(list) => {
                let items = list.borrow();
                self.out
                    .write_line(format_args!("list:{}:{}", token, items.len()))?;
                for item in items.iter() {
                    self.encode(item)?;
                }
                Ok(())
            }
            Value::Set(set) => {
                let keys = set.borrow();
                self.out
                    .write_line(format_args!("set:{}:{}", token, keys.len()))?;
                for key in keys.iter() {
                    self.encode(&Value::from(key.clone()))?;
                }
                Ok(())
            }
            Value::Dict(dict) => self.write_entries(token, dict),
        }
    }
}

/// Converts any `T: Serialize` into a [`Value`].
///
/// Structs and maps become dicts, sequences and tuples become lists, unit
/// enum variants become strings, and data-carrying variants become a
/// single-entry dict keyed by the variant name. `None` and `()` have no
/// representation and fail.
pub struct ValueSerializer;

pub struct SerializeVec {
    vec: Vec<Value>,
    variant: Option<&'static str>,
}

pub struct SerializeMap {
    dict: Dict,
    current_key: Option<Key>,
    variant: Option<&'static str>,
}

impl ser::Serializer for ValueSerializer {
    type Ok = Value;
    type Error = Error;

    type SerializeSeq = SerializeVec;
    type SerializeTuple = SerializeVec;
    type SerializeTupleStruct = SerializeVec;
    type SerializeTupleVariant = SerializeVec;
    type SerializeMap = SerializeMap;
    type SerializeStruct = SerializeMap;
    type SerializeStructVariant = SerializeMap;

    fn serialize_bool(self, v: bool) -> Result<Value> {
        Ok(Value::Bool(v))
    }

    fn serialize_i8(self, v: i8) -> Result<Value> {
        Ok(Value::from(v))
    }

    fn serialize_i16(self, v: i16) -> Result<Value> {
        Ok(Value::from(v))
    }

    fn serialize_i32(self, v: i32) -> Result<Value> {
        Ok(Value::from(v))
    }

    fn serialize_i64(self, v: i64) -> Result<Value> {
        Ok(Value::Int(v))
    }

    fn serialize_i128(self, v: i128) -> Result<Value> {
        Ok(Value::from(BigInt::from(v)))
    }

    fn serialize_u8(self, v: u8) -> Result<Value> {
        Ok(Value::from(v))
    }

    fn serialize_u16(self, v: u16) -> Result<Value> {
        Ok(Value::from(v))
    }

    fn serialize_u32(self, v: u32) -> Result<Value> {
        Ok(Value::from(v))
    }

    fn serialize_u64(self, v: u64) -> Result<Value> {
        Ok(Value::from(v))
    }

    fn serialize_u128(self, v: u128) -> Result<Value> {
        Ok(Value::from(BigInt::from(v)))
    }

    fn serialize_f32(self, v: f32) -> Result<Value> {
        Ok(Value::from(v))
    }

    fn serialize_f64(self, v: f64) -> Result<Value> {
        Ok(Value::Float(v))
    }

    fn serialize_char(self, v: char) -> Result<Value> {
        Ok(Value::from(v.to_string()))
    }

    fn serialize_str(self, v: &str) -> Result<Value> {
        Ok(Value::str(v))
    }

    fn serialize_bytes(self, v: &[u8]) -> Result<Value> {
        Ok(Value::list(v.iter().map(|&b| Value::from(b)).collect()))
    }

    fn serialize_none(self) -> Result<Value> {
        Err(Error::custom("None has no persistent representation"))
    }

    fn serialize_some<T>(self, value: &T) -> Result<Value>
    where
        T: ?Sized + Serialize,
    {
        value.serialize(self)
    }

    fn serialize_unit(self) -> Result<Value> {
        Err(Error::custom("() has no persistent representation"))
    }

    fn serialize_unit_struct(self, name: &'static str) -> Result<Value> {
        Err(Error::custom(format!(
            "unit struct {} has no persistent representation",
            name
        )))
    }

    fn serialize_unit_variant(
        self,
        _name: &'static str,
        _variant_index: u32,
        variant: &'static str,
    ) -> Result<Value> {
        Ok(Value::str(variant))
    }

    fn serialize_newtype_struct<T>(self, _name: &'static str, value: &T) -> Result<Value>
    where
        T: ?Sized + Serialize,
    {
        value.serialize(self)
    }

    fn serialize_newtype_variant<T>(
        self,
        _name: &'static str,
        _variant_index: u32,
        variant: &'static str,
        value: &T,
    ) -> Result<Value>
    where
        T: ?Sized + Serialize,
    {
        Ok(tagged(variant, to_value(value)?))
    }

    fn serialize_seq(self, len: Option<usize>) -> Result<SerializeVec> {
        Ok(SerializeVec::new(len.unwrap_or(0), None))
    }

    fn serialize_tuple(self, len: usize) -> Result<SerializeVec> {
        Ok(SerializeVec::new(len, None))
    }

    fn serialize_tuple_struct(self, _name: &'static str, len: usize) -> Result<SerializeVec> {
        Ok(SerializeVec::new(len, None))
    }

    fn serialize_tuple_variant(
        self,
        _name: &'static str,
        _variant_index: u32,
        variant: &'static str,
        len: usize,
    ) -> Result<SerializeVec> {
        Ok(SerializeVec::new(len, Some(variant)))
    }

    fn serialize_map(self, len: Option<usize>) -> Result<SerializeMap> {
        Ok(SerializeMap::new(len.unwrap_or(0), None))
    }

    fn serialize_struct(self, _name: &'static str, len: usize) -> Result<SerializeMap> {
        Ok(SerializeMap::new(len, None))
    }

    fn serialize_struct_variant(
        self,
        _name: &'static str,
        _variant_index: u32,
        variant: &'static str,
        len: usize,
    ) -> Result<SerializeMap> {
        Ok(SerializeMap::new(len, Some(variant)))
    }
}

// Externally tagged enum payload: `{variant: value}`.
fn tagged(variant: &'static str, value: Value) -> Value {
    let dict = Dict::with_capacity(1);
    dict.insert(Key::from(variant), value);
    Value::Dict(dict)
}

impl SerializeVec {
    fn new(capacity: usize, variant: Option<&'static str>) -> Self {
        SerializeVec {
            vec: Vec::with_capacity(capacity),
            variant,
        }
    }

    fn push<T: ?Sized + Serialize>(&mut self, value: &T) -> Result<()> {
        self.vec.push(to_value(value)?);
        Ok(())
    }

    fn finish(self) -> Value {
        let list = Value::list(self.vec);
        match self.variant {
            Some(variant) => tagged(variant, list),
            None => list,
        }
    }
}

impl SerializeMap {
    fn new(capacity: usize, variant: Option<&'static str>) -> Self {
        SerializeMap {
            dict: Dict::with_capacity(capacity),
            current_key: None,
            variant,
        }
    }

    fn field<T: ?Sized + Serialize>(&mut self, key: &'static str, value: &T) -> Result<()> {
        self.dict.insert(Key::from(key), to_value(value)?);
        Ok(())
    }

    fn finish(self) -> Value {
        let dict = Value::Dict(self.dict);
        match self.variant {
            Some(variant) => tagged(variant, dict),
            None => dict,
        }
    }
}

impl ser::SerializeSeq for SerializeVec {
    type Ok = Value;
    type Error = Error;

    fn serialize_element<T>(&mut self, value: &T) -> Result<()>
    where
        T: ?Sized + Serialize,
    {
        self.push(value)
    }

    fn end(self) -> Result<Value> {
        Ok(self.finish())
    }
}

impl ser::SerializeTuple for SerializeVec {
    type Ok = Value;
    type Error = Error;

    fn serialize_element<T>(&mut self, value: &T) -> Result<()>
    where
        T: ?Sized + Serialize,
    {
        self.push(value)
    }

    fn end(self) -> Result<Value> {
        Ok(self.finish())
    }
}

impl ser::SerializeTupleStruct for SerializeVec {
    type Ok = Value;
    type Error = Error;

    fn serialize_field<T>(&mut self, value: &T) -> Result<()>
    where
        T: ?Sized + Serialize,
    {
        self.push(value)
    }

    fn end(self) -> Result<Value> {
        Ok(self.finish())
    }
}

impl ser::SerializeTupleVariant for SerializeVec {
    type Ok = Value;
    type Error = Error;

    fn serialize_field<T>(&mut self, value: &T) -> Result<()>
    where
        T: ?Sized + Serialize,
    {
        self.push(value)
    }

    fn end(self) -> Result<Value> {
        Ok(self.finish())
    }
}

impl ser::SerializeMap for SerializeMap {
    type Ok = Value;
    type Error = Error;

    fn serialize_key<T>(&mut self, key: &T) -> Result<()>
    where
        T: ?Sized + Serialize,
    {
        self.current_key = Some(Key::try_from(to_value(key)?)?);
        Ok(())
    }

    fn serialize_value<T>(&mut self, value: &T) -> Result<()>
    where
        T: ?Sized + Serialize,
    {
        let key = self
            .current_key
            .take()
            .ok_or_else(|| Error::custom("serialize_value called without serialize_key"))?;
        self.dict.insert(key, to_value(value)?);
        Ok(())
    }

    fn end(self) -> Result<Value> {
        Ok(self.finish())
    }
}

impl ser::SerializeStruct for SerializeMap {
    type Ok = Value;
    type Error = Error;

    fn serialize_field<T>(&mut self, key: &'static str, value: &T) -> Result<()>
    where
        T: ?Sized + Serialize,
    {
        self.field(key, value)
    }

    fn end(self) -> Result<Value> {
        Ok(self.finish())
    }
}

impl ser::SerializeStructVariant for SerializeMap {
    type Ok = Value;
    type Error = Error;

    fn serialize_field<T>(&mut self, key: &'static str, value: &T) -> Result<()>
    where
        T: ?Sized + Serialize,
    {
        self.field(key, value)
    }

    fn end(self) -> Result<Value> {
        Ok(self.finish())
    }
}

fn to_value<T: Serialize + ?Sized>(value: &T) -> Result<Value> {
    value.serialize(ValueSerializer)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Set;

    fn plain(value: &Value) -> Result<String> {
        let mut encoder = PlainEncoder::new(LineWriter::new(Vec::new()));
        encoder.encode(value)?;
        Ok(String::from_utf8(encoder.finish()?).unwrap())
    }

    fn aware(value: &Value) -> String {
        let mut encoder = IdentityEncoder::new(LineWriter::new(Vec::new()));
        encoder.encode(value).unwrap();
        String::from_utf8(encoder.finish().unwrap()).unwrap()
    }

    #[test]
    fn test_plain_scalars() {
        let value = Value::list(vec![
            Value::from(true),
            Value::from(-3),
            Value::from(2.0),
            Value::from("word"),
        ]);
        assert_eq!(
            plain(&value).unwrap(),
            "list:4\nbool:True\nint:-3\nfloat:2.0\nstr:1\nword\n"
        );
    }

    #[test]
    fn test_multiline_string_is_written_verbatim() {
        let value = Value::from("a: b\n\nc");
        assert_eq!(plain(&value).unwrap(), "str:3\na: b\n\nc\n");
        assert_eq!(plain(&Value::from("")).unwrap(), "str:1\n\n");
    }

    #[test]
    fn test_plain_writes_shared_objects_twice() {
        let word = Value::str("word");
        let value = Value::list(vec![word.clone(), word]);
        assert_eq!(plain(&value).unwrap(), "list:2\nstr:1\nword\nstr:1\nword\n");
    }

    #[test]
    fn test_plain_rejects_cycles() {
        let list = List::new();
        list.push(Value::List(list.clone()));
        assert!(matches!(
            plain(&Value::List(list.clone())),
            Err(Error::CycleInPlainFormat)
        ));
        list.clear();
    }

    #[test]
    fn test_plain_allows_shared_acyclic_containers() {
        let inner = Value::list(vec![Value::from(1)]);
        let value = Value::list(vec![inner.clone(), inner]);
        assert_eq!(plain(&value).unwrap(), "list:2\nlist:1\nint:1\nlist:1\nint:1\n");
    }

    #[test]
    fn test_identity_aliases_repeats() {
        let list = List::new();
        list.push(Value::from("word"));
        list.push(Value::List(list.clone()));
        assert_eq!(aware(&Value::List(list.clone())), "list:1:2\nstr:2:1\nword\nalias:1:\n");
        list.clear();
    }

    #[test]
    fn test_identity_scalars_get_fresh_tokens() {
        let value = Value::list(vec![Value::from(7), Value::from(7)]);
        assert_eq!(aware(&value), "list:1:2\nint:2:7\nint:3:7\n");
    }

    #[test]
    fn test_identity_dict_and_set() {
        let key = Value::str("k");
        let set = Set::new();
        set.insert(Key::try_from(key.clone()).unwrap());
        let dict = Value::dict(vec![(key.clone(), Value::Set(set))]).unwrap();
        assert_eq!(aware(&dict), "dict:1:1\nstr:2:1\nk\nset:3:1\nalias:2:\n");
    }

    #[test]
    fn test_identity_encoder_reused_for_dropped_values() {
        let mut encoder = IdentityEncoder::new(LineWriter::new(Vec::new()));
        encoder.encode(&Value::str("aaaa")).unwrap();
        encoder.encode(&Value::str("bbbb")).unwrap();
        encoder.encode(&Value::list(vec![])).unwrap();
        encoder.encode(&Value::list(vec![Value::from(1)])).unwrap();
        assert_eq!(encoder.objects_written(), 4);

        let text = String::from_utf8(encoder.finish().unwrap()).unwrap();
        assert_eq!(
            text,
            "str:1:1\naaaa\nstr:2:1\nbbbb\nlist:3:0\nlist:4:1\nint:5:1\n"
        );
    }

    #[test]
    fn test_identity_encoder_aliases_across_calls() {
        let shared = Value::list(vec![Value::from("x")]);
        let mut encoder = IdentityEncoder::new(LineWriter::new(Vec::new()));
        encoder.encode(&shared).unwrap();
        encoder.encode(&Value::list(vec![shared.clone()])).unwrap();
        assert_eq!(encoder.objects_written(), 3);

        let text = String::from_utf8(encoder.finish().unwrap()).unwrap();
        assert_eq!(text, "list:1:1\nstr:2:1\nx\nlist:3:1\nalias:1:\n");
    }

    #[test]
    fn test_plain_encoder_reused_for_dropped_values() {
        let mut encoder = PlainEncoder::new(LineWriter::new(Vec::new()));
        encoder.encode(&Value::list(vec![])).unwrap();
        encoder.encode(&Value::list(vec![Value::list(vec![])])).unwrap();
        encoder.encode(&Value::str("a")).unwrap();

        let text = String::from_utf8(encoder.finish().unwrap()).unwrap();
        assert_eq!(text, "list:0\nlist:1\nlist:0\nstr:1\na\n");
    }

    #[test]
    fn test_plain_encoder_usable_after_cycle_error() {
        let inner = List::new();
        inner.push(Value::List(inner.clone()));
        let outer = Value::list(vec![Value::List(inner.clone())]);

        let mut encoder = PlainEncoder::new(LineWriter::new(Vec::new()));
        assert!(matches!(
            encoder.encode(&outer),
            Err(Error::CycleInPlainFormat)
        ));

        inner.clear();
        encoder.encode(&outer).unwrap();
        let text = String::from_utf8(encoder.finish().unwrap()).unwrap();
        assert!(text.ends_with("list:1\nlist:0\n"));
    }

    #[test]
    fn test_value_serializer_enums() {
        #[derive(Serialize)]
        enum Shape {
            Empty,
            Circle(f64),
            Rect { w: i32, h: i32 },
        }

        assert_eq!(to_value(&Shape::Empty).unwrap(), Value::from("Empty"));
        let circle = to_value(&Shape::Circle(1.5)).unwrap();
        assert_eq!(circle.as_dict().unwrap().get("Circle"), Some(Value::from(1.5)));
        let rect = to_value(&Shape::Rect { w: 2, h: 3 }).unwrap();
        let fields = rect.as_dict().unwrap().get("Rect").unwrap();
        assert_eq!(fields.as_dict().unwrap().get("h"), Some(Value::from(3)));
    }

    #[test]
    fn test_value_serializer_rejects_none_and_wide_ints_become_bigint() {
        assert!(to_value(&Option::<i32>::None).is_err());
        assert!(matches!(to_value(&u128::MAX).unwrap(), Value::BigInt(_)));
        assert_eq!(to_value(&Some(3u8)).unwrap(), Value::from(3));
    }
}
