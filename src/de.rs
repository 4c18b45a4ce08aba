//! Reading values back from a stream.
//!
//! This module provides the [`Decoder`] trait and its two implementations,
//! [`PlainDecoder`] (generation 1) and [`IdentityDecoder`] (generation 2),
//! plus [`ValueDeserializer`], which feeds a [`Value`] to any
//! `T: Deserialize`.
//!
//! ## Overview
//!
//! - **Single pass**: each line is read exactly once, in order
//! - **Exhaustive tags**: a kind tag outside the known set is an error, never skipped
//! - **Register before populate**: the identity-aware decoder records a
//!   container under its token while it is still empty, so an alias inside it
//!   can refer back to it
//!
//! ## Usage
//!
//! ```rust
//! use serde_persist::from_str;
//!
//! let value = from_str("version:2\nlist:1:2\nstr:2:1\nword\nalias:1:\n").unwrap();
//! let list = value.as_list().unwrap();
//! assert_eq!(list.get(0).unwrap().as_str(), Some("word"));
//! assert!(list.get(1).unwrap().same_object(&value));
//! # list.clear();
//! ```

use crate::identity::{ReadTable, Token};
use crate::ser::{FALSE_LITERAL, TRUE_LITERAL};
use crate::stream::LineReader;
use crate::{Dict, Error, Key, Kind, List, Result, Set, Value};
use num_bigint::BigInt;
use serde::de::{self, IntoDeserializer};
use serde::forward_to_deserialize_any;
use std::io;
use tracing::trace;

/// Reads one value (and everything it contains) from a stream.
pub trait Decoder {
    fn decode(&mut self) -> Result<Value>;
}

// Element counts come from the stream; never trust them for allocation.
const PREALLOCATION_LIMIT: usize = 1024;

fn parse_bool(line: usize, literal: &str) -> Result<Value> {
    match literal {
        TRUE_LITERAL => Ok(Value::Bool(true)),
        FALSE_LITERAL => Ok(Value::Bool(false)),
        _ => Err(Error::invalid_literal(line, Kind::Bool.tag(), literal)),
    }
}

fn parse_int(line: usize, literal: &str) -> Result<Value> {
    if let Ok(i) = literal.parse::<i64>() {
        return Ok(Value::Int(i));
    }
    literal
        .parse::<BigInt>()
        .map(Value::from)
        .map_err(|_| Error::invalid_literal(line, Kind::Int.tag(), literal))
}

fn parse_float(line: usize, literal: &str) -> Result<Value> {
    literal
        .parse::<f64>()
        .map(Value::Float)
        .map_err(|_| Error::invalid_literal(line, Kind::Float.tag(), literal))
}

fn parse_count(line: usize, kind: Kind, literal: &str) -> Result<usize> {
    literal
        .parse::<usize>()
        .map_err(|_| Error::invalid_literal(line, kind.tag(), literal))
}

fn parse_token(line: usize, field: &str) -> Result<Token> {
    field
        .parse::<u64>()
        .map(Token::new)
        .map_err(|_| Error::format(line, &format!("token '{}' is not a number", field)))
}

// Reads the raw payload lines of a string and joins them with `\n`.
fn read_text<R: io::BufRead>(input: &mut LineReader<R>, line: usize, literal: &str) -> Result<Value> {
    let count = parse_count(line, Kind::Str, literal)?;
    let mut text = String::new();
    for i in 0..count {
        if i > 0 {
            text.push('\n');
        }
        let expected = format!("line {} of {} of a string", i + 1, count);
        text.push_str(&input.expect_line(&expected)?);
    }
    Ok(Value::from(text))
}

fn hashable(value: Value) -> Result<Key> {
    Key::try_from(value)
}

/// Generation 1 decoder.
///
/// Every record stands alone; nothing is shared in the result.
pub struct PlainDecoder<R> {
    input: LineReader<R>,
}

impl<R: io::BufRead> PlainDecoder<R> {
    /// Creates a decoder positioned after the version header.
    pub fn new(input: LineReader<R>) -> Self {
        PlainDecoder { input }
    }

    pub fn into_inner(self) -> LineReader<R> {
        self.input
    }
}

impl<R: io::BufRead> Decoder for PlainDecoder<R> {
    fn decode(&mut self) -> Result<Value> {
        let line = self.input.expect_line("a value record")?;
        let at = self.input.line_number();
        if line.is_empty() {
            return Err(Error::format(at, "empty line where a record was expected"));
        }
        let (tag, literal) = line.split_once(':').ok_or_else(|| {
            Error::format(at, &format!("expected '<kind>:<literal>', found '{}'", line))
        })?;
        let kind = Kind::from_tag(tag).ok_or_else(|| Error::unknown_kind(at, tag))?;
        trace!(line = at, %kind, "reading plain record");

        match kind {
            Kind::Bool => parse_bool(at, literal),
            Kind::Int => parse_int(at, literal),
            Kind::Float => parse_float(at, literal),
            Kind::Str => read_text(&mut self.input, at, literal),
            Kind::List => {
                let count = parse_count(at, kind, literal)?;
                let list = List::with_capacity(count.min(PREALLOCATION_LIMIT));
                for _ in 0..count {
                    list.push(self.decode()?);
                }
                Ok(Value::List(list))
            }
            Kind::Set => {
                let count = parse_count(at, kind, literal)?;
                let set = Set::with_capacity(count.min(PREALLOCATION_LIMIT));
                for _ in 0..count {
                    set.insert(hashable(self.decode()?)?);
                }
                Ok(Value::Set(set))
            }
            Kind::Dict => {
                let count = parse_count(at, kind, literal)?;
                let dict = Dict::with_capacity(count.min(PREALLOCATION_LIMIT));
                for _ in 0..count {
                    let key = hashable(self.decode()?)?;
                    let value = self.decode()?;
                    dict.insert(key, value);
                }
                Ok(Value::Dict(dict))
            }
        }
    }
}

/// Generation 2 decoder.
///
/// Owns the read side of the identity table. Every record's token is
/// registered; containers are registered before their children are read.
pub struct IdentityDecoder<R> {
    input: LineReader<R>,
    table: ReadTable,
}

impl<R: io::BufRead> IdentityDecoder<R> {
    /// Creates a decoder positioned after the version header.
    pub fn new(input: LineReader<R>) -> Self {
        IdentityDecoder {
            input,
            table: ReadTable::new(),
        }
    }

    pub fn into_inner(self) -> LineReader<R> {
        self.input
    }

    /// Number of objects restored so far.
    #[must_use]
    pub fn objects_restored(&self) -> usize {
        self.table.len()
    }

    fn scalar(&mut self, token: Token, at: usize, value: Value) -> Result<Value> {
        self.table.register(token, value.clone(), at)?;
        Ok(value)
    }
}

impl<R: io::BufRead> Decoder for IdentityDecoder<R> {
    fn decode(&mut self) -> Result<Value> {
        let line = self.input.expect_line("a value record")?;
        let at = self.input.line_number();
        if line.is_empty() {
            return Err(Error::format(at, "empty line where a record was expected"));
        }
        let mut fields = line.splitn(3, ':');
        let (tag, token, literal) = match (fields.next(), fields.next(), fields.next()) {
            (Some(tag), Some(token), Some(literal)) => (tag, token, literal),
            _ => {
                return Err(Error::format(
                    at,
                    &format!("expected '<kind>:<token>:<literal>', found '{}'", line),
                ))
            }
        };
        if tag == "alias" {
            let token = parse_token(at, token)?;
            trace!(line = at, %token, "resolving alias");
            return self.table.resolve(token, at);
        }
        let kind = Kind::from_tag(tag).ok_or_else(|| Error::unknown_kind(at, tag))?;
        let token = parse_token(at, token)?;
        trace!(line = at, %kind, %token, "reading record");

        match kind {
            Kind::Bool => {
                let value = parse_bool(at, literal)?;
                self.scalar(token, at, value)
            }
            Kind::Int => {
                let value = parse_int(at, literal)?;
                self.scalar(token, at, value)
            }
            Kind::Float => {
                let value = parse_float(at, literal)?;
                self.scalar(token, at, value)
            }
            Kind::Str => {
                let value = read_text(&mut self.input, at, literal)?;
                self.scalar(token, at, value)
            }
            Kind::List => {
                let count = parse_count(at, kind, literal)?;
                let list = List::with_capacity(count.min(PREALLOCATION_LIMIT));
                self.table.register(token, Value::List(list.clone()), at)?;
                for _ in 0..count {
                    let item = self.decode()?;
                    list.push(item);
                }
                Ok(Value::List(list))
            }
            Kind::Set => {
                let count = parse_count(at, kind, literal)?;
                let set = Set::with_capacity(count.min(PREALLOCATION_LIMIT));
                self.table.register(token, Value::Set(set.clone()), at)?;
                for _ in 0..count {
                    let item = hashable(self.decode()?)?;
                    set.insert(item);
                }
                Ok(Value::Set(set))
            }
            Kind::Dict => {
                let count = parse_count(at, kind, literal)?;
                let dict = Dict::with_capacity(count.min(PREALLOCATION_LIMIT));
                self.table.register(token, Value::Dict(dict.clone()), at)?;
                for _ in 0..count {
                    let key = hashable(self.decode()?)?;
                    let value = self.decode()?;
                    dict.insert(key, value);
                }
                Ok(Value::Dict(dict))
            }
        }
    }
}

/// Feeds a [`Value`] to a serde `Deserialize` implementation.
///
/// Created by [`crate::from_value`]. Strings map to enum unit variants and
/// single-entry dicts map to data-carrying variants, mirroring
/// [`crate::ser::ValueSerializer`].
pub struct ValueDeserializer {
    value: Value,
}

impl ValueDeserializer {
    pub fn new(value: Value) -> Self {
        ValueDeserializer { value }
    }
}

impl IntoDeserializer<'_, Error> for Value {
    type Deserializer = ValueDeserializer;

    fn into_deserializer(self) -> ValueDeserializer {
        ValueDeserializer::new(self)
    }
}

impl<'de> de::Deserializer<'de> for ValueDeserializer {
    type Error = Error;

    fn deserialize_any<V>(self, visitor: V) -> Result<V::Value>
    where
        V: de::Visitor<'de>,
    {
        match self.value {
            Value::Bool(b) => visitor.visit_bool(b),
            Value::Int(i) => visitor.visit_i64(i),
            Value::BigInt(bi) => {
                if let Ok(i) = i128::try_from(&bi) {
                    visitor.visit_i128(i)
                } else if let Ok(u) = u128::try_from(&bi) {
                    visitor.visit_u128(u)
                } else {
                    visitor.visit_string(bi.to_string())
                }
            }
            Value::Float(f) => visitor.visit_f64(f),
            Value::Str(s) => visitor.visit_string(s.to_string()),
            Value::List(list) => visitor.visit_seq(SeqDeserializer::new(list.to_vec())),
            Value::Set(set) => visitor.visit_seq(SeqDeserializer::new(
                set.to_vec().into_iter().map(Value::from).collect(),
            )),
            Value::Dict(dict) => visitor.visit_map(MapDeserializer::new(dict.entries())),
        }
    }

    fn deserialize_option<V>(self, visitor: V) -> Result<V::Value>
    where
        V: de::Visitor<'de>,
    {
        visitor.visit_some(self)
    }

    fn deserialize_newtype_struct<V>(self, _name: &'static str, visitor: V) -> Result<V::Value>
    where
        V: de::Visitor<'de>,
    {
        visitor.visit_newtype_struct(self)
    }

    fn deserialize_enum<V>(
        self,
        _name: &'static str,
        _variants: &'static [&'static str],
        visitor: V,
    ) -> Result<V::Value>
    where
        V: de::Visitor<'de>,
    {
        match self.value {
            Value::Str(s) => visitor.visit_enum(EnumDeserializer::new(s.to_string(), None)),
            Value::Dict(dict) if dict.len() == 1 => {
                let (key, value) = dict
                    .entries()
                    .into_iter()
                    .next()
                    .ok_or_else(|| Error::custom("Expected a single-entry dict for an enum"))?;
                match key {
                    Key::Str(variant) => {
                        visitor.visit_enum(EnumDeserializer::new(variant.to_string(), Some(value)))
                    }
                    other => Err(Error::custom(format!(
                        "Expected a string variant name, found {}",
                        other
                    ))),
                }
            }
            other => Err(Error::custom(format!(
                "Expected a string or single-entry dict for an enum, found {}",
                other.kind()
            ))),
        }
    }

    forward_to_deserialize_any! {
        bool i8 i16 i32 i64 i128 u8 u16 u32 u64 u128 f32 f64 char str string
        bytes byte_buf unit unit_struct seq tuple
        tuple_struct map struct identifier ignored_any
    }
}

struct SeqDeserializer {
    iter: std::vec::IntoIter<Value>,
}

impl SeqDeserializer {
    fn new(vec: Vec<Value>) -> Self {
        SeqDeserializer {
            iter: vec.into_iter(),
        }
    }
}

impl<'de> de::SeqAccess<'de> for SeqDeserializer {
    type Error = Error;

    fn next_element_seed<T>(&mut self, seed: T) -> Result<Option<T::Value>>
    where
        T: de::DeserializeSeed<'de>,
    {
        match self.iter.next() {
            Some(value) => seed.deserialize(ValueDeserializer::new(value)).map(Some),
            None => Ok(None),
        }
    }

    fn size_hint(&self) -> Option<usize> {
        match self.iter.size_hint() {
            (lower, Some(upper)) if lower == upper => Some(upper),
            _ => None,
        }
    }
}

struct MapDeserializer {
    iter: std::vec::IntoIter<(Key, Value)>,
    value: Option<Value>,
}

impl MapDeserializer {
    fn new(entries: Vec<(Key, Value)>) -> Self {
        MapDeserializer {
            iter: entries.into_iter(),
            value: None,
        }
    }
}

impl<'de> de::MapAccess<'de> for MapDeserializer {
    type Error = Error;

    fn next_key_seed<K>(&mut self, seed: K) -> Result<Option<K::Value>>
    where
        K: de::DeserializeSeed<'de>,
    {
        match self.iter.next() {
            Some((key, value)) => {
                self.value = Some(value);
                seed.deserialize(ValueDeserializer::new(Value::from(key)))
                    .map(Some)
            }
            None => Ok(None),
        }
    }

    fn next_value_seed<V>(&mut self, seed: V) -> Result<V::Value>
    where
        V: de::DeserializeSeed<'de>,
    {
        match self.value.take() {
            Some(value) => seed.deserialize(ValueDeserializer::new(value)),
            None => Err(Error::custom("next_value_seed called before next_key_seed")),
        }
    }

    fn size_hint(&self) -> Option<usize> {
        match self.iter.size_hint() {
            (lower, Some(upper)) if lower == upper => Some(upper),
            _ => None,
        }
    }
}

struct EnumDeserializer {
    variant: String,
    value: Option<Value>,
}

impl EnumDeserializer {
    fn new(variant: String, value: Option<Value>) -> Self {
        EnumDeserializer { variant, value }
    }
}

impl<'de> de::EnumAccess<'de> for EnumDeserializer {
    type Error = Error;
    type Variant = VariantDeserializer;

    fn variant_seed<V>(self, seed: V) -> Result<(V::Value, Self::Variant)>
    where
        V: de::DeserializeSeed<'de>,
    {
        let variant = seed.deserialize(ValueDeserializer::new(Value::from(self.variant)))?;
        let visitor = VariantDeserializer { value: self.value };
        Ok((variant, visitor))
    }
}

struct VariantDeserializer {
    value: Option<Value>,
}

impl<'de> de::VariantAccess<'de> for VariantDeserializer {
    type Error = Error;

    fn unit_variant(self) -> Result<()> {
        match self.value {
            None => Ok(()),
            Some(_) => Err(Error::custom("Expected unit variant")),
        }
    }

    fn newtype_variant_seed<T>(self, seed: T) -> Result<T::Value>
    where
        T: de::DeserializeSeed<'de>,
    {
        match self.value {
            Some(value) => seed.deserialize(ValueDeserializer::new(value)),
            None => Err(Error::custom("Expected newtype variant")),
        }
    }

    fn tuple_variant<V>(self, _len: usize, visitor: V) -> Result<V::Value>
    where
        V: de::Visitor<'de>,
    {
        match self.value {
            Some(Value::List(list)) => visitor.visit_seq(SeqDeserializer::new(list.to_vec())),
            _ => Err(Error::custom("Expected tuple variant")),
        }
    }

    fn struct_variant<V>(self, _fields: &'static [&'static str], visitor: V) -> Result<V::Value>
    where
        V: de::Visitor<'de>,
    {
        match self.value {
            Some(Value::Dict(dict)) => visitor.visit_map(MapDeserializer::new(dict.entries())),
            _ => Err(Error::custom("Expected struct variant")),
        }
    }
}
