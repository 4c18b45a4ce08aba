//! # serde_persist
//!
//! A line-oriented persistence format for value graphs that may share
//! objects or contain cycles.
//!
//! ## What does it persist?
//!
//! A [`Value`] is a boolean, an integer, a float, a string, or a list, set,
//! or dict of values. Strings and containers are reference-counted handles:
//! the same list can sit at two positions of a graph, and a list can contain
//! itself. The format writes such a graph in one pass and reads it back with
//! the same shape.
//!
//! ## Key Features
//!
//! - **Two generations**: the plain format (`version:1`) writes every
//!   occurrence in full; the identity-aware format (`version:2`) writes each
//!   object once and refers back to it with an alias record
//! - **Cycle safe**: self-referencing graphs encode finitely and decode to
//!   the same cycle
//! - **Version dispatch**: a reader bound to one generation reads streams of
//!   the other
//! - **Serde bridge**: any `T: Serialize` converts to a [`Value`] and back
//!
//! ## Quick Start
//!
//! ```rust
//! use serde_persist::{from_str, to_string, List, Value};
//!
//! // v = ["word"]; v.append(v)
//! let list = List::new();
//! list.push(Value::from("word"));
//! list.push(Value::List(list.clone()));
//! let value = Value::List(list.clone());
//!
//! let text = to_string(&value).unwrap();
//! assert_eq!(text, "version:2\nlist:1:2\nstr:2:1\nword\nalias:1:\n");
//!
//! let back = from_str(&text).unwrap();
//! let items = back.as_list().unwrap();
//! assert_eq!(items.len(), 2);
//! assert!(items.get(1).unwrap().same_object(&back));
//! # list.clear();
//! # items.clear();
//! ```
//!
//! ### The Plain Generation
//!
//! ```rust
//! use serde_persist::{from_str, to_string_with_options, Options, Value};
//!
//! let word = Value::str("word");
//! let value = Value::list(vec![word.clone(), word]);
//!
//! let text = to_string_with_options(&value, Options::plain()).unwrap();
//! assert_eq!(text, "version:1\nlist:2\nstr:1\nword\nstr:1\nword\n");
//!
//! // Equal, but no longer the same object.
//! let back = from_str(&text).unwrap();
//! let items = back.as_list().unwrap().to_vec();
//! assert_eq!(items[0], items[1]);
//! assert!(!items[0].same_object(&items[1]));
//! ```
//!
//! ### Building Values with value! Macro
//!
//! ```rust
//! use serde_persist::value;
//!
//! let data = value!({
//!     "name": "Alice",
//!     "tags": ["rust", "serde"],
//!     "flags": {true, 7}
//! });
//!
//! let dict = data.as_dict().unwrap();
//! assert_eq!(dict.get("name").unwrap().as_str(), Some("Alice"));
//! ```
//!
//! ### Typed Data
//!
//! ```rust
//! use serde::{Deserialize, Serialize};
//! use serde_persist::{from_str, from_value, to_string, to_value};
//!
//! #[derive(Serialize, Deserialize, PartialEq, Debug)]
//! struct User {
//!     id: u32,
//!     name: String,
//!     active: bool,
//! }
//!
//! let user = User { id: 123, name: "Alice".to_string(), active: true };
//!
//! let text = to_string(&to_value(&user).unwrap()).unwrap();
//! let user_back: User = from_value(from_str(&text).unwrap()).unwrap();
//! assert_eq!(user, user_back);
//! ```
//!
//! ## Logging
//!
//! The crate emits [`tracing`] events: `debug` when a stream's generation is
//! chosen or handed off, `trace` for every record. It never installs a
//! subscriber.
//!
//! ## Safety Guarantees
//!
//! - No `unsafe` code blocks
//! - Element counts read from a stream never drive allocation unchecked
//! - Every decode error names the line it happened on
//! - Encoding never mutates the value being written

pub mod de;
pub mod error;
pub mod format;
pub mod identity;
pub mod key;
pub mod macros;
pub mod map;
pub mod options;
pub mod ser;
pub mod stream;
pub mod value;
pub mod version;

pub use de::{Decoder, IdentityDecoder, PlainDecoder, ValueDeserializer};
pub use error::{Error, Result};
pub use identity::{ObjectId, Token};
pub use key::Key;
pub use map::{Dict, Set};
pub use options::{Generation, Options};
pub use ser::{Encoder, IdentityEncoder, PlainEncoder, ValueSerializer};
pub use value::{Kind, List, Value};
pub use version::{StreamDecoder, StreamEncoder};

use serde::de::DeserializeOwned;
use serde::Serialize;
use std::io;

/// Writes `value` to `writer` in the identity-aware generation.
///
/// # Examples
///
/// ```rust
/// use serde_persist::{encode, Value};
///
/// let mut buffer = Vec::new();
/// encode(&Value::from(5), &mut buffer).unwrap();
/// assert_eq!(buffer, b"version:2\nint:1:5\n");
/// ```
///
/// # Errors
///
/// Returns an error if writing to the writer fails.
#[must_use = "this returns the result of the operation, errors must be handled"]
pub fn encode<W>(value: &Value, writer: W) -> Result<()>
where
    W: io::Write,
{
    encode_with_options(value, writer, Options::default())
}

/// Writes `value` to `writer` in the generation chosen by `options`.
///
/// # Errors
///
/// Returns an error if writing fails, or [`Error::CycleInPlainFormat`] if the
/// plain generation meets a container that contains itself.
#[must_use = "this returns the result of the operation, errors must be handled"]
pub fn encode_with_options<W>(value: &Value, writer: W, options: Options) -> Result<()>
where
    W: io::Write,
{
    let mut encoder = StreamEncoder::begin(writer, options.generation)?;
    encoder.encode(value)?;
    encoder.finish()?;
    Ok(())
}

/// Reads one value from `reader`, accepting either generation.
///
/// # Examples
///
/// ```rust
/// use serde_persist::{decode, Value};
///
/// let value = decode("version:1\nfloat:0.5\n".as_bytes()).unwrap();
/// assert_eq!(value, Value::from(0.5));
/// ```
///
/// # Errors
///
/// Returns an error if reading fails or the stream is malformed. Nothing is
/// returned for a partially decoded stream.
#[must_use = "this returns the result of the operation, errors must be handled"]
pub fn decode<R>(reader: R) -> Result<Value>
where
    R: io::BufRead,
{
    decode_with_options(reader, Options::default())
}

/// Reads one value from `reader` with a reader bound to `options.generation`.
///
/// A stream that declares the other generation is handed off to a decoder
/// of that generation after the header.
///
/// # Errors
///
/// Returns an error if reading fails or the stream is malformed.
#[must_use = "this returns the result of the operation, errors must be handled"]
pub fn decode_with_options<R>(reader: R, options: Options) -> Result<Value>
where
    R: io::BufRead,
{
    let mut decoder = StreamDecoder::begin(reader, options.generation)?;
    decoder.decode()
}

/// Encodes `value` into a string in the identity-aware generation.
///
/// # Examples
///
/// ```rust
/// use serde_persist::{to_string, Value};
///
/// let text = to_string(&Value::from("two\nlines")).unwrap();
/// assert_eq!(text, "version:2\nstr:1:2\ntwo\nlines\n");
/// ```
///
/// # Errors
///
/// See [`encode_with_options`].
#[must_use = "this returns the result of the operation, errors must be handled"]
pub fn to_string(value: &Value) -> Result<String> {
    to_string_with_options(value, Options::default())
}

/// Encodes `value` into a string in the generation chosen by `options`.
///
/// # Errors
///
/// See [`encode_with_options`].
#[must_use = "this returns the result of the operation, errors must be handled"]
pub fn to_string_with_options(value: &Value, options: Options) -> Result<String> {
    let mut buffer = Vec::with_capacity(128);
    encode_with_options(value, &mut buffer, options)?;
    String::from_utf8(buffer).map_err(|e| Error::custom(e.to_string()))
}

/// Decodes one value from a string.
///
/// # Examples
///
/// ```rust
/// use serde_persist::from_str;
///
/// let value = from_str("version:2\nlist:1:1\nbool:2:True\n").unwrap();
/// assert_eq!(value.as_list().unwrap().get(0).unwrap().as_bool(), Some(true));
/// ```
///
/// # Errors
///
/// Returns an error if the text is not a well-formed stream. Error messages
/// include the line number.
#[must_use = "this returns the result of the operation, errors must be handled"]
pub fn from_str(s: &str) -> Result<Value> {
    from_str_with_options(s, Options::default())
}

/// Decodes one value from a string with a reader bound to `options.generation`.
///
/// # Errors
///
/// See [`from_str`].
#[must_use = "this returns the result of the operation, errors must be handled"]
pub fn from_str_with_options(s: &str, options: Options) -> Result<Value> {
    decode_with_options(s.as_bytes(), options)
}

/// Decodes one value from bytes.
///
/// # Errors
///
/// Returns an error if the bytes are not valid UTF-8 or not a well-formed
/// stream.
#[must_use = "this returns the result of the operation, errors must be handled"]
pub fn from_slice(v: &[u8]) -> Result<Value> {
    let s = std::str::from_utf8(v).map_err(|e| Error::custom(e.to_string()))?;
    from_str(s)
}

/// Converts any `T: Serialize` to a [`Value`].
///
/// Structs and maps become dicts, sequences and tuples become lists, unit
/// enum variants become strings, and data-carrying variants become a dict
/// with a single entry keyed by the variant name.
///
/// # Examples
///
/// ```rust
/// use serde_persist::to_value;
/// use serde::Serialize;
///
/// #[derive(Serialize)]
/// struct Point { x: i32, y: i32 }
///
/// let value = to_value(&Point { x: 1, y: 2 }).unwrap();
/// assert!(value.is_dict());
/// ```
///
/// # Errors
///
/// Returns an error for data the value model has no kind for: `None`, unit,
/// and map keys that are not hashable.
#[must_use = "this returns the result of the operation, errors must be handled"]
pub fn to_value<T>(value: &T) -> Result<Value>
where
    T: ?Sized + Serialize,
{
    value.serialize(ValueSerializer)
}

/// Converts a [`Value`] into any `T: DeserializeOwned`.
///
/// # Examples
///
/// ```rust
/// use serde_persist::{from_value, value};
///
/// let numbers: Vec<i32> = from_value(value!([1, 2, 3])).unwrap();
/// assert_eq!(numbers, vec![1, 2, 3]);
/// ```
///
/// # Errors
///
/// Returns an error if the value does not have the shape `T` expects, or if
/// it contains a cycle.
#[must_use = "this returns the result of the operation, errors must be handled"]
pub fn from_value<T>(value: Value) -> Result<T>
where
    T: DeserializeOwned,
{
    if value.contains_cycle() {
        return Err(Error::custom(
            "cyclic value cannot be deserialized through serde",
        ));
    }
    T::deserialize(ValueDeserializer::new(value))
}
