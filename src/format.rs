//! The Wire Format
//!
//! This module documents the stream layout written and read by this crate.
//!
//! # Overview
//!
//! A stream is a sequence of newline-terminated text lines. The first line
//! is a version header; the rest is one value written depth-first, one
//! record per line, with string payloads spilling onto the lines after their
//! record.
//!
//! ```text
//! version:2
//! list:1:2
//! str:2:1
//! word
//! alias:1:
//! ```
//!
//! # Version Header
//!
//! | Header | Generation |
//! |--------|------------|
//! | `version:1` | plain |
//! | `version:2` | identity-aware |
//!
//! The header appears once, at the top. Any other number is rejected with
//! [`Error::UnsupportedVersion`](crate::Error::UnsupportedVersion); a first
//! line that is not a header at all is
//! [`Error::Format`](crate::Error::Format).
//!
//! # Records
//!
//! ## Plain (generation 1)
//!
//! ```text
//! <kind>:<literal>
//! ```
//!
//! ## Identity-Aware (generation 2)
//!
//! ```text
//! <kind>:<token>:<literal>
//! alias:<token>:
//! ```
//!
//! Tokens are decimal integers assigned from 1 in the order objects are
//! first written. An `alias` record stands for the object written earlier
//! under that token. Only the first two colons of a record are separators;
//! the literal may contain more.
//!
//! ## Kinds and Literals
//!
//! | Kind | Literal | Example |
//! |------|---------|---------|
//! | `bool` | `True` or `False` | `bool:True` |
//! | `int` | Decimal digits, optional `-`, any size | `int:-42` |
//! | `float` | Shortest round-trip form, `inf`, `-inf`, `NaN` | `float:0.1` |
//! | `str` | Number of payload lines | `str:2` |
//! | `list` | Number of elements | `list:3` |
//! | `set` | Number of elements | `set:0` |
//! | `dict` | Number of key/value pairs | `dict:1` |
//!
//! ## Strings
//!
//! A string is split on `\n`; the literal is the number of pieces and the
//! pieces follow verbatim on their own lines. The empty string is one empty
//! line. Payload lines are never parsed as records, so they may contain
//! colons or look like records themselves:
//!
//! ```rust
//! use serde_persist::{from_str, to_string_with_options, Options, Value};
//!
//! let value = Value::from("int:1\n");
//! let text = to_string_with_options(&value, Options::plain()).unwrap();
//! assert_eq!(text, "version:1\nstr:2\nint:1\n\n");
//! assert_eq!(from_str(&text).unwrap(), value);
//! ```
//!
//! ## Containers
//!
//! Lists and sets are followed by their elements, dicts by alternating keys
//! and values. Set elements and dict keys must be booleans, numbers, or
//! strings.
//!
//! ```text
//! version:1
//! dict:1
//! str:1
//! primes
//! set:2
//! int:2
//! int:3
//! ```
//!
//! # Identity
//!
//! In the identity-aware generation every string, list, set, and dict is
//! written once. Later occurrences of the same object become alias records,
//! which is what lets a container refer to itself:
//!
//! ```rust
//! use serde_persist::{to_string, List, Value};
//!
//! let list = List::new();
//! list.push(Value::List(list.clone()));
//! assert_eq!(to_string(&Value::List(list.clone())).unwrap(), "version:2\nlist:1:1\nalias:1:\n");
//! list.clear();
//! ```
//!
//! Booleans and numbers have no identity: each occurrence gets a fresh token
//! and is never aliased. Equal strings that are separate objects are written
//! separately.
//!
//! # Edge Cases
//!
//! - Lines after the top-level value are not read
//! - Carriage returns are payload, not line terminators
//! - A cyclic value cannot be written in the plain generation; encoding
//!   fails with [`Error::CycleInPlainFormat`](crate::Error::CycleInPlainFormat)
//! - An alias in a plain stream is an unknown kind
//! - A token registered twice is
//!   [`Error::DuplicateToken`](crate::Error::DuplicateToken)

// This module contains only documentation; no implementation code
