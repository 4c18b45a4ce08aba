//! Error types for persisting and restoring value graphs.
//!
//! Every failure on the read side carries the 1-based line number of the
//! stream line that caused it, so a corrupt file can be inspected by hand.
//!
//! ## Error Categories
//!
//! - **Stream errors**: the stream ended early or a line is not shaped like a record
//! - **Tag errors**: a record names a kind or a version this crate does not know
//! - **Identity errors**: an alias names a token that was never written, or a token is reused
//! - **Value errors**: a set element or mapping key is not hashable, or a cycle reached the plain format
//! - **I/O errors**: the underlying reader or writer failed
//!
//! ## Examples
//!
//! ```rust
//! use serde_persist::{from_str, Error};
//!
//! let result = from_str("version:1\nint\n");
//! assert!(matches!(result, Err(Error::Format { line: 2, .. })));
//! ```

use std::fmt;
use thiserror::Error;

/// Represents all possible errors that can occur while encoding or decoding a stream.
#[derive(Debug, Clone, Error)]
pub enum Error {
    /// IO error during reading or writing
    #[error("IO error: {0}")]
    Io(String),

    /// A line was required but the stream is exhausted
    #[error("Unexpected end of stream at line {line}: expected {expected}")]
    TruncatedStream { line: usize, expected: String },

    /// A line does not split into the expected colon-delimited fields
    #[error("Badly-formed line {line}: {msg}")]
    Format { line: usize, msg: String },

    /// The kind tag is outside the recognised set
    #[error("Unknown object type '{kind}' at line {line}")]
    UnknownKind { line: usize, kind: String },

    /// An alias refers to a token that has not been registered
    #[error("Alias at line {line} refers to unknown token {token}")]
    DanglingAlias { line: usize, token: u64 },

    /// A token was registered a second time
    #[error("Token {token} at line {line} was already used by an earlier record")]
    DuplicateToken { line: usize, token: u64 },

    /// The literal field cannot be parsed for its kind
    #[error("Invalid {kind} literal '{literal}' at line {line}")]
    InvalidLiteral {
        line: usize,
        kind: String,
        literal: String,
    },

    /// The version header names a generation this crate does not speak
    #[error("Unsupported format version '{found}' at line {line}")]
    UnsupportedVersion { line: usize, found: String },

    /// A composite value was used as a set element or mapping key
    #[error("Unhashable value of kind {0} cannot be a set element or mapping key")]
    Unhashable(String),

    /// A container reached itself while writing the plain format
    #[error("Cyclic value cannot be written in the plain format; use the identity-aware generation")]
    CycleInPlainFormat,

    /// Custom error
    #[error("Error: {0}")]
    Custom(String),
}

impl Error {
    /// Creates a truncated-stream error.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use serde_persist::Error;
    ///
    /// let err = Error::truncated(4, "3 string lines");
    /// assert!(err.to_string().contains("line 4"));
    /// ```
    pub fn truncated(line: usize, expected: &str) -> Self {
        Error::TruncatedStream {
            line,
            expected: expected.to_string(),
        }
    }

    /// Creates a format error for a line that is not a well-formed record.
    pub fn format(line: usize, msg: &str) -> Self {
        Error::Format {
            line,
            msg: msg.to_string(),
        }
    }

    /// Creates an unknown-kind error.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use serde_persist::Error;
    ///
    /// let err = Error::unknown_kind(2, "tuple");
    /// assert!(err.to_string().contains("tuple"));
    /// ```
    pub fn unknown_kind(line: usize, kind: &str) -> Self {
        Error::UnknownKind {
            line,
            kind: kind.to_string(),
        }
    }

    pub fn dangling_alias(line: usize, token: u64) -> Self {
        Error::DanglingAlias { line, token }
    }

    pub fn duplicate_token(line: usize, token: u64) -> Self {
        Error::DuplicateToken { line, token }
    }

    /// Creates an error for a literal that does not parse as its kind.
    pub fn invalid_literal(line: usize, kind: &str, literal: &str) -> Self {
        Error::InvalidLiteral {
            line,
            kind: kind.to_string(),
            literal: literal.to_string(),
        }
    }

    pub fn unsupported_version(line: usize, found: &str) -> Self {
        Error::UnsupportedVersion {
            line,
            found: found.to_string(),
        }
    }

    pub fn unhashable(kind: &str) -> Self {
        Error::Unhashable(kind.to_string())
    }

    /// Creates a custom error with a display message.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use serde_persist::Error;
    ///
    /// let err = Error::custom("something went wrong");
    /// assert!(err.to_string().contains("something went wrong"));
    /// ```
    pub fn custom<T: fmt::Display>(msg: T) -> Self {
        Error::Custom(msg.to_string())
    }

    /// Creates an I/O error for reader or writer failures.
    pub fn io(msg: &str) -> Self {
        Error::Io(msg.to_string())
    }

    /// The stream line the error points at, when it came from the read side.
    #[must_use]
    pub fn line(&self) -> Option<usize> {
        match self {
            Error::TruncatedStream { line, .. }
            | Error::Format { line, .. }
            | Error::UnknownKind { line, .. }
            | Error::DanglingAlias { line, .. }
            | Error::DuplicateToken { line, .. }
            | Error::InvalidLiteral { line, .. }
            | Error::UnsupportedVersion { line, .. } => Some(*line),
            _ => None,
        }
    }
}

impl From<std::io::Error> for Error {
    fn from(err: std::io::Error) -> Self {
        Error::io(&err.to_string())
    }
}

impl serde::ser::Error for Error {
    fn custom<T: fmt::Display>(msg: T) -> Self {
        Error::Custom(msg.to_string())
    }
}

impl serde::de::Error for Error {
    fn custom<T: fmt::Display>(msg: T) -> Self {
        Error::Custom(msg.to_string())
    }
}

pub type Result<T> = std::result::Result<T, Error>;
