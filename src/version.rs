//! Format generations and the one-line version header.
//!
//! Every stream starts with `version:<n>`. The header is read once per
//! top-level call and picks the encoder or decoder family for the rest of
//! the stream; generations are never mixed after it.
//!
//! ```text
//! version:2
//! list:1:2
//! str:2:1
//! word
//! alias:1:
//! ```

use crate::de::{Decoder, IdentityDecoder, PlainDecoder};
use crate::ser::{Encoder, IdentityEncoder, PlainEncoder};
use crate::stream::{LineReader, LineWriter};
use crate::{Error, Result, Value};
use std::fmt;
use std::io;
use tracing::debug;

const HEADER_TAG: &str = "version";

/// One of the two wire formats.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum Generation {
    /// Generation 1: `<kind>:<literal>`, every occurrence written in full.
    Plain,
    /// Generation 2: `<kind>:<token>:<literal>`, repeats written as `alias:<token>:`.
    #[default]
    IdentityAware,
}

impl Generation {
    /// The number written in the version header.
    #[inline]
    #[must_use]
    pub const fn number(self) -> u32 {
        match self {
            Generation::Plain => 1,
            Generation::IdentityAware => 2,
        }
    }

    /// Parses the number field of a version header.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use serde_persist::Generation;
    ///
    /// assert_eq!(Generation::from_number("1"), Some(Generation::Plain));
    /// assert_eq!(Generation::from_number("2"), Some(Generation::IdentityAware));
    /// assert_eq!(Generation::from_number("3"), None);
    /// ```
    #[must_use]
    pub fn from_number(field: &str) -> Option<Generation> {
        match field {
            "1" => Some(Generation::Plain),
            "2" => Some(Generation::IdentityAware),
            _ => None,
        }
    }
}

impl fmt::Display for Generation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Generation::Plain => f.write_str("plain"),
            Generation::IdentityAware => f.write_str("identity-aware"),
        }
    }
}

pub fn write_header<W: io::Write>(out: &mut LineWriter<W>, generation: Generation) -> Result<()> {
    out.write_line(format_args!("{}:{}", HEADER_TAG, generation.number()))
}

pub fn read_header<R: io::BufRead>(input: &mut LineReader<R>) -> Result<Generation> {
    let line = input.expect_line("a version header")?;
    let at = input.line_number();
    let (tag, number) = line.split_once(':').ok_or_else(|| {
        Error::format(at, &format!("expected 'version:<n>', found '{}'", line))
    })?;
    if tag != HEADER_TAG {
        return Err(Error::format(
            at,
            &format!("expected a version header, found tag '{}'", tag),
        ));
    }
    Generation::from_number(number).ok_or_else(|| Error::unsupported_version(at, number))
}

/// A writer bound to one generation for the whole stream.
pub enum StreamEncoder<W> {
    Plain(PlainEncoder<W>),
    IdentityAware(IdentityEncoder<W>),
}

impl<W: io::Write> StreamEncoder<W> {
    /// Writes the version header and returns the encoder for that generation.
    pub fn begin(sink: W, generation: Generation) -> Result<Self> {
        let mut out = LineWriter::new(sink);
        write_header(&mut out, generation)?;
        debug!(%generation, "writing stream");
        Ok(match generation {
            Generation::Plain => StreamEncoder::Plain(PlainEncoder::new(out)),
            Generation::IdentityAware => StreamEncoder::IdentityAware(IdentityEncoder::new(out)),
        })
    }

    #[must_use]
    pub fn generation(&self) -> Generation {
        match self {
            StreamEncoder::Plain(_) => Generation::Plain,
            StreamEncoder::IdentityAware(_) => Generation::IdentityAware,
        }
    }

    /// Flushes and returns the sink.
    pub fn finish(self) -> Result<W> {
        match self {
            StreamEncoder::Plain(encoder) => encoder.finish(),
            StreamEncoder::IdentityAware(encoder) => encoder.finish(),
        }
    }
}

impl<W: io::Write> Encoder for StreamEncoder<W> {
    fn encode(&mut self, value: &Value) -> Result<()> {
        match self {
            StreamEncoder::Plain(encoder) => encoder.encode(value),
            StreamEncoder::IdentityAware(encoder) => encoder.encode(value),
        }
    }
}

/// A reader bound to the generation its stream declares.
pub enum StreamDecoder<R> {
    Plain(PlainDecoder<R>),
    IdentityAware(IdentityDecoder<R>),
}

impl<R: io::BufRead> StreamDecoder<R> {
    /// Reads the version header and returns a decoder for the declared generation.
    ///
    /// `default` is the generation the entry point is bound to. When the
    /// stream declares the other one, decoding is handed off to a fresh
    /// decoder of that generation. The hand-off happens once, here; there is
    /// no further negotiation inside the stream.
    pub fn begin(source: R, default: Generation) -> Result<Self> {
        let mut input = LineReader::new(source);
        let declared = read_header(&mut input)?;
        if declared == default {
            debug!(generation = %declared, "reading stream");
        } else {
            debug!(
                from = %default,
                to = %declared,
                "stream declares the other generation, handing off"
            );
        }
        Ok(match declared {
            Generation::Plain => StreamDecoder::Plain(PlainDecoder::new(input)),
            Generation::IdentityAware => StreamDecoder::IdentityAware(IdentityDecoder::new(input)),
        })
    }

    #[must_use]
    pub fn generation(&self) -> Generation {
        match self {
            StreamDecoder::Plain(_) => Generation::Plain,
            StreamDecoder::IdentityAware(_) => Generation::IdentityAware,
        }
    }
}

impl<R: io::BufRead> Decoder for StreamDecoder<R> {
    fn decode(&mut self) -> Result<Value> {
        match self {
            StreamDecoder::Plain(decoder) => decoder.decode(),
            StreamDecoder::IdentityAware(decoder) => decoder.decode(),
        }
    }
}
