//! Line-oriented stream plumbing shared by the encoders and decoders.
//!
//! [`LineWriter`] appends newline-terminated lines to any [`io::Write`].
//! [`LineReader`] hands out lines from any [`io::BufRead`] in order and
//! remembers the number of the last line it returned, which the decoders
//! attach to every error.

use crate::{Error, Result};
use std::fmt;
use std::io;

pub struct LineWriter<W> {
    inner: W,
    lines: usize,
}

impl<W: io::Write> LineWriter<W> {
    pub fn new(inner: W) -> Self {
        LineWriter { inner, lines: 0 }
    }

    /// Writes one record or payload line followed by `\n`.
    pub fn write_line(&mut self, line: fmt::Arguments<'_>) -> Result<()> {
        self.inner.write_fmt(line)?;
        self.inner.write_all(b"\n")?;
        self.lines += 1;
        Ok(())
    }

    /// Number of lines written so far.
    pub fn lines_written(&self) -> usize {
        self.lines
    }

    /// Flushes and returns the underlying writer.
    pub fn finish(mut self) -> Result<W> {
        self.inner.flush()?;
        Ok(self.inner)
    }
}

pub struct LineReader<R> {
    inner: R,
    line: usize,
    buf: String,
}

impl<R: io::BufRead> LineReader<R> {
    pub fn new(inner: R) -> Self {
        LineReader {
            inner,
            line: 0,
            buf: String::new(),
        }
    }

    /// Reads the next line without its terminating `\n`.
    ///
    /// Returns `None` once the stream is exhausted. A final line without a
    /// terminator is still returned. Carriage returns are content and are kept.
    pub fn next_line(&mut self) -> Result<Option<String>> {
        self.buf.clear();
        let read = self.inner.read_line(&mut self.buf)?;
        if read == 0 {
            return Ok(None);
        }
        self.line += 1;
        if self.buf.ends_with('\n') {
            self.buf.pop();
        }
        Ok(Some(std::mem::take(&mut self.buf)))
    }

    /// Reads the next line, treating end of stream as truncation.
    pub fn expect_line(&mut self, expected: &str) -> Result<String> {
        match self.next_line()? {
            Some(line) => Ok(line),
            None => Err(Error::truncated(self.line + 1, expected)),
        }
    }

    /// The 1-based number of the line most recently returned.
    pub fn line_number(&self) -> usize {
        self.line
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_writer_terminates_each_line() {
        let mut out = LineWriter::new(Vec::new());
        out.write_line(format_args!("{}:{}", "int", 7)).unwrap();
        out.write_line(format_args!("")).unwrap();
        assert_eq!(out.lines_written(), 2);
        assert_eq!(out.finish().unwrap(), b"int:7\n\n");
    }

    #[test]
    fn test_reader_strips_only_the_newline() {
        let mut input = LineReader::new("a:b\r\n\nlast".as_bytes());
        assert_eq!(input.next_line().unwrap().as_deref(), Some("a:b\r"));
        assert_eq!(input.next_line().unwrap().as_deref(), Some(""));
        assert_eq!(input.next_line().unwrap().as_deref(), Some("last"));
        assert_eq!(input.line_number(), 3);
        assert_eq!(input.next_line().unwrap(), None);
    }

    #[test]
    fn test_expect_line_reports_the_missing_line() {
        let mut input = LineReader::new("only\n".as_bytes());
        input.expect_line("a record").unwrap();
        match input.expect_line("a record") {
            Err(Error::TruncatedStream { line, expected }) => {
                assert_eq!(line, 2);
                assert_eq!(expected, "a record");
            }
            other => panic!("Expected truncation, got {:?}", other),
        }
    }
}
