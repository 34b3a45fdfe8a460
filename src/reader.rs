//! Encoding-agnostic line source.
//!
//! [`LineReader`] pulls raw bytes from any [`Read`] implementation, splits
//! them into logical lines on `CR`, `LF` or `CRLF` and decodes each line on
//! the way out. Bytes of an unterminated line are kept and the buffer grows
//! (doubling) until the terminator or the end of the stream shows up, so a
//! line may be arbitrarily long and no byte is ever read twice.
//!
//! The reader owns its buffer and its source; once the stream is exhausted,
//! or [`LineReader::reset`] is called, both are released and every further
//! call reports the end of input.

use crate::encoding::TextEncoding;
use crate::options::ImportOptions;
use encoding_rs::Encoding;
use std::io::{self, ErrorKind, Read};
use tracing::debug;

const CR: u16 = b'\r' as u16;
const LF: u16 = b'\n' as u16;

/// Forward-only line reader over a byte stream.
///
/// # Examples
///
/// ```rust
/// use reg_import::encoding::TextEncoding;
/// use reg_import::reader::LineReader;
/// use std::io::Cursor;
///
/// let mut reader = LineReader::new(Cursor::new("one\r\ntwo\rthree\n"), TextEncoding::Narrow);
/// assert_eq!(reader.next_line().unwrap().as_deref(), Some("one"));
/// assert_eq!(reader.next_line().unwrap().as_deref(), Some("two"));
/// assert_eq!(reader.next_line().unwrap().as_deref(), Some("three"));
/// assert_eq!(reader.next_line().unwrap(), None);
/// ```
pub struct LineReader<R> {
    source: Option<R>,
    encoding: TextEncoding,
    code_page: &'static Encoding,
    buf: Vec<u8>,
    /// Byte offset of the first unconsumed byte in `buf`.
    start: usize,
    /// Units after `start` already known to hold no terminator.
    scanned: usize,
    /// Capacity in code units.
    capacity: usize,
    initial_capacity: usize,
    eof: bool,
    line_number: usize,
}

impl<R: Read> LineReader<R> {
    /// Creates a reader with default options.
    pub fn new(source: R, encoding: TextEncoding) -> Self {
        Self::with_options(source, encoding, &ImportOptions::default())
    }

    /// Creates a reader using the code page and buffer size from `options`.
    pub fn with_options(source: R, encoding: TextEncoding, options: &ImportOptions) -> Self {
        let capacity = options.initial_buffer_units();
        Self {
            source: Some(source),
            encoding,
            code_page: options.code_page(),
            buf: Vec::with_capacity(capacity * encoding.unit_size()),
            start: 0,
            scanned: 0,
            capacity,
            initial_capacity: capacity,
            eof: false,
            line_number: 0,
        }
    }

    /// Seeds the reader with bytes that logically precede the stream.
    ///
    /// Used for the two bytes consumed by encoding detection when they turn
    /// out to be ordinary narrow content.
    pub fn with_prefix(mut self, prefix: &[u8]) -> Self {
        self.buf.extend_from_slice(prefix);
        self
    }

    /// Encoding this reader decodes.
    pub fn encoding(&self) -> TextEncoding {
        self.encoding
    }

    /// Number of lines returned so far.
    pub fn line_number(&self) -> usize {
        self.line_number
    }

    /// Current buffer capacity in code units.
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Returns true once the reader has been torn down.
    pub fn is_closed(&self) -> bool {
        self.source.is_none()
    }

    /// Returns the next decoded line without its terminator, or `None` at
    /// the end of the stream.
    ///
    /// A trailing line without a terminator is returned as is. An odd
    /// trailing byte of a wide stream is not a code unit and is dropped.
    ///
    /// # Errors
    ///
    /// Propagates read errors from the underlying source.
    pub fn next_line(&mut self) -> io::Result<Option<String>> {
        if self.is_closed() {
            return Ok(None);
        }

        let unit = self.encoding.unit_size();
        loop {
            let pending = &self.buf[self.start..];
            let units = pending.len() / unit;

            if let Some((end, next)) = self.find_line_end(pending, units) {
                let line = self.encoding.decode(&pending[..end * unit], self.code_page);
                self.start += next * unit;
                self.scanned = 0;
                self.line_number += 1;
                return Ok(Some(line));
            }

            if self.eof {
                if units == 0 {
                    self.reset();
                    return Ok(None);
                }
                let line = self.encoding.decode(&pending[..units * unit], self.code_page);
                self.start = self.buf.len();
                self.scanned = 0;
                self.line_number += 1;
                return Ok(Some(line));
            }

            // The last unit may be a CR still waiting for its LF.
            self.scanned = units.saturating_sub(1);
            self.fill()?;
        }
    }

    /// Releases the buffer and the source.
    ///
    /// Every later call to [`next_line`](Self::next_line) returns `None`.
    pub fn reset(&mut self) {
        if self.source.take().is_some() {
            debug!(lines = self.line_number, "Line reader torn down");
        }
        self.buf = Vec::new();
        self.start = 0;
        self.scanned = 0;
        self.capacity = self.initial_capacity;
        self.eof = true;
    }

    /// Finds the end of the first line in `pending`.
    ///
    /// Returns the line length and the offset of the next line, both in
    /// units. A `CR` in the last unit is only a terminator once the stream
    /// is exhausted, since an `LF` may still follow.
    fn find_line_end(&self, pending: &[u8], units: usize) -> Option<(usize, usize)> {
        for i in self.scanned.min(units)..units {
            match self.encoding.unit_at(pending, i) {
                LF => return Some((i, i + 1)),
                CR if i + 1 < units => {
                    let next = if self.encoding.unit_at(pending, i + 1) == LF {
                        i + 2
                    } else {
                        i + 1
                    };
                    return Some((i, next));
                }
                CR if self.eof => return Some((i, i + 1)),
                CR => return None,
                _ => {}
            }
        }
        None
    }

    /// Moves the unterminated tail to the front of the buffer and reads more.
    fn fill(&mut self) -> io::Result<()> {
        let unit = self.encoding.unit_size();

        if self.start > 0 {
            self.buf.drain(..self.start);
            self.start = 0;
        }

        let pending_units = self.buf.len() / unit;
        while self.capacity.saturating_sub(pending_units) < 3 {
            self.capacity *= 2;
            debug!(capacity = self.capacity, "Line buffer grown");
        }

        let old_len = self.buf.len();
        let want = (self.capacity - pending_units - 1) * unit;
        self.buf.resize(old_len + want, 0);

        let Some(source) = self.source.as_mut() else {
            self.buf.truncate(old_len);
            self.eof = true;
            return Ok(());
        };

        let count = loop {
            match source.read(&mut self.buf[old_len..]) {
                Ok(count) => break count,
                Err(e) if e.kind() == ErrorKind::Interrupted => continue,
                Err(e) => {
                    self.buf.truncate(old_len);
                    return Err(e);
                }
            }
        };

        self.buf.truncate(old_len + count);
        if count == 0 {
            self.eof = true;
        }
        Ok(())
    }
}

impl<R: Read> Iterator for LineReader<R> {
    type Item = io::Result<String>;

    fn next(&mut self) -> Option<Self::Item> {
        self.next_line().transpose()
    }
}
