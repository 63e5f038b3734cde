//! Positional line wrapping of record streams.
//!
//! ISIS exports wrap the raw record bytes onto fixed-width lines (80 bytes by
//! default) separated by a newline marker. The wrap counts raw bytes only; it
//! knows nothing about fields or records, so payload bytes that happen to equal
//! the newline marker pass through untouched.
//!
//! [`LineSplitReader`] removes the markers on read and [`LineSplitWriter`]
//! inserts them on write. Both hold the cursor state of a single record; the
//! record codec creates a fresh pair for each record, so every record starts on
//! a new line and ends with its own (possibly short) final line.
//!
//! # Examples
//!
//! ```
//! use isorec::line_split::{LineSplitReader, LineSplitWriter};
//! use std::io::{Read, Write};
//! use std::num::NonZeroUsize;
//!
//! let width = NonZeroUsize::new(4).unwrap();
//! let mut wrapped = Vec::new();
//! {
//!     let mut writer = LineSplitWriter::new(&mut wrapped, width, b"\n");
//!     writer.write_all(b"0123456789")?;
//!     writer.finish()?;
//! }
//! assert_eq!(wrapped, b"0123\n4567\n89\n");
//!
//! let mut reader = LineSplitReader::new(&wrapped[..], width, b"\n");
//! let mut data = vec![0u8; 10];
//! reader.read_exact(&mut data)?;
//! reader.finish()?;
//! assert_eq!(data, b"0123456789");
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

use crate::error::{IsoError, Result};
use std::io::{self, Read, Write};
use std::num::NonZeroUsize;
use tracing::trace;

/// Reader that strips a newline marker after every `line_len` raw bytes.
///
/// The reader looks ahead by one marker length so it can tell the marker
/// closing a partial final line from payload. It never pulls more bytes from
/// the inner reader than the caller asked for plus one marker, and never reads
/// past the marker of the current line.
///
/// An empty marker disables the check: lines are cut positionally with
/// nothing between them.
#[derive(Debug)]
pub struct LineSplitReader<R: Read> {
    inner: R,
    line_len: NonZeroUsize,
    newline: Vec<u8>,
    /// Bytes left in the current line that have not been handed out yet.
    next_boundary: usize,
    /// Bytes already taken from `inner` and not yet handed out. Holds the
    /// lookahead and, at a line boundary, the marker under inspection.
    pending: Vec<u8>,
    inner_eof: bool,
    exhausted: bool,
}

impl<R: Read> LineSplitReader<R> {
    /// Create a reader expecting `newline` after every `line_len` bytes.
    pub fn new(inner: R, line_len: NonZeroUsize, newline: &[u8]) -> Self {
        LineSplitReader {
            inner,
            line_len,
            newline: newline.to_vec(),
            next_boundary: line_len.get(),
            pending: Vec::with_capacity(line_len.get() + newline.len()),
            inner_eof: false,
            exhausted: false,
        }
    }

    /// Returns `true` if the cursor sits at the start of a line.
    #[must_use]
    pub fn at_line_start(&self) -> bool {
        self.next_boundary == self.line_len.get()
    }

    /// Close the current line.
    ///
    /// A partial final line must be followed by the newline marker, unless
    /// the input ends right there.
    ///
    /// # Errors
    ///
    /// Returns [`IsoError::LineSplitFraming`] if other data follows the
    /// partial line, or an IO error from the inner reader.
    pub fn finish(&mut self) -> Result<()> {
        if self.exhausted || self.at_line_start() {
            return Ok(());
        }
        self.fill_pending(self.newline.len())?;
        if self.pending == self.newline {
            self.pending.clear();
            self.next_boundary = self.line_len.get();
            Ok(())
        } else if self.pending.is_empty() {
            // The last line may omit its marker at the true end of input.
            self.exhausted = true;
            Ok(())
        } else {
            Err(self.framing_error(&self.pending))
        }
    }

    /// Top up `pending` to `target` bytes, stopping early only at end of input.
    fn fill_pending(&mut self, target: usize) -> io::Result<()> {
        let start = self.pending.len();
        if self.inner_eof || start >= target {
            return Ok(());
        }
        self.pending.resize(target, 0);
        match read_full(&mut self.inner, &mut self.pending[start..]) {
            Ok(got) => {
                self.pending.truncate(start + got);
                self.inner_eof = start + got < target;
                Ok(())
            },
            Err(e) => {
                self.pending.truncate(start);
                Err(e)
            },
        }
    }

    fn framing_error(&self, found: &[u8]) -> IsoError {
        IsoError::LineSplitFraming(format!(
            "expected newline marker {:?} after {} bytes, found {:?}",
            String::from_utf8_lossy(&self.newline),
            self.line_len,
            String::from_utf8_lossy(found)
        ))
    }
}

impl<R: Read> Read for LineSplitReader<R> {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        if buf.is_empty() || self.exhausted {
            return Ok(0);
        }
        let marker_len = self.newline.len();
        let want = buf.len().min(self.next_boundary);
        self.fill_pending(want + marker_len)?;

        let n = if self.pending.len() >= want + marker_len {
            want
        } else {
            // Input ends within reach of the cursor.
            let line_part = self.pending.len().min(self.next_boundary);
            if self.pending.len() > line_part {
                return Err(self.framing_error(&self.pending[line_part..]).into_io());
            }
            let data_len = if self.pending.ends_with(&self.newline) {
                line_part - marker_len
            } else {
                line_part
            };
            if data_len == 0 {
                self.pending.clear();
                self.exhausted = true;
                return Ok(0);
            }
            want.min(data_len)
        };

        buf[..n].copy_from_slice(&self.pending[..n]);
        self.pending.drain(..n);
        self.next_boundary -= n;
        if self.next_boundary == 0 {
            self.next_boundary = self.line_len.get();
            if self.pending == self.newline {
                self.pending.clear();
            } else if self.pending.is_empty() && self.inner_eof {
                self.exhausted = true;
            } else {
                return Err(self.framing_error(&self.pending).into_io());
            }
        }
        Ok(n)
    }
}

/// Writer that inserts a newline marker after every `line_len` bytes.
///
/// Bytes are held back until a whole line is available. [`finish`] writes the
/// trailing partial line followed by one marker; dropping the writer does the
/// same but ignores errors.
///
/// After the inner writer fails, the buffered bytes are discarded and every
/// later write is rejected.
///
/// [`finish`]: LineSplitWriter::finish
#[derive(Debug)]
pub struct LineSplitWriter<W: Write> {
    inner: W,
    line_len: NonZeroUsize,
    newline: Vec<u8>,
    buffer: Vec<u8>,
    failed: bool,
}

impl<W: Write> LineSplitWriter<W> {
    /// Create a writer inserting `newline` after every `line_len` bytes.
    pub fn new(inner: W, line_len: NonZeroUsize, newline: &[u8]) -> Self {
        LineSplitWriter {
            inner,
            line_len,
            newline: newline.to_vec(),
            buffer: Vec::with_capacity(line_len.get()),
            failed: false,
        }
    }

    /// Write the buffered partial line, if any, followed by one newline
    /// marker.
    ///
    /// The inner writer is neither flushed nor closed.
    ///
    /// # Errors
    ///
    /// Returns an error if writing to the inner writer fails, now or on an
    /// earlier write.
    pub fn finish(&mut self) -> Result<()> {
        if self.failed {
            return Err(writer_failed().into());
        }
        if !self.buffer.is_empty() {
            trace!(bytes = self.buffer.len(), "flushing partial line");
            let result = self
                .inner
                .write_all(&self.buffer)
                .and_then(|()| self.inner.write_all(&self.newline));
            self.buffer.clear();
            if let Err(e) = result {
                self.failed = true;
                return Err(e.into());
            }
        }
        Ok(())
    }
}

impl<W: Write> Write for LineSplitWriter<W> {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        if self.failed {
            return Err(writer_failed());
        }
        self.buffer.extend_from_slice(buf);
        let width = self.line_len.get();
        let mut start = 0;
        while self.buffer.len() - start >= width {
            let line = &self.buffer[start..start + width];
            if let Err(e) = self
                .inner
                .write_all(line)
                .and_then(|()| self.inner.write_all(&self.newline))
            {
                self.buffer.clear();
                self.failed = true;
                return Err(e);
            }
            start += width;
        }
        self.buffer.drain(..start);
        Ok(buf.len())
    }

    /// Flushes the inner writer. A partial line stays buffered until
    /// [`finish`](LineSplitWriter::finish).
    fn flush(&mut self) -> io::Result<()> {
        self.inner.flush()
    }
}

impl<W: Write> Drop for LineSplitWriter<W> {
    fn drop(&mut self) {
        if !self.failed && !self.buffer.is_empty() {
            let _ = self.finish();
        }
    }
}

fn writer_failed() -> io::Error {
    io::Error::new(
        io::ErrorKind::Other,
        "line writer is unusable after an earlier write error",
    )
}

/// Fill `buf` as far as the reader allows, returning the number of bytes read.
///
/// Unlike [`Read::read_exact`] a short count is not an error, so callers can
/// tell a clean end of input (0) from a truncated one.
pub(crate) fn read_full<R: Read + ?Sized>(reader: &mut R, buf: &mut [u8]) -> io::Result<usize> {
    let mut filled = 0;
    while filled < buf.len() {
        match reader.read(&mut buf[filled..]) {
            Ok(0) => break,
            Ok(n) => filled += n,
            Err(e) if e.kind() == io::ErrorKind::Interrupted => {},
            Err(e) => return Err(e),
        }
    }
    Ok(filled)
}
