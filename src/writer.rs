//! Writing records to byte streams.
//!
//! This module provides [`IsoWriter`] for serializing [`Record`] instances to
//! line-wrapped ISO 2709 that can be written to any destination implementing
//! [`std::io::Write`].
//!
//! # Examples
//!
//! Writing to a buffer:
//!
//! ```
//! use isorec::{IsoWriter, Record};
//!
//! let mut buffer = Vec::new();
//! {
//!     let mut writer = IsoWriter::new(&mut buffer);
//!     let record = Record::builder().field(*b"245", "Title text").build();
//!     writer.write_record(&record)?;
//!     writer.finish()?;
//! }
//! assert!(buffer.ends_with(b"Title text##\n"));
//! # Ok::<(), isorec::IsoError>(())
//! ```

use crate::config::CodecConfig;
use crate::error::{IsoError, Result};
use crate::formats::FormatWriter;
use crate::line_split::LineSplitWriter;
use crate::record::{encode_record, Record};
use std::io::Write;
use tracing::{debug, trace};

/// Writer for line-wrapped ISO 2709 records.
///
/// Every record is encoded with freshly derived lengths and offsets, then
/// written starting on a new line; its last partial line is closed with a
/// newline marker.
///
/// # Examples
///
/// ```
/// use isorec::{CodecConfig, IsoWriter, Record};
///
/// let mut buffer = Vec::new();
/// let mut writer = IsoWriter::new(&mut buffer)
///     .with_config(CodecConfig::default().with_line_len(0));
/// writer.write_record(&Record::new())?;
/// writer.finish()?;
/// assert_eq!(buffer, b"000260000000000250004500##");
/// # Ok::<(), isorec::IsoError>(())
/// ```
#[derive(Debug)]
pub struct IsoWriter<W: Write> {
    writer: W,
    config: CodecConfig,
    records_written: usize,
    finished: bool,
}

impl<W: Write> IsoWriter<W> {
    /// Create a writer with the default configuration.
    ///
    /// # Arguments
    ///
    /// * `writer` - Any destination implementing [`std::io::Write`]
    pub fn new(writer: W) -> Self {
        IsoWriter {
            writer,
            config: CodecConfig::default(),
            records_written: 0,
            finished: false,
        }
    }

    /// Use the given codec configuration.
    #[must_use]
    pub fn with_config(mut self, config: CodecConfig) -> Self {
        self.config = config;
        self
    }

    /// Write a single record.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - The writer was already finished
    /// - A derived length or offset does not fit its field width
    /// - An I/O error occurs during writing
    pub fn write_record(&mut self, record: &Record) -> Result<()> {
        if self.finished {
            return Err(IsoError::WriterFinished);
        }

        let encoded = encode_record(record, &self.config)?;
        write_framed(&mut self.writer, &encoded, &self.config)?;
        self.records_written += 1;
        Ok(())
    }

    /// Flush the writer and mark it as finished.
    ///
    /// After calling `finish`, no more records can be written.
    ///
    /// # Errors
    ///
    /// Returns an error if flushing the underlying writer fails.
    pub fn finish(&mut self) -> Result<()> {
        self.writer.flush()?;
        self.finished = true;
        debug!(records = self.records_written, "finished record stream");
        Ok(())
    }

    /// Returns the number of records written so far.
    #[must_use]
    pub fn records_written(&self) -> usize {
        self.records_written
    }
}

impl<W: Write + std::fmt::Debug> FormatWriter for IsoWriter<W> {
    fn write_record(&mut self, record: &Record) -> Result<()> {
        IsoWriter::write_record(self, record)
    }

    fn finish(&mut self) -> Result<()> {
        IsoWriter::finish(self)
    }

    fn records_written(&self) -> Option<usize> {
        Some(self.records_written)
    }
}

/// Write one encoded record, line wrapping it if `config` enables it.
pub(crate) fn write_framed<W: Write + ?Sized>(
    out: &mut W,
    encoded: &[u8],
    config: &CodecConfig,
) -> Result<()> {
    match config.line_width() {
        Some(width) => {
            let mut lines = LineSplitWriter::new(out, width, &config.newline);
            lines.write_all(encoded)?;
            lines.finish()?;
        },
        None => out.write_all(encoded)?,
    }
    trace!(bytes = encoded.len(), "wrote record");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::reader::IsoReader;

    #[test]
    fn test_write_simple_record() {
        let record = Record::builder().field(*b"245", "Title text").build();

        let mut buffer = Vec::new();
        let mut writer = IsoWriter::new(&mut buffer);
        writer.write_record(&record).unwrap();

        // 49 record bytes fit on one line, closed by a single newline
        assert_eq!(buffer.len(), 50);
        assert_eq!(&buffer[0..5], b"00049");
        assert_eq!(buffer[49], b'\n');
    }

    #[test]
    fn test_long_record_is_wrapped_at_80() {
        let record = Record::builder().field(*b"245", vec![b'z'; 150]).build();
        let config = CodecConfig::default();

        let mut buffer = Vec::new();
        IsoWriter::new(&mut buffer)
            .with_config(config.clone())
            .write_record(&record)
            .unwrap();

        // 24 + 12 + 1 + 150 + 1 + 1 = 189 bytes: two full lines and 29 bytes
        let lines: Vec<&[u8]> = buffer.split(|&b| b == b'\n').collect();
        assert_eq!(lines.len(), 4);
        assert_eq!(lines[0].len(), 80);
        assert_eq!(lines[1].len(), 80);
        assert_eq!(lines[2].len(), 29);
        assert!(lines[3].is_empty());

        let decoded = Record::from_bytes(&buffer, &config).unwrap();
        assert_eq!(decoded.fields, record.fields);
    }

    #[test]
    fn test_write_and_read_roundtrip() {
        let record = Record::builder()
            .field(*b"001", "12345")
            .field(*b"245", "Test title")
            .field(*b"650", "Subject 1")
            .field(*b"650", "Subject 2")
            .build();

        let mut buffer = Vec::new();
        {
            let mut writer = IsoWriter::new(&mut buffer);
            writer.write_record(&record).unwrap();
            writer.finish().unwrap();
        }

        let mut reader = IsoReader::new(&buffer[..]);
        let read_record = reader.read_record().unwrap().unwrap();
        assert_eq!(read_record.get_fields(b"001"), vec![&b"12345"[..]]);
        assert_eq!(
            read_record.get_fields(b"650"),
            vec![&b"Subject 1"[..], &b"Subject 2"[..]]
        );
        assert!(reader.read_record().unwrap().is_none());
    }

    #[test]
    fn test_format_writer_batch() {
        let records: Vec<Record> = (0..3)
            .map(|i| Record::builder().field(*b"245", format!("Title {i}")).build())
            .collect();

        let mut buffer = Vec::new();
        {
            let mut writer = IsoWriter::new(&mut buffer);
            FormatWriter::write_batch(&mut writer, &records).unwrap();
            assert_eq!(writer.records_written(), 3);
            writer.finish().unwrap();
        }

        let mut reader = IsoReader::new(&buffer[..]);
        for i in 0..3 {
            let record = reader.read_record().unwrap().unwrap();
            assert_eq!(record.get_fields(b"245"), vec![format!("Title {i}").as_bytes()]);
        }
        assert!(reader.read_record().unwrap().is_none());
    }

    #[test]
    fn test_writer_cannot_write_after_finish() {
        let mut buffer = Vec::new();
        let mut writer = IsoWriter::new(&mut buffer);
        writer.finish().unwrap();

        let result = writer.write_record(&Record::new());
        assert!(matches!(result, Err(IsoError::WriterFinished)));
    }
}
