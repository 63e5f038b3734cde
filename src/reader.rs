//! Reading records from byte streams.
//!
//! This module provides [`IsoReader`] for reading ISO 2709 records from any
//! source that implements [`std::io::Read`].
//!
//! # Examples
//!
//! Reading records from a file:
//!
//! ```no_run
//! use isorec::IsoReader;
//! use std::fs::File;
//! use std::io::BufReader;
//!
//! let file = File::open("records.iso")?;
//! let mut reader = IsoReader::new(BufReader::new(file));
//!
//! while let Some(record) = reader.read_record()? {
//!     println!("{} fields", record.len());
//! }
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```
//!
//! Reading an unwrapped stream from a buffer:
//!
//! ```
//! use isorec::{CodecConfig, IsoReader};
//!
//! let data = b"000260000000000250004500##";
//! let mut reader = IsoReader::new(&data[..])
//!     .with_config(CodecConfig::default().with_line_len(0));
//!
//! let record = reader.read_record()?.expect("one record");
//! assert!(record.is_empty());
//! assert!(reader.read_record()?.is_none());
//! # Ok::<(), isorec::IsoError>(())
//! ```

use crate::config::CodecConfig;
use crate::error::Result;
use crate::formats::FormatReader;
use crate::line_split::LineSplitReader;
use crate::record::{decode_record, Record};
use std::io::Read;
use tracing::debug;

/// Reader for line-wrapped ISO 2709 records.
///
/// `IsoReader` reads one record at a time. Each record is read exactly to its
/// declared length (plus the newline markers of its lines), so the reader
/// never buffers past the record it returns. Wrap slow sources in a
/// [`std::io::BufReader`].
///
/// # Examples
///
/// ```
/// use isorec::IsoReader;
///
/// let mut reader = IsoReader::new(&b""[..]);
///
/// match reader.read_record() {
///     Ok(Some(record)) => println!("{} fields", record.len()),
///     Ok(None) => println!("End of file"),
///     Err(e) => eprintln!("Error: {}", e),
/// }
/// ```
#[derive(Debug)]
pub struct IsoReader<R: Read> {
    reader: R,
    config: CodecConfig,
    records_read: usize,
}

impl<R: Read> IsoReader<R> {
    /// Create a reader with the default configuration.
    ///
    /// # Arguments
    ///
    /// * `reader` - Any source implementing [`std::io::Read`]
    pub fn new(reader: R) -> Self {
        IsoReader {
            reader,
            config: CodecConfig::default(),
            records_read: 0,
        }
    }

    /// Use the given codec configuration.
    #[must_use]
    pub fn with_config(mut self, config: CodecConfig) -> Self {
        self.config = config;
        self
    }

    /// The codec configuration in use.
    #[must_use]
    pub fn config(&self) -> &CodecConfig {
        &self.config
    }

    /// Read a single record.
    ///
    /// Returns `Ok(Some(record))` if a record was read, `Ok(None)` if the
    /// stream ended cleanly between records, or `Err` if the stream holds a
    /// malformed or truncated record.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - The record framing is malformed
    /// - The stream ends inside a record
    /// - An I/O error occurs
    pub fn read_record(&mut self) -> Result<Option<Record>> {
        let record = read_framed(&mut self.reader, &self.config)?;
        match &record {
            Some(_) => self.records_read += 1,
            None => debug!(records = self.records_read, "reached end of record stream"),
        }
        Ok(record)
    }

    /// Returns the number of records read so far.
    #[must_use]
    pub fn records_read(&self) -> usize {
        self.records_read
    }

    /// Unwrap the reader, returning the underlying source.
    pub fn into_inner(self) -> R {
        self.reader
    }
}

impl<R: Read + std::fmt::Debug> FormatReader for IsoReader<R> {
    fn read_record(&mut self) -> Result<Option<Record>> {
        IsoReader::read_record(self)
    }

    fn records_read(&self) -> Option<usize> {
        Some(self.records_read)
    }
}

/// Read one record, removing line wrapping if `config` enables it.
///
/// The line state starts fresh for every record and the record's final
/// partial line is closed before returning.
pub(crate) fn read_framed<R: Read + ?Sized>(
    reader: &mut R,
    config: &CodecConfig,
) -> Result<Option<Record>> {
    match config.line_width() {
        Some(width) => {
            let mut lines = LineSplitReader::new(reader, width, &config.newline);
            let record = decode_record(&mut lines, config)?;
            if record.is_some() {
                lines.finish()?;
            }
            Ok(record)
        },
        None => decode_record(reader, config),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::IsoError;
    use crate::formats::FormatReaderExt;
    use crate::writer::IsoWriter;

    fn sample_records(count: usize) -> Vec<Record> {
        (0..count)
            .map(|i| {
                Record::builder()
                    .field(*b"001", format!("{i}"))
                    .field(*b"245", format!("Title {i} {}", "x".repeat(i * 40)))
                    .build()
            })
            .collect()
    }

    fn write_all(records: &[Record], config: &CodecConfig) -> Vec<u8> {
        let mut buffer = Vec::new();
        {
            let mut writer = IsoWriter::new(&mut buffer).with_config(config.clone());
            for record in records {
                writer.write_record(record).unwrap();
            }
            writer.finish().unwrap();
        }
        buffer
    }

    #[test]
    fn test_eof_returns_none() {
        let mut reader = IsoReader::new(&b""[..]);
        assert!(reader.read_record().unwrap().is_none());
        assert_eq!(reader.records_read(), 0);
    }

    #[test]
    fn test_read_multiple_wrapped_records() {
        let records = sample_records(3);
        let data = write_all(&records, &CodecConfig::default());
        assert!(data.iter().filter(|&&b| b == b'\n').count() >= 3);

        let mut reader = IsoReader::new(&data[..]);
        for expected in &records {
            let record = reader.read_record().unwrap().unwrap();
            assert_eq!(record.fields, expected.fields);
        }
        assert!(reader.read_record().unwrap().is_none());
        assert_eq!(reader.records_read(), 3);
    }

    #[test]
    fn test_read_multiple_unwrapped_records() {
        let config = CodecConfig::default().with_line_len(0);
        let records = sample_records(4);
        let data = write_all(&records, &config);
        assert!(!data.contains(&b'\n'));

        let mut reader = IsoReader::new(&data[..]).with_config(config);
        let read = FormatReader::read_all(&mut reader).unwrap();
        assert_eq!(read.len(), 4);
        assert_eq!(reader.records_read(), 4);
    }

    #[test]
    fn test_stray_trailing_bytes_fail_after_valid_records() {
        let records = sample_records(2);
        let mut data = write_all(&records, &CodecConfig::default());
        data.extend_from_slice(b"xyz");

        let mut reader = IsoReader::new(&data[..]);
        let results: Vec<Result<Record>> = reader.records().collect();
        assert_eq!(results.len(), 3);
        assert!(results[0].is_ok());
        assert!(results[1].is_ok());
        assert!(matches!(results[2], Err(IsoError::TruncatedStream(_))));
    }

    #[test]
    fn test_wrapped_stream_read_as_unwrapped_fails() {
        let records = sample_records(3);
        let data = write_all(&records, &CodecConfig::default());
        let mut reader =
            IsoReader::new(&data[..]).with_config(CodecConfig::default().with_line_len(0));
        let result: Result<Vec<Record>> = reader.records().collect();
        assert!(result.is_err());
    }

    #[test]
    fn test_missing_newline_is_line_framing_error() {
        let record = Record::builder().field(*b"245", vec![b'a'; 200]).build();
        let mut data = write_all(&[record], &CodecConfig::default());
        let first_newline = data.iter().position(|&b| b == b'\n').unwrap();
        assert_eq!(first_newline, 80);
        data[first_newline] = b'!';

        let mut reader = IsoReader::new(&data[..]);
        let err = reader.read_record().unwrap_err();
        assert!(matches!(err, IsoError::LineSplitFraming(_)), "{err}");
    }

    #[test]
    fn test_into_inner_leaves_following_bytes() {
        let config = CodecConfig::default().with_line_len(0);
        let mut data = write_all(&sample_records(1), &config);
        data.extend_from_slice(b"TAIL");

        let mut reader = IsoReader::new(&data[..]).with_config(config);
        reader.read_record().unwrap().unwrap();
        assert_eq!(reader.into_inner(), b"TAIL");
    }
}
