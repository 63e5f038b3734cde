//! Record reader and writer traits.
//!
//! These traits give a uniform interface over record sources and sinks, so
//! conversion code can be written once for ISO 2709 streams and anything else
//! that produces [`Record`] values.
//!
//! # Example
//!
//! ```
//! use isorec::formats::{FormatReader, FormatWriter};
//!
//! fn copy_records<R: FormatReader, W: FormatWriter>(
//!     reader: &mut R,
//!     writer: &mut W,
//! ) -> isorec::Result<usize> {
//!     let mut count = 0;
//!     while let Some(record) = reader.read_record()? {
//!         writer.write_record(&record)?;
//!         count += 1;
//!     }
//!     writer.finish()?;
//!     Ok(count)
//! }
//! ```

use crate::error::Result;
use crate::record::Record;

/// Trait for readers that produce records from a source.
///
/// Implementations return `Ok(None)` when the source ends cleanly between
/// records, and preserve field order, payload bytes and leader bytes exactly.
pub trait FormatReader: std::fmt::Debug {
    /// Read the next record from the source.
    ///
    /// Returns:
    /// - `Ok(Some(record))` if a record was read successfully
    /// - `Ok(None)` if the end of the source was reached
    /// - `Err(_)` if reading failed due to malformed data or I/O errors
    ///
    /// # Errors
    ///
    /// Returns an error if the source contains malformed data or I/O fails.
    fn read_record(&mut self) -> Result<Option<Record>>;

    /// Read all remaining records into a vector.
    ///
    /// For large streams, prefer [`read_record`](Self::read_record).
    ///
    /// # Errors
    ///
    /// Returns the first error encountered. Records read before it are
    /// discarded.
    fn read_all(&mut self) -> Result<Vec<Record>> {
        let mut records = Vec::new();
        while let Some(record) = self.read_record()? {
            records.push(record);
        }
        Ok(records)
    }

    /// Returns the number of records read so far, if tracked.
    fn records_read(&self) -> Option<usize> {
        None
    }
}

/// Trait for writers that serialize records to a destination.
///
/// Write records with [`write_record`](Self::write_record) or
/// [`write_batch`](Self::write_batch), then call [`finish`](Self::finish).
pub trait FormatWriter: std::fmt::Debug {
    /// Write a single record to the output.
    ///
    /// # Errors
    ///
    /// Returns an error if the record cannot be serialized or if writing to
    /// the underlying output fails.
    fn write_record(&mut self, record: &Record) -> Result<()>;

    /// Write multiple records to the output.
    ///
    /// # Errors
    ///
    /// Returns an error if any record cannot be written.
    fn write_batch(&mut self, records: &[Record]) -> Result<()> {
        for record in records {
            self.write_record(record)?;
        }
        Ok(())
    }

    /// Finish writing and flush any buffered data.
    ///
    /// # Errors
    ///
    /// Returns an error if flushing fails.
    fn finish(&mut self) -> Result<()>;

    /// Returns the number of records written so far, if tracked.
    fn records_written(&self) -> Option<usize> {
        None
    }
}

/// Extension trait providing iterator-style access for format readers.
///
/// Implemented for all types implementing [`FormatReader`].
pub trait FormatReaderExt: FormatReader {
    /// Create an iterator over records from this reader.
    ///
    /// The iterator yields `Result<Record>` for each record. It stops after
    /// the first error, since a stream with broken framing cannot be
    /// resynchronized.
    ///
    /// # Example
    ///
    /// ```
    /// use isorec::formats::FormatReaderExt;
    /// use isorec::IsoReader;
    ///
    /// let mut reader = IsoReader::new(&b""[..]);
    /// assert_eq!(reader.records().count(), 0);
    /// ```
    fn records(&mut self) -> RecordIterator<'_, Self>
    where
        Self: Sized,
    {
        RecordIterator {
            reader: self,
            done: false,
        }
    }
}

impl<T: FormatReader> FormatReaderExt for T {}

/// Iterator adapter for [`FormatReader`].
///
/// Created by the [`records`](FormatReaderExt::records) method.
#[derive(Debug)]
pub struct RecordIterator<'a, R: FormatReader> {
    reader: &'a mut R,
    done: bool,
}

impl<R: FormatReader> Iterator for RecordIterator<'_, R> {
    type Item = Result<Record>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.done {
            return None;
        }
        match self.reader.read_record() {
            Ok(Some(record)) => Some(Ok(record)),
            Ok(None) => {
                self.done = true;
                None
            },
            Err(e) => {
                self.done = true;
                Some(Err(e))
            },
        }
    }
}

impl<R: FormatReader> std::iter::FusedIterator for RecordIterator<'_, R> {}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::IsoError;

    fn test_record(n: usize) -> Record {
        Record::builder().field(*b"001", format!("{n}")).build()
    }

    /// Mock reader yielding a fixed list of results
    #[derive(Debug)]
    struct MockReader {
        results: Vec<Option<Result<Record>>>,
        index: usize,
    }

    impl MockReader {
        fn new(records: Vec<Record>) -> Self {
            Self {
                results: records.into_iter().map(|r| Some(Ok(r))).collect(),
                index: 0,
            }
        }
    }

    impl FormatReader for MockReader {
        fn read_record(&mut self) -> Result<Option<Record>> {
            let next = self.results.get_mut(self.index).and_then(Option::take);
            self.index += 1;
            next.transpose()
        }

        fn records_read(&self) -> Option<usize> {
            Some(self.index.min(self.results.len()))
        }
    }

    /// Mock writer for testing trait implementations
    #[derive(Debug)]
    struct MockWriter {
        records: Vec<Record>,
        finished: bool,
    }

    impl MockWriter {
        fn new() -> Self {
            Self {
                records: Vec::new(),
                finished: false,
            }
        }
    }

    impl FormatWriter for MockWriter {
        fn write_record(&mut self, record: &Record) -> Result<()> {
            if self.finished {
                return Err(IsoError::WriterFinished);
            }
            self.records.push(record.clone());
            Ok(())
        }

        fn finish(&mut self) -> Result<()> {
            self.finished = true;
            Ok(())
        }

        fn records_written(&self) -> Option<usize> {
            Some(self.records.len())
        }
    }

    #[test]
    fn test_reader_read_all() {
        let records = vec![test_record(1), test_record(2), test_record(3)];
        let mut reader = MockReader::new(records.clone());

        let result = reader.read_all().unwrap();
        assert_eq!(result, records);
        assert_eq!(reader.records_read(), Some(3));
    }

    #[test]
    fn test_reader_empty() {
        let mut reader = MockReader::new(vec![]);

        let result = reader.read_all().unwrap();
        assert!(result.is_empty());
        assert_eq!(reader.records_read(), Some(0));
    }

    #[test]
    fn test_reader_iterator() {
        let mut reader = MockReader::new(vec![test_record(1), test_record(2)]);

        let mut count = 0;
        for result in reader.records() {
            result.unwrap();
            count += 1;
        }
        assert_eq!(count, 2);
    }

    #[test]
    fn test_iterator_stops_after_error() {
        let mut reader = MockReader {
            results: vec![
                Some(Ok(test_record(1))),
                Some(Err(IsoError::TruncatedStream("short".to_string()))),
                Some(Ok(test_record(3))),
            ],
            index: 0,
        };

        let results: Vec<Result<Record>> = reader.records().collect();
        assert_eq!(results.len(), 2);
        assert!(results[0].is_ok());
        assert!(matches!(results[1], Err(IsoError::TruncatedStream(_))));
    }

    #[test]
    fn test_writer_batch() {
        let records = vec![test_record(1), test_record(2), test_record(3)];
        let mut writer = MockWriter::new();

        writer.write_batch(&records).unwrap();
        assert_eq!(writer.records_written(), Some(3));

        writer.finish().unwrap();
        assert!(writer.finished);
    }

    #[test]
    fn test_writer_cannot_write_after_finish() {
        let mut writer = MockWriter::new();
        writer.finish().unwrap();

        let result = writer.write_record(&test_record(1));
        assert!(matches!(result, Err(IsoError::WriterFinished)));
    }
}
