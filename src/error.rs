//! Error types for ISO 2709 codec operations.
//!
//! This module provides the [`IsoError`] type for all library operations
//! and the [`Result`] convenience type.
//!
//! Reaching the end of a stream between two records is not an error: readers
//! report it as `Ok(None)`.

use std::io;
use thiserror::Error;

/// Error type for all codec operations.
///
/// Every variant aborts the current decode or encode call. There is no
/// skip-and-resync mode: once the framing of a stream is broken the rest of
/// it cannot be trusted.
#[derive(Error, Debug)]
pub enum IsoError {
    /// A digit-string field holds non-digit bytes, or an integer does not fit
    /// in its fixed field width.
    #[error("Malformed length: {0}")]
    MalformedLength(String),

    /// An expected field or record terminator was not found.
    #[error("Terminator mismatch: {0}")]
    TerminatorMismatch(String),

    /// The directory does not agree with the leader or with itself.
    #[error("Directory inconsistency: {0}")]
    DirectoryInconsistency(String),

    /// A newline marker was missing at a line boundary.
    #[error("Line split framing error: {0}")]
    LineSplitFraming(String),

    /// Fewer bytes were available than a declared length requires.
    #[error("Truncated stream: {0}")]
    TruncatedStream(String),

    /// Text could not be converted with the configured character encoding.
    #[error("Encoding error: {0}")]
    EncodingError(String),

    /// The codec configuration cannot describe a valid record stream.
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    /// A record was written after the writer was finished.
    #[error("Writer already finished")]
    WriterFinished,

    /// A JSON Lines document could not be read or written.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// IO error from the underlying source/destination.
    #[error("IO error: {0}")]
    IoError(io::Error),
}

impl IsoError {
    /// Wrap this error in an [`io::Error`] so it can cross a `Read`/`Write`
    /// boundary and be recovered by the `From<io::Error>` conversion.
    pub(crate) fn into_io(self) -> io::Error {
        io::Error::new(io::ErrorKind::InvalidData, self)
    }
}

impl From<io::Error> for IsoError {
    fn from(err: io::Error) -> Self {
        if err.get_ref().is_some_and(|inner| inner.is::<IsoError>()) {
            return match err.into_inner().map(|inner| inner.downcast::<IsoError>()) {
                Some(Ok(inner)) => *inner,
                Some(Err(other)) => IsoError::IoError(io::Error::new(io::ErrorKind::Other, other)),
                None => IsoError::IoError(io::Error::from(io::ErrorKind::InvalidData)),
            };
        }
        if err.kind() == io::ErrorKind::UnexpectedEof {
            return IsoError::TruncatedStream(err.to_string());
        }
        IsoError::IoError(err)
    }
}

/// Convenience type alias for [`std::result::Result`] with [`IsoError`].
pub type Result<T> = std::result::Result<T, IsoError>;
