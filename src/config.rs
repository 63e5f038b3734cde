//! Configuration options for the record codec.
//!
//! This module provides the [`CodecConfig`] struct which controls the
//! terminators, the line wrapping of the stream, and the text encoding used
//! when records are converted to and from tag mappings.

use crate::error::{IsoError, Result};
use serde::{Deserialize, Serialize};
use std::num::NonZeroUsize;

/// Default field terminator, also closing the directory.
pub const DEFAULT_FIELD_TERMINATOR: &[u8] = b"#";
/// Default record terminator.
pub const DEFAULT_RECORD_TERMINATOR: &[u8] = b"#";
/// Default line width of wrapped streams.
pub const DEFAULT_LINE_LEN: usize = 80;
/// Default newline marker of wrapped streams.
pub const DEFAULT_NEWLINE: &[u8] = b"\n";
/// Default text encoding label.
pub const DEFAULT_ENCODING: &str = "cp1252";

/// Configuration for reading and writing records.
///
/// All settings have defaults and can be overridden independently, either
/// with the `with_*` methods or by deserializing a partial document.
///
/// # Examples
///
/// ```
/// use isorec::CodecConfig;
///
/// // Default configuration ('#' terminators, 80-byte lines, cp1252)
/// let config = CodecConfig::default();
/// assert_eq!(config.line_len, 80);
///
/// // Unwrapped stream with MARC-style terminators
/// let config = CodecConfig::default()
///     .with_line_len(0)
///     .with_field_terminator(b"\x1e")
///     .with_record_terminator(b"\x1d");
/// assert!(config.line_width().is_none());
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CodecConfig {
    /// Marker appended after each field payload and after the directory.
    pub field_terminator: Vec<u8>,
    /// Marker closing each record.
    pub record_terminator: Vec<u8>,
    /// Width of wrapped lines in raw bytes; `0` disables line wrapping.
    pub line_len: usize,
    /// Marker separating wrapped lines.
    pub newline: Vec<u8>,
    /// Encoding label used by the mapping adapters (e.g. `cp1252`, `utf-8`).
    pub encoding: String,
}

impl Default for CodecConfig {
    fn default() -> Self {
        CodecConfig {
            field_terminator: DEFAULT_FIELD_TERMINATOR.to_vec(),
            record_terminator: DEFAULT_RECORD_TERMINATOR.to_vec(),
            line_len: DEFAULT_LINE_LEN,
            newline: DEFAULT_NEWLINE.to_vec(),
            encoding: DEFAULT_ENCODING.to_string(),
        }
    }
}

impl CodecConfig {
    /// Set the field terminator.
    #[must_use]
    pub fn with_field_terminator(mut self, terminator: &[u8]) -> Self {
        self.field_terminator = terminator.to_vec();
        self
    }

    /// Set the record terminator.
    #[must_use]
    pub fn with_record_terminator(mut self, terminator: &[u8]) -> Self {
        self.record_terminator = terminator.to_vec();
        self
    }

    /// Set the line width; `0` disables line wrapping.
    #[must_use]
    pub fn with_line_len(mut self, line_len: usize) -> Self {
        self.line_len = line_len;
        self
    }

    /// Set the newline marker.
    #[must_use]
    pub fn with_newline(mut self, newline: &[u8]) -> Self {
        self.newline = newline.to_vec();
        self
    }

    /// Set the text encoding label used by the mapping adapters.
    #[must_use]
    pub fn with_encoding(mut self, encoding: &str) -> Self {
        self.encoding = encoding.to_string();
        self
    }

    /// The line width, or `None` when line wrapping is disabled.
    #[must_use]
    pub fn line_width(&self) -> Option<NonZeroUsize> {
        NonZeroUsize::new(self.line_len)
    }

    /// Check that the configuration can frame a record stream.
    ///
    /// # Errors
    ///
    /// Returns [`IsoError::InvalidConfig`] if a terminator is empty, or if the
    /// newline marker is empty while line wrapping is enabled.
    pub fn validate(&self) -> Result<()> {
        if self.field_terminator.is_empty() {
            return Err(IsoError::InvalidConfig(
                "field terminator must not be empty".to_string(),
            ));
        }
        if self.record_terminator.is_empty() {
            return Err(IsoError::InvalidConfig(
                "record terminator must not be empty".to_string(),
            ));
        }
        if self.line_len > 0 && self.newline.is_empty() {
            return Err(IsoError::InvalidConfig(
                "newline marker must not be empty when line wrapping is enabled".to_string(),
            ));
        }
        Ok(())
    }
}
