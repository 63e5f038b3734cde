//! Character encoding for field payloads and tags.
//!
//! Records carry opaque bytes. The mapping and JSON Lines adapters need text,
//! so they convert through a [`TextCodec`] selected by an encoding label such
//! as `"cp1252"` (the default), `"latin1"` or `"utf-8"`. Labels follow the
//! WHATWG Encoding Standard as implemented by `encoding_rs`.
//!
//! Conversion is strict in both directions: bytes that are invalid for the
//! encoding, or characters it cannot represent, produce
//! [`IsoError::EncodingError`] instead of replacement characters.

use crate::error::{IsoError, Result};
use encoding_rs::Encoding;

/// A named character encoding with strict conversion.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TextCodec {
    encoding: &'static Encoding,
}

impl TextCodec {
    /// Look up an encoding by label.
    ///
    /// # Errors
    ///
    /// Returns [`IsoError::EncodingError`] if the label is not recognized.
    ///
    /// # Examples
    ///
    /// ```
    /// use isorec::TextCodec;
    ///
    /// let codec = TextCodec::for_label("cp1252")?;
    /// assert_eq!(codec.name(), "windows-1252");
    /// # Ok::<(), isorec::IsoError>(())
    /// ```
    pub fn for_label(label: &str) -> Result<Self> {
        Encoding::for_label(label.trim().as_bytes())
            .map(|encoding| TextCodec { encoding })
            .ok_or_else(|| IsoError::EncodingError(format!("Unknown encoding label: {label:?}")))
    }

    /// Canonical name of the encoding.
    #[must_use]
    pub fn name(&self) -> &'static str {
        self.encoding.name()
    }

    /// Decode bytes to text.
    ///
    /// # Errors
    ///
    /// Returns [`IsoError::EncodingError`] if the bytes are malformed for this
    /// encoding.
    pub fn decode(&self, bytes: &[u8]) -> Result<String> {
        self.encoding
            .decode_without_bom_handling_and_without_replacement(bytes)
            .map(std::borrow::Cow::into_owned)
            .ok_or_else(|| {
                IsoError::EncodingError(format!("Bytes are not valid {}", self.encoding.name()))
            })
    }

    /// Encode text to bytes.
    ///
    /// # Errors
    ///
    /// Returns [`IsoError::EncodingError`] if the text contains a character
    /// this encoding cannot represent, or if the encoding is decode-only
    /// (such as UTF-16).
    pub fn encode(&self, text: &str) -> Result<Vec<u8>> {
        let (bytes, used, had_errors) = self.encoding.encode(text);
        if used != self.encoding {
            return Err(IsoError::EncodingError(format!(
                "Cannot encode to {}",
                self.encoding.name()
            )));
        }
        if had_errors {
            return Err(IsoError::EncodingError(format!(
                "Text contains characters not representable in {}",
                self.encoding.name()
            )));
        }
        Ok(bytes.into_owned())
    }
}

impl Default for TextCodec {
    fn default() -> Self {
        TextCodec {
            encoding: encoding_rs::WINDOWS_1252,
        }
    }
}
