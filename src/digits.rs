//! Fixed-width, zero-padded decimal integers.
//!
//! Every numeric sub-field of a record (total length, base address, the
//! directory entry lengths and offsets) is stored as ASCII digits left-padded
//! with `'0'` to an exact width. The format has no signs and no negative
//! values.

use crate::error::{IsoError, Result};

/// Append `value` to `buf` as exactly `width` ASCII digits.
///
/// # Errors
///
/// Returns [`IsoError::MalformedLength`] if `value` needs more than `width`
/// digits.
pub fn write_digits(buf: &mut Vec<u8>, value: usize, width: usize) -> Result<()> {
    if width == 0 && value == 0 {
        return Ok(());
    }
    let digits = value.to_string();
    if digits.len() > width {
        return Err(IsoError::MalformedLength(format!(
            "{value} does not fit in {width} digits"
        )));
    }
    buf.resize(buf.len() + width - digits.len(), b'0');
    buf.extend_from_slice(digits.as_bytes());
    Ok(())
}

/// Encode `value` as exactly `width` ASCII digits.
///
/// # Errors
///
/// Returns [`IsoError::MalformedLength`] if `value` needs more than `width`
/// digits.
pub fn encode_digits(value: usize, width: usize) -> Result<Vec<u8>> {
    let mut buf = Vec::with_capacity(width);
    write_digits(&mut buf, value, width)?;
    Ok(buf)
}

/// Parse a base-10 ASCII digit string.
///
/// # Errors
///
/// Returns [`IsoError::MalformedLength`] if `bytes` is empty, holds anything
/// other than `0`-`9`, or overflows `usize`.
pub fn decode_digits(bytes: &[u8]) -> Result<usize> {
    if bytes.is_empty() {
        return Err(IsoError::MalformedLength(
            "Expected digits, got an empty field".to_string(),
        ));
    }

    // Parse ASCII digits directly without string allocation
    let mut result = 0usize;
    for &byte in bytes {
        if !byte.is_ascii_digit() {
            return Err(IsoError::MalformedLength(format!(
                "Invalid numeric field {:?}: expected digits, got byte {:?}",
                String::from_utf8_lossy(bytes),
                byte as char
            )));
        }
        result = result
            .checked_mul(10)
            .and_then(|r| r.checked_add(usize::from(byte - b'0')))
            .ok_or_else(|| {
                IsoError::MalformedLength(format!(
                    "Numeric field {:?} overflows",
                    String::from_utf8_lossy(bytes)
                ))
            })?;
    }
    Ok(result)
}
