//! Terminator-checked byte fields.
//!
//! Fields and records end with a marker whose width is part of the declared
//! length of the enclosing sub-field. Decoding verifies and strips the marker;
//! encoding appends it.

use crate::error::{IsoError, Result};

/// Strip the required `terminator` suffix from `bytes`.
///
/// # Errors
///
/// Returns [`IsoError::TerminatorMismatch`] if `bytes` is shorter than the
/// terminator or does not end with it.
pub fn strip_terminator<'a>(bytes: &'a [u8], terminator: &[u8]) -> Result<&'a [u8]> {
    bytes.strip_suffix(terminator).ok_or_else(|| {
        IsoError::TerminatorMismatch(format!(
            "expected {:?} at the end of {:?}",
            String::from_utf8_lossy(terminator),
            String::from_utf8_lossy(bytes)
        ))
    })
}

/// Check that `bytes` is exactly the `terminator`.
///
/// # Errors
///
/// Returns [`IsoError::TerminatorMismatch`] naming `what` if the bytes differ.
pub fn expect_terminator(bytes: &[u8], terminator: &[u8], what: &str) -> Result<()> {
    if bytes == terminator {
        Ok(())
    } else {
        Err(IsoError::TerminatorMismatch(format!(
            "expected {what} {:?}, found {:?}",
            String::from_utf8_lossy(terminator),
            String::from_utf8_lossy(bytes)
        )))
    }
}

/// Append `payload` followed by `terminator` to `buf`.
pub fn append_terminated(buf: &mut Vec<u8>, payload: &[u8], terminator: &[u8]) {
    buf.extend_from_slice(payload);
    buf.extend_from_slice(terminator);
}
