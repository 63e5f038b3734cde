//! Record leader parsing and serialization.
//!
//! The leader is the 24-byte fixed-length header at the start of every record.
//! It describes where the field data begins and how wide the numeric parts of
//! each directory entry are.
//!
//! # Structure
//!
//! - Positions 0-4: Record length (5 digits)
//! - Position 5: Record status
//! - Position 6: Record type
//! - Positions 7-8: Custom bytes
//! - Position 9: Coding
//! - Position 10: Indicator count (1 digit)
//! - Position 11: Identifier length (1 digit)
//! - Positions 12-16: Base address of data (5 digits)
//! - Positions 17-19: Custom bytes
//! - Positions 20-23: Entry map (length-of-length, length-of-position,
//!   length-of-custom, reserved)

use crate::digits::{decode_digits, write_digits};
use crate::error::{IsoError, Result};
use serde::{Deserialize, Serialize};

/// Total leader length, including the record length prefix.
pub const LEADER_LEN: usize = 24;
/// Width of the record length prefix.
pub const RECORD_LENGTH_WIDTH: usize = 5;
/// Width of the base address field.
pub const BASE_ADDRESS_WIDTH: usize = 5;
/// Width of a directory entry tag.
pub const TAG_LEN: usize = 3;

/// Widths of the numeric sub-fields of every directory entry.
///
/// Occupies leader positions 20-23.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct EntryMap {
    /// Digits in each entry's field length - position 20
    pub len_len: u8,
    /// Digits in each entry's field offset - position 21
    pub pos_len: u8,
    /// Digits in each entry's custom part - position 22
    pub custom_len: u8,
    /// Reserved byte - position 23
    pub reserved: u8,
}

impl Default for EntryMap {
    fn default() -> Self {
        EntryMap {
            len_len: 4,
            pos_len: 5,
            custom_len: 0,
            reserved: b'0',
        }
    }
}

impl EntryMap {
    /// Byte width of one directory entry, tag included.
    #[must_use]
    pub fn entry_len(&self) -> usize {
        TAG_LEN + usize::from(self.len_len) + usize::from(self.pos_len) + usize::from(self.custom_len)
    }
}

/// Record leader - 24 bytes at the start of every record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Leader {
    /// Record length (5 digits) - positions 0-4
    pub record_length: usize,
    /// Record status - position 5
    pub status: u8,
    /// Record type - position 6
    pub record_type: u8,
    /// Custom bytes - positions 7-8
    pub custom_2: [u8; 2],
    /// Coding - position 9
    pub coding: u8,
    /// Indicator count (1 digit) - position 10
    pub indicator_count: u8,
    /// Identifier length (1 digit) - position 11
    pub identifier_len: u8,
    /// Base address of data (5 digits) - positions 12-16
    pub base_address: usize,
    /// Custom bytes - positions 17-19
    pub custom_3: [u8; 3],
    /// Directory entry geometry - positions 20-23
    pub entry_map: EntryMap,
}

impl Default for Leader {
    fn default() -> Self {
        Leader {
            record_length: 0,
            status: b'0',
            record_type: b'0',
            custom_2: *b"00",
            coding: b'0',
            indicator_count: 0,
            identifier_len: 0,
            base_address: 0,
            custom_3: *b"000",
            entry_map: EntryMap::default(),
        }
    }
}

impl Leader {
    /// Parse a leader from its 24 bytes.
    ///
    /// # Errors
    ///
    /// Returns [`IsoError::TruncatedStream`] if fewer than 24 bytes are given
    /// and [`IsoError::MalformedLength`] if a digit field is not numeric.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self> {
        if bytes.len() < LEADER_LEN {
            return Err(IsoError::TruncatedStream(format!(
                "Leader must be at least {LEADER_LEN} bytes, got {}",
                bytes.len()
            )));
        }

        Ok(Leader {
            record_length: decode_digits(&bytes[0..5])?,
            status: bytes[5],
            record_type: bytes[6],
            custom_2: [bytes[7], bytes[8]],
            coding: bytes[9],
            indicator_count: single_digit(bytes[10])?,
            identifier_len: single_digit(bytes[11])?,
            base_address: decode_digits(&bytes[12..17])?,
            custom_3: [bytes[17], bytes[18], bytes[19]],
            entry_map: EntryMap {
                len_len: single_digit(bytes[20])?,
                pos_len: single_digit(bytes[21])?,
                custom_len: single_digit(bytes[22])?,
                reserved: bytes[23],
            },
        })
    }

    /// Serialize the leader to its 24 bytes.
    ///
    /// # Errors
    ///
    /// Returns [`IsoError::MalformedLength`] if the record length or base
    /// address needs more than 5 digits, or a single-digit field exceeds 9.
    pub fn as_bytes(&self) -> Result<Vec<u8>> {
        let mut bytes = Vec::with_capacity(LEADER_LEN);
        self.write_to(&mut bytes)?;
        Ok(bytes)
    }

    pub(crate) fn write_to(&self, bytes: &mut Vec<u8>) -> Result<()> {
        write_digits(bytes, self.record_length, RECORD_LENGTH_WIDTH)?;
        bytes.push(self.status);
        bytes.push(self.record_type);
        bytes.extend_from_slice(&self.custom_2);
        bytes.push(self.coding);
        write_digits(bytes, usize::from(self.indicator_count), 1)?;
        write_digits(bytes, usize::from(self.identifier_len), 1)?;
        write_digits(bytes, self.base_address, BASE_ADDRESS_WIDTH)?;
        bytes.extend_from_slice(&self.custom_3);
        write_digits(bytes, usize::from(self.entry_map.len_len), 1)?;
        write_digits(bytes, usize::from(self.entry_map.pos_len), 1)?;
        write_digits(bytes, usize::from(self.entry_map.custom_len), 1)?;
        bytes.push(self.entry_map.reserved);
        Ok(())
    }

    /// Number of directory entries implied by the base address.
    ///
    /// The space between the leader and the base address must hold a whole
    /// number of directory entries plus the directory's terminator.
    ///
    /// # Errors
    ///
    /// Returns [`IsoError::DirectoryInconsistency`] if the base address is too
    /// small or leaves a partial entry.
    pub fn num_fields(&self, terminator_len: usize) -> Result<usize> {
        let header_len = LEADER_LEN + terminator_len;
        let directory_len = self.base_address.checked_sub(header_len).ok_or_else(|| {
            IsoError::DirectoryInconsistency(format!(
                "Base address {} is smaller than the leader and directory terminator ({header_len})",
                self.base_address
            ))
        })?;
        let entry_len = self.entry_map.entry_len();
        if directory_len % entry_len != 0 {
            return Err(IsoError::DirectoryInconsistency(format!(
                "Directory of {directory_len} bytes is not a whole number of {entry_len}-byte entries"
            )));
        }
        Ok(directory_len / entry_len)
    }
}

fn single_digit(byte: u8) -> Result<u8> {
    if byte.is_ascii_digit() {
        Ok(byte - b'0')
    } else {
        Err(IsoError::MalformedLength(format!(
            "Expected a digit in the leader, got {:?}",
            byte as char
        )))
    }
}
