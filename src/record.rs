//! Record structures and the record structure codec.
//!
//! This module provides the core record types:
//! - [`Record`]: leader, directory and field payloads of one record
//! - [`DirectoryEntry`]: tag, length, offset and custom part of one field
//! - [`RecordLayout`]: the structural metadata derived from tags and payloads
//!
//! A record on the wire is laid out as:
//!
//! ```text
//! leader (24) | directory entries | FT | field 1 | FT | ... | field n | FT | RT
//! ```
//!
//! where `FT` is the field terminator and `RT` the record terminator. Every
//! length, offset and address in the leader and directory is derived from the
//! payloads when encoding; callers only supply tags and field bytes.
//!
//! # Examples
//!
//! ```
//! use isorec::{CodecConfig, Record};
//!
//! let config = CodecConfig::default().with_line_len(0);
//! let record = Record::builder()
//!     .field(*b"245", "Title text")
//!     .field(*b"650", "Subject")
//!     .build();
//!
//! let bytes = record.to_bytes(&config)?;
//! let decoded = Record::from_bytes(&bytes, &config)?;
//! assert_eq!(decoded.get_fields(b"245"), vec![&b"Title text"[..]]);
//! assert_eq!(decoded.total_length(), bytes.len());
//! # Ok::<(), isorec::IsoError>(())
//! ```

use crate::config::CodecConfig;
use crate::digits::{decode_digits, write_digits};
use crate::error::{IsoError, Result};
use crate::leader::{Leader, LEADER_LEN, RECORD_LENGTH_WIDTH, TAG_LEN};
use crate::line_split::read_full;
use crate::terminator::{append_terminated, expect_terminator, strip_terminator};
use serde::{Deserialize, Serialize};
use std::io::Read;
use tracing::trace;

/// Value written into the custom part of every directory entry on encode.
pub const DEFAULT_ENTRY_CUSTOM: usize = 0;

/// A directory entry describing one field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DirectoryEntry {
    /// Field tag, 3 opaque bytes
    pub tag: [u8; TAG_LEN],
    /// Field length including its terminator
    pub length: usize,
    /// Position of the field's first byte within the field data area
    pub offset: usize,
    /// Custom part of the entry
    pub custom: usize,
}

impl DirectoryEntry {
    /// Entry for `tag` whose length and offset are yet to be derived.
    #[must_use]
    pub fn new(tag: [u8; TAG_LEN]) -> Self {
        DirectoryEntry {
            tag,
            length: 0,
            offset: 0,
            custom: DEFAULT_ENTRY_CUSTOM,
        }
    }
}

/// A record: leader, directory and field payloads.
///
/// `directory` and `fields` run in parallel, one entry per field. Decoded
/// records carry the lengths and offsets found in the stream; records built
/// in memory may leave them at zero since encoding derives them afresh.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Record {
    /// Record leader (24 bytes)
    pub leader: Leader,
    /// Directory entries, in field order
    pub directory: Vec<DirectoryEntry>,
    /// Field payloads without their terminators
    pub fields: Vec<Vec<u8>>,
}

impl Record {
    /// Create an empty record with the default leader.
    #[must_use]
    pub fn new() -> Self {
        Record::default()
    }

    /// Create an empty record with the given leader.
    #[must_use]
    pub fn with_leader(leader: Leader) -> Self {
        Record {
            leader,
            directory: Vec::new(),
            fields: Vec::new(),
        }
    }

    /// Start building a record.
    #[must_use]
    pub fn builder() -> RecordBuilder {
        RecordBuilder {
            record: Record::new(),
        }
    }

    /// Append a field.
    pub fn add_field(&mut self, tag: [u8; TAG_LEN], value: impl Into<Vec<u8>>) {
        self.directory.push(DirectoryEntry::new(tag));
        self.fields.push(value.into());
    }

    /// Iterate over `(tag, payload)` pairs in field order.
    pub fn fields(&self) -> impl Iterator<Item = (&[u8; TAG_LEN], &[u8])> {
        self.directory
            .iter()
            .zip(&self.fields)
            .map(|(entry, field)| (&entry.tag, field.as_slice()))
    }

    /// All payloads stored under `tag`, in field order.
    #[must_use]
    pub fn get_fields(&self, tag: &[u8]) -> Vec<&[u8]> {
        self.fields()
            .filter(|(t, _)| t.as_slice() == tag)
            .map(|(_, value)| value)
            .collect()
    }

    /// Number of fields.
    #[must_use]
    pub fn len(&self) -> usize {
        self.fields.len()
    }

    /// Returns `true` if the record has no fields.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// Total encoded length as recorded in the leader.
    #[must_use]
    pub fn total_length(&self) -> usize {
        self.leader.record_length
    }

    /// Check that the directory offsets chain: the first field starts at 0 and
    /// each field starts where the previous one ends.
    ///
    /// # Errors
    ///
    /// Returns [`IsoError::DirectoryInconsistency`] on the first broken link.
    pub fn validate_directory(&self) -> Result<()> {
        check_offsets(&self.directory)
    }

    /// Encode the record, line wrapping included.
    ///
    /// # Errors
    ///
    /// Returns an error if the record cannot be framed with `config`.
    pub fn to_bytes(&self, config: &CodecConfig) -> Result<Vec<u8>> {
        let encoded = encode_record(self, config)?;
        let mut out = Vec::with_capacity(encoded.len() + encoded.len() / 64 + 2);
        crate::writer::write_framed(&mut out, &encoded, config)?;
        Ok(out)
    }

    /// Decode the first record of `bytes`, line wrapping included.
    ///
    /// # Errors
    ///
    /// Returns [`IsoError::TruncatedStream`] if `bytes` is empty, or any
    /// framing error of the record.
    pub fn from_bytes(bytes: &[u8], config: &CodecConfig) -> Result<Self> {
        let mut source = bytes;
        crate::reader::read_framed(&mut source, config)?
            .ok_or_else(|| IsoError::TruncatedStream("no record in an empty buffer".to_string()))
    }
}

/// Builder for [`Record`].
#[derive(Debug, Clone)]
pub struct RecordBuilder {
    record: Record,
}

impl RecordBuilder {
    /// Use the given leader.
    #[must_use]
    pub fn leader(mut self, leader: Leader) -> Self {
        self.record.leader = leader;
        self
    }

    /// Append a field.
    #[must_use]
    pub fn field(mut self, tag: [u8; TAG_LEN], value: impl Into<Vec<u8>>) -> Self {
        self.record.add_field(tag, value);
        self
    }

    /// Finish the record.
    #[must_use]
    pub fn build(self) -> Record {
        self.record
    }
}

/// Structural metadata derived from a record's tags and payload lengths.
///
/// This is the first of the two encoding passes: nothing here is taken from
/// the caller's leader or directory except the tags and the entry map.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordLayout {
    /// Directory entries with derived lengths and offsets
    pub entries: Vec<DirectoryEntry>,
    /// Offset of the field data area from the record start
    pub base_address: usize,
    /// Length of the whole encoded record
    pub record_length: usize,
}

impl RecordLayout {
    /// Derive the layout of `record` under `config`.
    ///
    /// # Errors
    ///
    /// Returns [`IsoError::DirectoryInconsistency`] if the directory and the
    /// field list differ in length.
    pub fn compute(record: &Record, config: &CodecConfig) -> Result<Self> {
        if record.directory.len() != record.fields.len() {
            return Err(IsoError::DirectoryInconsistency(format!(
                "{} directory entries for {} fields",
                record.directory.len(),
                record.fields.len()
            )));
        }

        let terminator_len = config.field_terminator.len();
        let mut offset = 0;
        let entries: Vec<DirectoryEntry> = record
            .directory
            .iter()
            .zip(&record.fields)
            .map(|(entry, field)| {
                let length = field.len() + terminator_len;
                let derived = DirectoryEntry {
                    tag: entry.tag,
                    length,
                    offset,
                    custom: DEFAULT_ENTRY_CUSTOM,
                };
                offset += length;
                derived
            })
            .collect();

        let base_address =
            LEADER_LEN + terminator_len + entries.len() * record.leader.entry_map.entry_len();
        let record_length = base_address + offset + config.record_terminator.len();

        Ok(RecordLayout {
            entries,
            base_address,
            record_length,
        })
    }
}

/// Encode one record, without line wrapping.
///
/// Lengths, offsets, the base address and the record length are always
/// derived from the payloads; the values held in `record` are ignored.
///
/// # Errors
///
/// Returns [`IsoError::MalformedLength`] if a derived number does not fit its
/// field width, or [`IsoError::DirectoryInconsistency`] if the directory and
/// the field list differ in length.
pub fn encode_record(record: &Record, config: &CodecConfig) -> Result<Vec<u8>> {
    config.validate()?;
    let layout = RecordLayout::compute(record, config)?;
    let entry_map = record.leader.entry_map;

    let mut leader = record.leader.clone();
    leader.record_length = layout.record_length;
    leader.base_address = layout.base_address;

    let mut out = Vec::with_capacity(layout.record_length);
    leader.write_to(&mut out)?;
    for entry in &layout.entries {
        out.extend_from_slice(&entry.tag);
        write_digits(&mut out, entry.length, usize::from(entry_map.len_len))?;
        write_digits(&mut out, entry.offset, usize::from(entry_map.pos_len))?;
        write_digits(&mut out, entry.custom, usize::from(entry_map.custom_len))?;
    }
    out.extend_from_slice(&config.field_terminator);
    for field in &record.fields {
        append_terminated(&mut out, field, &config.field_terminator);
    }
    out.extend_from_slice(&config.record_terminator);

    if out.len() != layout.record_length {
        return Err(IsoError::DirectoryInconsistency(format!(
            "encoded {} bytes for a record length of {}",
            out.len(),
            layout.record_length
        )));
    }
    trace!(
        record_length = layout.record_length,
        num_fields = layout.entries.len(),
        "encoded record"
    );
    Ok(out)
}

/// Decode one record from `reader`, without line wrapping.
///
/// Reads exactly the number of bytes the record declares, so records that
/// follow in the stream are left untouched.
///
/// Returns `Ok(None)` if the reader is exhausted before the first byte.
///
/// # Errors
///
/// Returns a framing error if the record is truncated or inconsistent.
pub fn decode_record<R: Read + ?Sized>(
    reader: &mut R,
    config: &CodecConfig,
) -> Result<Option<Record>> {
    config.validate()?;

    let mut prefix = [0u8; RECORD_LENGTH_WIDTH];
    match read_full(reader, &mut prefix)? {
        0 => return Ok(None),
        n if n < RECORD_LENGTH_WIDTH => {
            return Err(IsoError::TruncatedStream(format!(
                "{n} stray bytes where a record length was expected"
            )));
        },
        _ => {},
    }

    let record_length = decode_digits(&prefix)?;
    let min_length = LEADER_LEN + config.field_terminator.len() + config.record_terminator.len();
    if record_length < min_length {
        return Err(IsoError::MalformedLength(format!(
            "Record length {record_length} is below the minimum of {min_length}"
        )));
    }

    let mut record_bytes = vec![0u8; record_length];
    record_bytes[..RECORD_LENGTH_WIDTH].copy_from_slice(&prefix);
    let got = read_full(reader, &mut record_bytes[RECORD_LENGTH_WIDTH..])?;
    if got < record_length - RECORD_LENGTH_WIDTH {
        return Err(IsoError::TruncatedStream(format!(
            "Record declares {record_length} bytes but only {} are available",
            got + RECORD_LENGTH_WIDTH
        )));
    }

    parse_record(&record_bytes, config).map(Some)
}

/// Parse a record from exactly its declared bytes.
fn parse_record(bytes: &[u8], config: &CodecConfig) -> Result<Record> {
    let field_terminator = config.field_terminator.as_slice();
    let mut cursor = Framed::new(bytes);

    let leader = Leader::from_bytes(cursor.take(LEADER_LEN, "leader")?)?;
    let num_fields = leader.num_fields(field_terminator.len())?;
    if leader.base_address + config.record_terminator.len() > bytes.len() {
        return Err(IsoError::DirectoryInconsistency(format!(
            "Base address {} lies beyond the record length {}",
            leader.base_address,
            bytes.len()
        )));
    }

    let entry_map = leader.entry_map;
    let mut directory = Vec::with_capacity(num_fields);
    for _ in 0..num_fields {
        let mut tag = [0u8; TAG_LEN];
        tag.copy_from_slice(cursor.take(TAG_LEN, "directory tag")?);
        let length = decode_digits(cursor.take(usize::from(entry_map.len_len), "field length")?)?;
        let offset = decode_digits(cursor.take(usize::from(entry_map.pos_len), "field offset")?)?;
        let custom = match entry_map.custom_len {
            0 => DEFAULT_ENTRY_CUSTOM,
            width => decode_digits(cursor.take(usize::from(width), "entry custom part")?)?,
        };
        directory.push(DirectoryEntry {
            tag,
            length,
            offset,
            custom,
        });
    }
    check_offsets(&directory)?;

    expect_terminator(
        cursor.take(field_terminator.len(), "directory terminator")?,
        field_terminator,
        "directory terminator",
    )?;
    if cursor.position() != leader.base_address {
        return Err(IsoError::DirectoryInconsistency(format!(
            "Directory ends at {} but the base address is {}",
            cursor.position(),
            leader.base_address
        )));
    }

    let mut fields = Vec::with_capacity(num_fields);
    for entry in &directory {
        if entry.length < field_terminator.len() {
            return Err(IsoError::TerminatorMismatch(format!(
                "Field {} declares {} bytes, leaving no room for its terminator",
                String::from_utf8_lossy(&entry.tag),
                entry.length
            )));
        }
        let raw = cursor.take(entry.length, "field data")?;
        fields.push(strip_terminator(raw, field_terminator)?.to_vec());
    }

    expect_terminator(
        cursor.take(config.record_terminator.len(), "record terminator")?,
        &config.record_terminator,
        "record terminator",
    )?;
    if cursor.remaining() > 0 {
        return Err(IsoError::MalformedLength(format!(
            "Record length {} leaves {} bytes after the record terminator",
            bytes.len(),
            cursor.remaining()
        )));
    }

    trace!(
        record_length = leader.record_length,
        num_fields,
        "decoded record"
    );
    Ok(Record {
        leader,
        directory,
        fields,
    })
}

fn check_offsets(directory: &[DirectoryEntry]) -> Result<()> {
    if let Some(first) = directory.first() {
        if first.offset != 0 {
            return Err(IsoError::DirectoryInconsistency(format!(
                "First field starts at offset {}, expected 0",
                first.offset
            )));
        }
    }
    for (index, pair) in directory.windows(2).enumerate() {
        let expected = pair[0].offset + pair[0].length;
        if pair[1].offset != expected {
            return Err(IsoError::DirectoryInconsistency(format!(
                "Field {} ({}) starts at offset {}, expected {expected}",
                index + 1,
                String::from_utf8_lossy(&pair[1].tag),
                pair[1].offset
            )));
        }
    }
    Ok(())
}

/// Cursor over the bytes of one length-framed record.
struct Framed<'a> {
    bytes: &'a [u8],
    pos: usize,
}

impl<'a> Framed<'a> {
    fn new(bytes: &'a [u8]) -> Self {
        Framed { bytes, pos: 0 }
    }

    fn take(&mut self, len: usize, what: &str) -> Result<&'a [u8]> {
        if len > self.remaining() {
            return Err(IsoError::TruncatedStream(format!(
                "{what} needs {len} bytes at position {}, but the record has {} left",
                self.pos,
                self.remaining()
            )));
        }
        let slice = &self.bytes[self.pos..self.pos + len];
        self.pos += len;
        Ok(slice)
    }

    fn position(&self) -> usize {
        self.pos
    }

    fn remaining(&self) -> usize {
        self.bytes.len() - self.pos
    }
}
