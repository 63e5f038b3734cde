//! Conversion between records and tag-to-values mappings.
//!
//! A [`TagMap`] groups a record's field payloads under their tag, decoded to
//! text with a [`TextCodec`]. Tags lose their leading zeros (`"001"` becomes
//! `"1"`, `"000"` becomes `"0"`) and are zero-padded back to three bytes on
//! the way in. Tag iteration order is the order in which each tag first
//! appears in the record; values keep their record order within a tag.
//!
//! Fields with different tags that were interleaved in the record come back
//! grouped by tag after a round trip through a mapping.
//!
//! # Examples
//!
//! ```
//! use isorec::mapping::{mapping_to_record, record_to_mapping, TagMap};
//! use isorec::TextCodec;
//!
//! let mut map = TagMap::new();
//! map.insert("245".to_string(), vec!["Title text".to_string()]);
//!
//! let codec = TextCodec::default();
//! let record = mapping_to_record(&map, &codec)?;
//! assert_eq!(record_to_mapping(&record, &codec)?, map);
//! # Ok::<(), isorec::IsoError>(())
//! ```

use crate::config::CodecConfig;
use crate::encoding::TextCodec;
use crate::error::{IsoError, Result};
use crate::leader::TAG_LEN;
use crate::record::Record;
use indexmap::IndexMap;

/// Ordered mapping from tag string to the decoded values of its fields.
pub type TagMap = IndexMap<String, Vec<String>>;

/// Convert a record into a [`TagMap`].
///
/// # Errors
///
/// Returns [`IsoError::EncodingError`] if a tag is not ASCII or a payload is
/// not valid in `codec`'s encoding.
pub fn record_to_mapping(record: &Record, codec: &TextCodec) -> Result<TagMap> {
    let mut map = TagMap::new();
    for (tag, value) in record.fields() {
        let key = tag_to_key(tag)?;
        map.entry(key).or_default().push(codec.decode(value)?);
    }
    Ok(map)
}

/// Build a record from a [`TagMap`] with the default leader.
///
/// # Errors
///
/// Returns [`IsoError::EncodingError`] if a tag is not ASCII or a value cannot
/// be represented in `codec`'s encoding, and
/// [`IsoError::DirectoryInconsistency`] if a tag is longer than three bytes.
pub fn mapping_to_record(map: &TagMap, codec: &TextCodec) -> Result<Record> {
    let mut record = Record::new();
    for (key, values) in map {
        let tag = key_to_tag(key)?;
        for value in values {
            record.add_field(tag, codec.encode(value)?);
        }
    }
    Ok(record)
}

/// Encode a [`TagMap`] straight to record bytes, using `config`'s encoding
/// label and framing.
///
/// # Errors
///
/// Returns an error if the encoding label is unknown, a tag or value cannot
/// be converted, or the record cannot be encoded.
pub fn mapping_to_bytes(map: &TagMap, config: &CodecConfig) -> Result<Vec<u8>> {
    let codec = TextCodec::for_label(&config.encoding)?;
    mapping_to_record(map, &codec)?.to_bytes(config)
}

fn tag_to_key(tag: &[u8; TAG_LEN]) -> Result<String> {
    if !tag.is_ascii() {
        return Err(IsoError::EncodingError(format!(
            "Tag {:?} is not ASCII",
            String::from_utf8_lossy(tag)
        )));
    }
    let start = tag.iter().position(|&b| b != b'0').unwrap_or(TAG_LEN);
    let key: String = tag[start..].iter().map(|&b| char::from(b)).collect();
    if key.is_empty() {
        Ok("0".to_string())
    } else {
        Ok(key)
    }
}

fn key_to_tag(key: &str) -> Result<[u8; TAG_LEN]> {
    if !key.is_ascii() {
        return Err(IsoError::EncodingError(format!("Tag {key:?} is not ASCII")));
    }
    let bytes = key.as_bytes();
    if bytes.len() > TAG_LEN {
        return Err(IsoError::DirectoryInconsistency(format!(
            "Tag {key:?} is longer than {TAG_LEN} bytes"
        )));
    }
    let mut tag = [b'0'; TAG_LEN];
    tag[TAG_LEN - bytes.len()..].copy_from_slice(bytes);
    Ok(tag)
}
