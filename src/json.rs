//! JSON Lines conversion of record streams.
//!
//! Each record becomes one JSON object per line, mapping tag strings to the
//! list of decoded field values (see [`crate::mapping`]):
//!
//! ```text
//! {"1":["12345"],"245":["Title text"]}
//! ```
//!
//! Payload text is converted with the encoding named in the
//! [`CodecConfig`]; the JSON itself is always UTF-8.
//!
//! # Examples
//!
//! ```
//! use isorec::json::{iso_to_jsonl, jsonl_to_iso};
//! use isorec::CodecConfig;
//!
//! let config = CodecConfig::default();
//! let mut iso = Vec::new();
//! jsonl_to_iso(&b"{\"245\":[\"Title text\"]}\n"[..], &mut iso, &config)?;
//!
//! let mut jsonl = Vec::new();
//! let count = iso_to_jsonl(&iso[..], &mut jsonl, &config)?;
//! assert_eq!(count, 1);
//! assert_eq!(jsonl, b"{\"245\":[\"Title text\"]}\n");
//! # Ok::<(), isorec::IsoError>(())
//! ```

use crate::config::CodecConfig;
use crate::encoding::TextCodec;
use crate::error::Result;
use crate::mapping::{mapping_to_record, record_to_mapping, TagMap};
use crate::reader::IsoReader;
use crate::record::Record;
use crate::writer::IsoWriter;
use serde::Deserialize;
use serde_json::Value;
use std::io::{BufRead, Read, Write};
use tracing::debug;

/// Convert a record to a JSON object of tag to values.
///
/// # Errors
///
/// Returns an error if a tag or payload cannot be decoded with `codec`.
pub fn record_to_json(record: &Record, codec: &TextCodec) -> Result<Value> {
    Ok(serde_json::to_value(record_to_mapping(record, codec)?)?)
}

/// Build a record from a JSON object of tag to values.
///
/// # Errors
///
/// Returns an error if the value is not an object of string arrays, or a tag
/// or value cannot be encoded with `codec`.
pub fn json_to_record(json: &Value, codec: &TextCodec) -> Result<Record> {
    let map = TagMap::deserialize(json)?;
    mapping_to_record(&map, codec)
}

/// Convert an ISO 2709 stream to JSON Lines.
///
/// Returns the number of records converted.
///
/// # Errors
///
/// Returns an error if the encoding label is unknown, a record is malformed,
/// a payload cannot be decoded, or an I/O error occurs.
pub fn iso_to_jsonl<R: Read, W: Write>(
    input: R,
    mut output: W,
    config: &CodecConfig,
) -> Result<usize> {
    let codec = TextCodec::for_label(&config.encoding)?;
    let mut reader = IsoReader::new(input).with_config(config.clone());
    let mut count = 0;

    while let Some(record) = reader.read_record()? {
        let map = record_to_mapping(&record, &codec)?;
        serde_json::to_writer(&mut output, &map)?;
        output.write_all(b"\n")?;
        count += 1;
    }

    output.flush()?;
    debug!(records = count, "converted ISO 2709 to JSON Lines");
    Ok(count)
}

/// Convert JSON Lines to an ISO 2709 stream.
///
/// Blank lines are skipped. Returns the number of records written.
///
/// # Errors
///
/// Returns an error if the encoding label is unknown, a line is not a JSON
/// object of string arrays, a value cannot be encoded, or an I/O error
/// occurs.
pub fn jsonl_to_iso<R: BufRead, W: Write>(
    input: R,
    output: W,
    config: &CodecConfig,
) -> Result<usize> {
    let codec = TextCodec::for_label(&config.encoding)?;
    let mut writer = IsoWriter::new(output).with_config(config.clone());

    for line in input.lines() {
        let line = line?;
        if line.trim().is_empty() {
            continue;
        }
        let map: TagMap = serde_json::from_str(&line)?;
        writer.write_record(&mapping_to_record(&map, &codec)?)?;
    }

    writer.finish()?;
    debug!(records = writer.records_written(), "converted JSON Lines to ISO 2709");
    Ok(writer.records_written())
}
