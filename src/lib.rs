#![doc = include_str!("../README.md")]
#![warn(missing_docs)]

//! ## Data flow
//!
//! ```text
//! bytes -> line_split -> record codec -> IsoReader -> Record -> mapping / json
//! ```
//!
//! Encoding runs the same pipeline backwards. The record codec is
//! byte-oriented; text encodings only matter to the [`mapping`] and [`json`]
//! adapters.
//!
//! ## Modules
//!
//! - [`record`] - Record structure, layout derivation and the record codec
//! - [`leader`] - The 24-byte record leader
//! - [`reader`] - Reading record streams
//! - [`writer`] - Writing record streams
//! - [`line_split`] - Line-wrap transcoding adapters
//! - [`formats`] - Format-agnostic reader and writer traits
//! - [`config`] - Codec configuration
//! - [`digits`] - Fixed-width decimal digit strings
//! - [`terminator`] - Terminated byte sequences
//! - [`encoding`] - Named text encodings
//! - [`mapping`] - Tag-to-values mappings
//! - [`json`] - JSON Lines conversion
//! - [`error`] - Error types and result type

pub mod config;
pub mod digits;
pub mod encoding;
pub mod error;
/// Format-agnostic reader and writer traits.
///
/// See the [`formats`] module documentation for details.
pub mod formats;
pub mod json;
pub mod leader;
pub mod line_split;
pub mod mapping;
pub mod reader;
/// Record structure and the record codec.
pub mod record;
pub mod terminator;
pub mod writer;

pub use config::CodecConfig;
pub use encoding::TextCodec;
pub use error::{IsoError, Result};
pub use leader::{EntryMap, Leader};
pub use line_split::{LineSplitReader, LineSplitWriter};
pub use mapping::TagMap;
pub use reader::IsoReader;
pub use record::{
    decode_record, encode_record, DirectoryEntry, Record, RecordBuilder, RecordLayout,
};
pub use writer::IsoWriter;
