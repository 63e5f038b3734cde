//! Format-agnostic record reading and writing.
//!
//! Readers and writers implement the same traits, so conversion code can be
//! written once and driven by any source or sink of [`Record`](crate::Record)
//! values.
//!
//! # Supported Formats
//!
//! | Format | Module | Description |
//! |--------|--------|-------------|
//! | ISO 2709 | `iso2709` | Line-wrapped ISO 2709 record streams |
//! | JSON Lines | [`json`](crate::json) | One tag-to-values object per line |
//!
//! # Usage
//!
//! ```
//! use isorec::formats::{iso2709::Iso2709Reader, iso2709::Iso2709Writer, FormatReaderExt};
//! use isorec::Record;
//!
//! let mut buffer = Vec::new();
//! let mut writer = Iso2709Writer::new(&mut buffer);
//! writer.write_record(&Record::builder().field(*b"245", "Title").build())?;
//! writer.finish()?;
//!
//! let mut reader = Iso2709Reader::new(&buffer[..]);
//! for record in reader.records() {
//!     assert_eq!(record?.get_fields(b"245"), vec![&b"Title"[..]]);
//! }
//! # Ok::<(), isorec::IsoError>(())
//! ```

mod traits;

pub use traits::{FormatReader, FormatReaderExt, FormatWriter, RecordIterator};

/// ISO 2709 stream support.
pub mod iso2709 {
    pub use crate::reader::IsoReader as Iso2709Reader;
    pub use crate::writer::IsoWriter as Iso2709Writer;
}
