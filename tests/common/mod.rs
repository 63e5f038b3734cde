//! Common test helpers shared across the test suite.

use isorec::{CodecConfig, IsoWriter, Record};

/// Creates a record with a control number and a title whose length grows
/// with `n`, so that larger `n` spill over several wrapped lines.
pub fn numbered_record(n: usize) -> Record {
    Record::builder()
        .field(*b"001", format!("{n:05}"))
        .field(*b"245", format!("Title {n} {}", "x".repeat(n * 37)))
        .field(*b"650", "Subject")
        .build()
}

/// Writes `records` to a buffer with `config`.
pub fn write_stream(records: &[Record], config: &CodecConfig) -> Vec<u8> {
    let mut buffer = Vec::new();
    {
        let mut writer = IsoWriter::new(&mut buffer).with_config(config.clone());
        for record in records {
            writer.write_record(record).expect("record should encode");
        }
        writer.finish().expect("finish should succeed");
    }
    buffer
}

/// Splits a wrapped stream on `\n`, dropping the empty tail after the last
/// newline.
#[allow(dead_code)]
pub fn lines(data: &[u8]) -> Vec<&[u8]> {
    let mut lines: Vec<&[u8]> = data.split(|&b| b == b'\n').collect();
    if lines.last().is_some_and(|line| line.is_empty()) {
        lines.pop();
    }
    lines
}
