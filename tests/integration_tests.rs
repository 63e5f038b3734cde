//! Integration tests for the isorec library

mod common;

use common::{lines, numbered_record, write_stream};
use isorec::formats::{FormatReader, FormatReaderExt};
use isorec::json::{iso_to_jsonl, jsonl_to_iso};
use isorec::{CodecConfig, IsoError, IsoReader, IsoWriter, Record};
use std::fs::File;
use std::io::{BufReader, BufWriter, Cursor};

#[test]
fn test_stream_of_records_roundtrip() {
    let config = CodecConfig::default();
    let records: Vec<Record> = (0..6).map(numbered_record).collect();
    let data = write_stream(&records, &config);

    let mut reader = IsoReader::new(Cursor::new(&data));
    let read = reader.read_all().expect("stream should decode");
    assert_eq!(read.len(), records.len());
    for (got, expected) in read.iter().zip(&records) {
        assert_eq!(got.fields, expected.fields);
        assert_eq!(got.directory.len(), expected.directory.len());
        assert!(got.validate_directory().is_ok());
    }
}

#[test]
fn test_every_record_starts_on_a_fresh_line() {
    let config = CodecConfig::default();
    let records: Vec<Record> = (0..4).map(numbered_record).collect();
    let data = write_stream(&records, &config);

    let concatenated: Vec<u8> = records
        .iter()
        .flat_map(|record| record.to_bytes(&config).expect("record should encode"))
        .collect();
    assert_eq!(data, concatenated);

    for line in lines(&data) {
        assert!(line.len() <= 80, "line of {} bytes", line.len());
    }
}

#[test]
fn test_record_of_exactly_one_line() {
    // 24 + 12 + 1 + 41 + 1 + 1 = 80
    let record = Record::builder().field(*b"245", vec![b'q'; 41]).build();
    let config = CodecConfig::default();
    let data = write_stream(&[record.clone(), numbered_record(1)], &config);

    assert_eq!(&data[0..5], b"00080");
    assert_eq!(data[80], b'\n');
    assert_ne!(data[81], b'\n');

    let mut reader = IsoReader::new(&data[..]);
    assert_eq!(reader.read_record().unwrap().unwrap().fields, record.fields);
    assert_eq!(
        reader.read_record().unwrap().unwrap().fields,
        numbered_record(1).fields
    );
    assert!(reader.read_record().unwrap().is_none());
}

#[test]
fn test_zero_field_record_wrapped() {
    let data = write_stream(&[Record::new()], &CodecConfig::default());
    assert_eq!(data, b"000260000000000250004500##\n");

    let mut reader = IsoReader::new(&data[..]);
    let record = reader.read_record().unwrap().unwrap();
    assert!(record.is_empty());
    assert!(reader.read_record().unwrap().is_none());
}

#[test]
fn test_newline_bytes_in_payload_survive_wrapping() {
    // Put newline bytes right before, on and after the first line boundary
    let mut payload = vec![b'p'; 60];
    payload[41] = b'\n';
    payload[42] = b'\n';
    payload[43] = b'\n';
    let record = Record::builder().field(*b"300", payload.clone()).build();

    let config = CodecConfig::default();
    let data = write_stream(&[record], &config);
    let decoded = Record::from_bytes(&data, &config).unwrap();
    assert_eq!(decoded.get_fields(b"300"), vec![payload.as_slice()]);
}

#[test]
fn test_crlf_newline_marker() {
    let config = CodecConfig::default().with_newline(b"\r\n");
    let records: Vec<Record> = (0..3).map(numbered_record).collect();
    let data = write_stream(&records, &config);
    assert!(data.ends_with(b"\r\n"));

    let mut reader = IsoReader::new(&data[..]).with_config(config);
    let read: Vec<Record> = reader.records().collect::<isorec::Result<_>>().unwrap();
    assert_eq!(read.len(), 3);
    assert_eq!(read[2].fields, records[2].fields);
}

#[test]
fn test_stray_bytes_after_last_record() {
    let mut data = write_stream(&[numbered_record(0), numbered_record(1)], &CodecConfig::default());
    data.extend_from_slice(b"12");

    let mut reader = IsoReader::new(&data[..]);
    assert!(reader.read_record().unwrap().is_some());
    assert!(reader.read_record().unwrap().is_some());
    let err = reader.read_record().unwrap_err();
    assert!(matches!(err, IsoError::TruncatedStream(_)), "{err}");
}

#[test]
fn test_stream_cut_inside_a_record() {
    let data = write_stream(&[numbered_record(3)], &CodecConfig::default());
    let cut = &data[..data.len() / 2];

    let mut reader = IsoReader::new(cut);
    let err = reader.read_record().unwrap_err();
    assert!(matches!(err, IsoError::TruncatedStream(_)), "{err}");
}

#[test]
fn test_file_roundtrip() {
    let config = CodecConfig::default();
    let records: Vec<Record> = (0..10).map(numbered_record).collect();
    let file = tempfile::NamedTempFile::new().expect("temp file");

    {
        let mut writer =
            IsoWriter::new(BufWriter::new(file.reopen().expect("reopen"))).with_config(config.clone());
        for record in &records {
            writer.write_record(record).unwrap();
        }
        writer.finish().unwrap();
        assert_eq!(writer.records_written(), 10);
    }

    let mut reader =
        IsoReader::new(BufReader::new(File::open(file.path()).unwrap())).with_config(config);
    let mut count = 0;
    for (result, expected) in reader.records().zip(&records) {
        assert_eq!(result.unwrap().fields, expected.fields);
        count += 1;
    }
    assert_eq!(count, 10);
}

#[test]
fn test_jsonl_stream_roundtrip() {
    let config = CodecConfig::default();
    let records: Vec<Record> = (0..3).map(numbered_record).collect();
    let iso = write_stream(&records, &config);

    let mut jsonl = Vec::new();
    assert_eq!(iso_to_jsonl(&iso[..], &mut jsonl, &config).unwrap(), 3);
    let text = String::from_utf8(jsonl.clone()).unwrap();
    assert_eq!(text.lines().count(), 3);
    assert!(text.starts_with("{\"1\":[\"00000\"],\"245\":[\"Title 0 \"],\"650\":[\"Subject\"]}"));

    let mut rebuilt = Vec::new();
    assert_eq!(jsonl_to_iso(&jsonl[..], &mut rebuilt, &config).unwrap(), 3);
    assert_eq!(rebuilt, iso);
}

#[test]
fn test_config_from_json_document() {
    let config: CodecConfig =
        serde_json::from_str(r#"{"line_len": 0, "field_terminator": [30], "record_terminator": [29]}"#)
            .unwrap();
    let data = write_stream(&[numbered_record(2)], &config);
    assert!(!data.contains(&b'\n'));
    assert!(data.ends_with(b"\x1e\x1d"));

    let record = Record::from_bytes(&data, &config).unwrap();
    assert_eq!(record.fields, numbered_record(2).fields);
}
