//! Tests for the Line Decoder
//!
//! These tests verify:
//! - Decoding of ordinary, empty and null fields
//! - Escape handling
//! - Round trips through the encoder
//! - Pipelined lines on one stream
//! - Fault and end-of-stream reporting

use std::io::Cursor;

use handlersocket::protocol::{
    decode_line, encode_fields, DecoderState, Field, LineDecoder, Terminator, Value,
};
use handlersocket::HsError;

// =============================================================================
// Helper Functions
// =============================================================================

fn decode(bytes: &[u8]) -> Result<Vec<Field>, HsError> {
    let mut cursor = Cursor::new(bytes.to_vec());
    decode_line(&mut cursor).map(|line| line.into_fields())
}

// =============================================================================
// Basic Decoding Tests
// =============================================================================

#[test]
fn test_decode_with_null_field() {
    let fields = decode(b"0\x091\x09\x00\x0A").unwrap();
    assert_eq!(fields, vec![Field::from("0"), Field::from("1"), Field::Null]);
}

#[test]
fn test_decode_single_field() {
    let fields = decode(b"hello world\n").unwrap();
    assert_eq!(fields.len(), 1);
    assert_eq!(fields[0], "hello world");
}

#[test]
fn test_null_and_empty_are_distinct() {
    let fields = decode(b"\t\x00\tx\n").unwrap();
    assert_eq!(fields, vec![Field::empty(), Field::Null, Field::from("x")]);
    assert_ne!(fields[0], fields[1]);
    assert_eq!(fields[0].as_bytes(), Some(&b""[..]));
    assert_eq!(fields[1].as_bytes(), None);
}

#[test]
fn test_null_as_last_field() {
    let fields = decode(b"a\t\x00\n").unwrap();
    assert_eq!(fields, vec![Field::from("a"), Field::Null]);
}

#[test]
fn test_escape_decoding() {
    let fields = decode(b"\x01\x45A\t\x01\x40\x01\x4F\n").unwrap();
    assert_eq!(fields[0].as_bytes(), Some(&[0x05, 0x41][..]));
    assert_eq!(fields[1].as_bytes(), Some(&[0x00, 0x0F][..]));
}

#[test]
fn test_field_count_is_separators_plus_one() {
    for n in 0..5 {
        let mut bytes = Vec::new();
        for i in 0..n {
            bytes.extend_from_slice(format!("f{}\t", i).as_bytes());
        }
        bytes.extend_from_slice(b"last\n");
        assert_eq!(decode(&bytes).unwrap().len(), n + 1);
    }
}

#[test]
fn test_non_utf8_field() {
    let fields = decode(b"\xff\xfe\n").unwrap();
    assert_eq!(fields[0].as_bytes(), Some(&[0xFF, 0xFE][..]));
    assert_eq!(fields[0].as_str(), None);
}

// =============================================================================
// Round Trip Tests
// =============================================================================

#[test]
fn test_round_trip_all_byte_values() {
    let all: Vec<u8> = (0u8..=255).collect();
    let encoded = encode_fields(&[Value::from(all.clone())], Terminator::LineEnd);
    let fields = decode(&encoded).unwrap();
    assert_eq!(fields, vec![Field::from(all)]);
}

#[test]
fn test_round_trip_each_single_byte() {
    for b in 0u8..=255 {
        let encoded = encode_fields(&[Value::from(vec![b])], Terminator::LineEnd);
        let fields = decode(&encoded).unwrap();
        assert_eq!(fields[0].as_bytes(), Some(&[b][..]), "byte 0x{:02x}", b);
    }
}

#[test]
fn test_round_trip_with_segment_separator() {
    let value = vec![0x00u8, 0x09, 0x0A, b'z'];
    let mut bytes = encode_fields(&[Value::from(value.clone())], Terminator::Separator).to_vec();
    bytes.extend_from_slice(&encode_fields(&[Value::from("end")], Terminator::LineEnd));

    let fields = decode(&bytes).unwrap();
    assert_eq!(fields, vec![Field::from(value), Field::from("end")]);
}

#[test]
fn test_round_trip_null_and_empty() {
    let values = vec![Value::from(""), Value::Null, Value::from("x")];
    let fields = decode(&encode_fields(&values, Terminator::LineEnd)).unwrap();
    assert_eq!(fields, vec![Field::empty(), Field::Null, Field::from("x")]);
}

#[test]
fn test_field_into_value_reencodes() {
    let original = b"a\x01\x42b\t\x00\n";
    let fields = decode(original).unwrap();
    let values: Vec<Value> = fields.into_iter().map(Field::into_value).collect();
    assert_eq!(&encode_fields(&values, Terminator::LineEnd)[..], &original[..]);
}

// =============================================================================
// Stream Tests
// =============================================================================

#[test]
fn test_pipelined_lines() {
    let mut cursor = Cursor::new(b"0\t1\n0\t1\tv\n2\t1\terr\n".to_vec());

    assert_eq!(decode_line(&mut cursor).unwrap().len(), 2);
    assert_eq!(decode_line(&mut cursor).unwrap().len(), 3);
    let third = decode_line(&mut cursor).unwrap();
    assert_eq!(third[2], "err");

    let err = decode_line(&mut cursor).unwrap_err();
    assert!(err.is_eof());
}

#[test]
fn test_decode_from_byte_slice_reader() {
    let mut reader: &[u8] = b"a\tb\nrest";
    let line = decode_line(&mut reader).unwrap();
    assert_eq!(line.fields(), &[Field::from("a"), Field::from("b")]);
    assert_eq!(reader, b"rest");
}

#[test]
fn test_incremental_decoder_across_chunks() {
    let mut decoder = LineDecoder::new();

    let (consumed, line) = decoder.decode(b"ab\x01").unwrap();
    assert_eq!(consumed, 3);
    assert!(line.is_none());
    assert_eq!(decoder.state(), DecoderState::EscapePending);

    let (consumed, line) = decoder.decode(b"\x41\t\x00").unwrap();
    assert_eq!(consumed, 3);
    assert!(line.is_none());
    assert_eq!(decoder.state(), DecoderState::NullPending);
    assert_eq!(decoder.fields_decoded(), 1);

    let (consumed, line) = decoder.decode(b"\nnext").unwrap();
    assert_eq!(consumed, 1);
    let line = line.unwrap();
    assert_eq!(line[0].as_bytes(), Some(&b"ab\x01"[..]));
    assert_eq!(line[1], Field::Null);
}

// =============================================================================
// Error Handling Tests
// =============================================================================

#[test]
fn test_missing_terminator_is_eof() {
    let err = decode(b"a\tb\tc").unwrap_err();
    assert!(err.is_eof());
    assert!(!matches!(err, HsError::Decode { .. }));
}

#[test]
fn test_empty_stream_is_eof() {
    assert!(decode(b"").unwrap_err().is_eof());
}

#[test]
fn test_terminator_after_separator_is_fault() {
    let err = decode(b"a\t\n").unwrap_err();
    match err {
        HsError::Decode { byte, state } => {
            assert_eq!(byte, 0x0A);
            assert_eq!(state, DecoderState::StartField);
        }
        other => panic!("Expected decode fault, got {:?}", other),
    }
}

#[test]
fn test_bare_terminator_is_fault() {
    assert!(matches!(decode(b"\n"), Err(HsError::Decode { byte: 0x0A, .. })));
}

#[test]
fn test_bad_escape_payload() {
    let err = decode(b"a\x01\x39\n").unwrap_err();
    assert!(matches!(
        err,
        HsError::Decode { byte: 0x39, state: DecoderState::EscapePending }
    ));
    assert!(err.to_string().contains("ESCAPE_PENDING"));
}

#[test]
fn test_null_marker_followed_by_data() {
    let err = decode(b"\x00a\n").unwrap_err();
    assert!(matches!(
        err,
        HsError::Decode { byte: b'a', state: DecoderState::NullPending }
    ));
}

#[test]
fn test_raw_control_byte_in_field() {
    let err = decode(b"ab\x05\n").unwrap_err();
    assert!(matches!(
        err,
        HsError::Decode { byte: 0x05, state: DecoderState::InField }
    ));
    assert!(!err.is_recoverable());
}
