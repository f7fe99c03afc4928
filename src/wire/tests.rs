use super::*;

#[test]
fn varint_round_trips_small_and_large_values() {
    for &v in &[0u64, 1, 127, 128, 16383, 16384, (1u64 << 35) + 7, u64::MAX] {
        let mut w = ByteWriter::new(model_size_max());
        w.write_varint(v, "S", "f").unwrap();
        let bytes = w.into_bytes();
        let mut r = ByteReader::new(&bytes);
        assert_eq!(r.read_varint64("f").unwrap(), v, "value {v}");
        assert!(r.is_empty());
    }
}

#[test]
fn varint32_fifth_byte_is_unconditionally_terminal() {
    // a 5th byte whose high bit is still set does not signal "more data";
    // shift==28 is terminal regardless.
    let bytes = [0xFF, 0xFF, 0xFF, 0xFF, 0xFF];
    let mut r = ByteReader::new(&bytes);
    let v = r.read_varint32("f").unwrap();
    assert_eq!(r.position(), 5);
    assert_eq!(v, u32::MAX);
}

#[test]
fn varint64_ninth_byte_is_unconditional() {
    // 8 continuation bytes then a 9th byte whose high bit would normally
    // signal "more data" but must instead be taken as a full 8-bit value.
    let bytes = [0xFF; 9];
    let mut r = ByteReader::new(&bytes);
    let v = r.read_varint64("f").unwrap();
    assert_eq!(r.position(), 9);
    assert_ne!(v, 0);
}

#[test]
fn reader_reports_eof_offset() {
    let bytes = [0x01];
    let mut r = ByteReader::new(&bytes);
    r.read_u8("a").unwrap();
    match r.read_u8("b") {
        Err(CodecError::Eof { offset, .. }) => assert_eq!(offset, 1),
        other => panic!("expected Eof, got {other:?}"),
    }
}

#[test]
fn writer_enforces_size_max() {
    let mut w = ByteWriter::new(2);
    w.write_u8(1, "S", "a").unwrap();
    w.write_u8(2, "S", "b").unwrap();
    assert!(w.write_u8(3, "S", "c").is_err());
}

fn model_size_max() -> u64 {
    crate::model::DEFAULT_SIZE_MAX
}

use crate::error::CodecError;
