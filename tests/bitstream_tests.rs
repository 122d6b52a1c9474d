//! Bit-stream и variable-length integer на граничных значениях.

use bitbundle::{BitReader, BitWriter, CodecError, VarInt};
use rstest::rstest;

fn roundtrip_int(
    values: &[i32],
    coding: VarInt,
) -> Vec<i32> {
    let mut w = BitWriter::new(Vec::new());
    for &v in values {
        w.write_variable_int(v, coding).unwrap();
    }
    let bytes = w.finish().unwrap();
    let mut r = BitReader::new(bytes.as_slice());
    values
        .iter()
        .map(|_| r.read_variable_int(coding).unwrap())
        .collect()
}

#[rstest]
#[case(VarInt::signed(3, 4))]
#[case(VarInt::signed(3, 0))]
#[case(VarInt::signed(1, 0))]
#[case(VarInt::signed(7, 0))]
#[case(VarInt::signed(31, 0))]
#[case(VarInt::unsigned(3, 4))]
#[case(VarInt::unsigned(3, 0))]
#[case(VarInt::unsigned(1, 1))]
fn test_int_extremes(#[case] coding: VarInt) {
    let values = [i32::MIN, i32::MAX, 0, -1, 1];
    assert_eq!(roundtrip_int(&values, coding), values);
}

#[rstest]
#[case(VarInt::signed(7, 0))]
#[case(VarInt::unsigned(7, 0))]
#[case(VarInt::signed(1, 0))]
#[case(VarInt::signed(63, 0))]
#[case(VarInt::unsigned(3, 9))]
fn test_long_extremes(#[case] coding: VarInt) {
    let values = [i64::MIN, i64::MAX, 0, -1, 1];
    let mut w = BitWriter::new(Vec::new());
    for v in values {
        w.write_variable_long(v, coding).unwrap();
    }
    let bytes = w.finish().unwrap();
    let mut r = BitReader::new(bytes.as_slice());
    for v in values {
        assert_eq!(r.read_variable_long(coding).unwrap(), v);
    }
}

/// Полный 32-битный unsigned с шагом 3 без приращения: 10 кусков по 3 бита,
/// последний 2-битный, и 10 битов продолжения (после последнего не пишется).
#[test]
fn test_no_continuation_bit_after_full_width() {
    let coding = VarInt::unsigned(3, 0);
    let mut w = BitWriter::new(Vec::new());
    w.write_variable_int(-1, coding).unwrap();
    assert_eq!(w.bit_position(), 32 + 10);
}

#[rstest]
#[case(0, 4)]
#[case(7, 4)]
#[case(8, 12)]
#[case(1023, 12)]
#[case(1024, 24)]
fn test_step_increment_widths(
    #[case] value: i32,
    #[case] bits: u64,
) {
    // chunks of 3, 7, 11, ... bits, each with its continuation bit
    let mut w = BitWriter::new(Vec::new());
    w.write_variable_int(value, VarInt::unsigned(3, 4)).unwrap();
    assert_eq!(w.bit_position(), bits);
}

#[rstest]
#[case(0)]
#[case(32)]
#[case(100)]
fn test_invalid_int_step(#[case] step: u32) {
    let mut w = BitWriter::new(Vec::new());
    let err = w
        .write_variable_int(5, VarInt::signed(step, 0))
        .unwrap_err();
    assert!(matches!(
        err.downcast_ref::<CodecError>(),
        Some(CodecError::InvalidConfiguration { .. })
    ));

    let mut r = BitReader::new(&[0u8; 8][..]);
    assert!(r.read_variable_int(VarInt::signed(step, 0)).is_err());
}

#[test]
fn test_mixed_fields_roundtrip() {
    let mut w = BitWriter::new(Vec::new());
    w.write_bit(true).unwrap();
    w.write_bits(0x1F, 5).unwrap();
    w.write_bounded(2, 3).unwrap();
    w.write_bytes(b"xyz").unwrap();
    w.write_bits(u64::MAX, 64).unwrap();
    let bytes = w.finish().unwrap();

    let mut r = BitReader::new(bytes.as_slice());
    assert!(r.read_bit().unwrap());
    assert_eq!(r.read_bits(5).unwrap(), 0x1F);
    assert_eq!(r.read_bounded(3).unwrap(), 2);
    assert_eq!(r.read_bytes(3).unwrap(), b"xyz");
    assert_eq!(r.read_bits(64).unwrap(), u64::MAX);
}

/// Двойной align на выровненном потоке не меняет позицию ни при записи,
/// ни при чтении.
#[test]
fn test_align_idempotent_both_sides() {
    let mut w = BitWriter::new(Vec::new());
    w.write_bits(0b101, 3).unwrap();
    w.align().unwrap();
    w.align().unwrap();
    w.align().unwrap();
    assert_eq!(w.bit_position(), 8);
    w.write_bits(0xAB, 8).unwrap();
    let bytes = w.finish().unwrap();
    assert_eq!(bytes, vec![0b1010_0000, 0xAB]);

    let mut r = BitReader::new(bytes.as_slice());
    r.read_bits(3).unwrap();
    r.align();
    r.align();
    assert_eq!(r.bit_position(), 8);
    assert_eq!(r.read_bits(8).unwrap(), 0xAB);
}
