use std::io::Read;

use bitbundle_error::{CodecError, CodecResult};

use super::{
    bits_for_bound, low_mask,
    varint::{VarInt, INT_BITS, LONG_BITS},
};

/// Forward-only bit source, the mirror of [`BitWriter`](super::BitWriter).
///
/// Running out of input is a hard failure carrying the bit position where
/// the read was attempted.
pub struct BitReader<R: Read> {
    inner: R,
    current: u8,
    remaining: u8,
    position: u64,
}

impl<R: Read> BitReader<R> {
    pub fn new(inner: R) -> Self {
        Self {
            inner,
            current: 0,
            remaining: 0,
            position: 0,
        }
    }

    /// Total number of bits consumed so far, skipped padding included.
    pub fn bit_position(&self) -> u64 {
        self.position
    }

    pub fn is_aligned(&self) -> bool {
        self.remaining == 0
    }

    pub fn into_inner(self) -> R {
        self.inner
    }

    pub fn read_bit(&mut self) -> CodecResult<bool> {
        if self.remaining == 0 {
            self.fill()?;
        }
        self.remaining -= 1;
        self.position += 1;
        Ok((self.current >> self.remaining) & 1 == 1)
    }

    /// Reads an `n`-bit unsigned field, most significant bit first.
    pub fn read_bits(
        &mut self,
        n: u32,
    ) -> CodecResult<u64> {
        if n == 0 || n > 64 {
            return Err(CodecError::invalid_config(format!(
                "bit field width {n} outside [1, 64]"
            ))
            .into());
        }

        let mut value = 0u64;
        let mut remaining = n;
        while remaining > 0 {
            if self.remaining == 0 {
                self.fill()?;
            }
            let take = (self.remaining as u32).min(remaining);
            let shift = self.remaining as u32 - take;
            let chunk = (self.current as u64 >> shift) & low_mask(take);
            value = (value << take) | chunk;
            self.remaining -= take as u8;
            self.position += take as u64;
            remaining -= take;
        }
        Ok(value)
    }

    /// Discards the rest of the current byte. No-op when already aligned.
    pub fn align(&mut self) {
        self.position += self.remaining as u64;
        self.remaining = 0;
    }

    /// Aligns, then reads exactly `len` raw bytes.
    ///
    /// The buffer grows with the data actually read, so a corrupt length
    /// cannot force a huge allocation up front.
    pub fn read_bytes(
        &mut self,
        len: usize,
    ) -> CodecResult<Vec<u8>> {
        self.align();
        let mut buf = Vec::new();
        (&mut self.inner)
            .take(len as u64)
            .read_to_end(&mut buf)?;
        if buf.len() < len {
            return Err(CodecError::eof(format!(
                "expected {len} payload bytes, got {}",
                buf.len()
            ))
            .with_offset(self.position)
            .into());
        }
        self.position += len as u64 * 8;
        Ok(buf)
    }

    /// Reads a value written by
    /// [`BitWriter::write_bounded`](super::BitWriter::write_bounded).
    /// Returns the raw value; range checking is left to the caller, which
    /// knows what an out-of-range value means.
    pub fn read_bounded(
        &mut self,
        bound: u64,
    ) -> CodecResult<u64> {
        match bits_for_bound(bound) {
            0 => Ok(0),
            bits => self.read_bits(bits),
        }
    }

    pub fn read_variable_int(
        &mut self,
        coding: VarInt,
    ) -> CodecResult<i32> {
        coding.check(INT_BITS)?;
        let raw = self.read_chunks(INT_BITS, coding)?;
        Ok(coding.unmap_int(raw))
    }

    pub fn read_variable_long(
        &mut self,
        coding: VarInt,
    ) -> CodecResult<i64> {
        coding.check(LONG_BITS)?;
        let raw = self.read_chunks(LONG_BITS, coding)?;
        Ok(coding.unmap_long(raw))
    }

    fn read_chunks(
        &mut self,
        width: u32,
        coding: VarInt,
    ) -> CodecResult<u64> {
        let mut step = coding.step;
        let mut emitted = 0u32;
        let mut raw = 0u64;
        loop {
            let take = step.min(width - emitted);
            raw |= self.read_bits(take)? << emitted;
            emitted += take;
            if emitted >= width || !self.read_bit()? {
                return Ok(raw);
            }
            step = step.saturating_add(coding.increment);
        }
    }

    fn fill(&mut self) -> CodecResult<()> {
        let mut byte = [0u8; 1];
        self.inner
            .read_exact(&mut byte)
            .map_err(|e| CodecError::from(e).with_offset(self.position))?;
        self.current = byte[0];
        self.remaining = 8;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bitstream::BitWriter;

    #[test]
    fn test_read_bits_msb_first() {
        let data = [0b1010_1000u8];
        let mut r = BitReader::new(&data[..]);
        assert!(r.read_bit().unwrap());
        assert!(!r.read_bit().unwrap());
        assert_eq!(r.read_bits(3).unwrap(), 0b101);
        assert_eq!(r.bit_position(), 5);
    }

    #[test]
    fn test_read_bits_across_byte_boundary() {
        let data = [0b1111_0101u8, 0b0111_1001, 0b1010_0000];
        let mut r = BitReader::new(&data[..]);
        assert_eq!(r.read_bits(3).unwrap(), 0b111);
        assert_eq!(r.read_bits(16).unwrap(), 0xABCD);
    }

    #[test]
    fn test_read_64_bits() {
        let data = [0x01u8, 0x23, 0x45, 0x67, 0x89, 0xAB, 0xCD, 0xEF];
        let mut r = BitReader::new(&data[..]);
        assert_eq!(r.read_bits(64).unwrap(), 0x0123_4567_89AB_CDEF);
    }

    #[test]
    fn test_align_discards_partial_byte() {
        let data = [0b1000_0000u8, 0x42];
        let mut r = BitReader::new(&data[..]);
        r.read_bit().unwrap();
        r.align();
        let pos = r.bit_position();
        r.align();
        assert_eq!(r.bit_position(), pos);
        assert_eq!(r.read_bits(8).unwrap(), 0x42);
    }

    /// Тест проверяет, что обрыв потока даёт UnexpectedEof с позицией.
    #[test]
    fn test_eof_is_reported_with_offset() {
        let data = [0xFFu8];
        let mut r = BitReader::new(&data[..]);
        r.read_bits(8).unwrap();
        let err = r.read_bit().unwrap_err();
        match err.downcast_ref::<CodecError>() {
            Some(CodecError::UnexpectedEof { bit_offset, .. }) => {
                assert_eq!(*bit_offset, Some(8));
            }
            other => panic!("expected UnexpectedEof, got {other:?}"),
        }
    }

    #[test]
    fn test_read_bytes_truncated() {
        let data = [1u8, 2, 3];
        let mut r = BitReader::new(&data[..]);
        let err = r.read_bytes(10).unwrap_err();
        assert!(matches!(
            err.downcast_ref::<CodecError>(),
            Some(CodecError::UnexpectedEof { .. })
        ));
    }

    #[test]
    fn test_variable_int_roundtrip_through_writer() {
        let coding = VarInt::signed(3, 4);
        let values = [0, 1, -1, 63, -64, 1 << 20, i32::MIN, i32::MAX];

        let mut w = BitWriter::new(Vec::new());
        for v in values {
            w.write_variable_int(v, coding).unwrap();
        }
        let bytes = w.finish().unwrap();

        let mut r = BitReader::new(bytes.as_slice());
        for v in values {
            assert_eq!(r.read_variable_int(coding).unwrap(), v);
        }
    }

    #[test]
    fn test_bounded_roundtrip() {
        let mut w = BitWriter::new(Vec::new());
        w.write_bounded(0, 1).unwrap();
        w.write_bounded(4, 5).unwrap();
        w.write_bounded(255, 256).unwrap();
        let bytes = w.finish().unwrap();

        let mut r = BitReader::new(bytes.as_slice());
        assert_eq!(r.read_bounded(1).unwrap(), 0);
        assert_eq!(r.read_bounded(5).unwrap(), 4);
        assert_eq!(r.read_bounded(256).unwrap(), 255);
        assert_eq!(r.bit_position(), 11);
    }
}
