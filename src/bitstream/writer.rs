use std::io::Write;

use bitbundle_error::{CodecError, CodecResult};

use super::{
    bits_for_bound, low_mask,
    varint::{VarInt, INT_BITS, LONG_BITS},
};

/// Forward-only bit sink.
///
/// Bits accumulate in a one-byte buffer that is flushed to the inner writer
/// as soon as it is full. [`align`](Self::align) pads the partial byte with
/// zero bits.
pub struct BitWriter<W: Write> {
    inner: W,
    current: u8,
    filled: u8,
    position: u64,
}

impl<W: Write> BitWriter<W> {
    pub fn new(inner: W) -> Self {
        Self {
            inner,
            current: 0,
            filled: 0,
            position: 0,
        }
    }

    /// Total number of bits written so far, padding included.
    pub fn bit_position(&self) -> u64 {
        self.position
    }

    pub fn is_aligned(&self) -> bool {
        self.filled == 0
    }

    pub fn write_bit(
        &mut self,
        bit: bool,
    ) -> CodecResult<()> {
        self.current = (self.current << 1) | bit as u8;
        self.filled += 1;
        self.position += 1;
        if self.filled == 8 {
            self.flush_byte()?;
        }
        Ok(())
    }

    /// Writes the low `n` bits of `value`, most significant first.
    pub fn write_bits(
        &mut self,
        value: u64,
        n: u32,
    ) -> CodecResult<()> {
        if n == 0 || n > 64 {
            return Err(CodecError::invalid_config(format!(
                "bit field width {n} outside [1, 64]"
            ))
            .into());
        }

        let mut remaining = n;
        while remaining > 0 {
            let free = 8 - self.filled as u32;
            let take = free.min(remaining);
            let shift = remaining - take;
            let chunk = ((value >> shift) & low_mask(take)) as u8;
            self.current = if take == 8 {
                chunk
            } else {
                (self.current << take) | chunk
            };
            self.filled += take as u8;
            self.position += take as u64;
            remaining -= take;
            if self.filled == 8 {
                self.flush_byte()?;
            }
        }
        Ok(())
    }

    /// Zero-pads the current byte and flushes it. No-op when already aligned.
    pub fn align(&mut self) -> CodecResult<()> {
        if self.filled == 0 {
            return Ok(());
        }
        let pad = 8 - self.filled;
        self.current <<= pad;
        self.position += pad as u64;
        self.flush_byte()
    }

    /// Aligns, then copies `bytes` verbatim.
    pub fn write_bytes(
        &mut self,
        bytes: &[u8],
    ) -> CodecResult<()> {
        self.align()?;
        self.inner.write_all(bytes)?;
        self.position += bytes.len() as u64 * 8;
        Ok(())
    }

    /// Writes `value` in `ceil(log2(bound))` bits. Nothing is written when
    /// `bound <= 1`.
    pub fn write_bounded(
        &mut self,
        value: u64,
        bound: u64,
    ) -> CodecResult<()> {
        if value >= bound {
            return Err(CodecError::invalid_config(format!(
                "bounded value {value} not below {bound}"
            ))
            .into());
        }
        match bits_for_bound(bound) {
            0 => Ok(()),
            bits => self.write_bits(value, bits),
        }
    }

    pub fn write_variable_int(
        &mut self,
        value: i32,
        coding: VarInt,
    ) -> CodecResult<()> {
        coding.check(INT_BITS)?;
        self.write_chunks(coding.map_int(value), INT_BITS, coding)
    }

    pub fn write_variable_long(
        &mut self,
        value: i64,
        coding: VarInt,
    ) -> CodecResult<()> {
        coding.check(LONG_BITS)?;
        self.write_chunks(coding.map_long(value), LONG_BITS, coding)
    }

    /// Aligns, flushes the inner writer and hands it back.
    pub fn finish(mut self) -> CodecResult<W> {
        self.align()?;
        self.inner.flush()?;
        Ok(self.inner)
    }

    fn write_chunks(
        &mut self,
        mut raw: u64,
        width: u32,
        coding: VarInt,
    ) -> CodecResult<()> {
        let mut step = coding.step;
        let mut emitted = 0u32;
        loop {
            let take = step.min(width - emitted);
            self.write_bits(raw & low_mask(take), take)?;
            raw >>= take;
            emitted += take;
            if emitted >= width {
                return Ok(());
            }
            let more = raw != 0;
            self.write_bit(more)?;
            if !more {
                return Ok(());
            }
            step = step.saturating_add(coding.increment);
        }
    }

    fn flush_byte(&mut self) -> CodecResult<()> {
        self.inner.write_all(&[self.current])?;
        self.current = 0;
        self.filled = 0;
        Ok(())
    }
}
