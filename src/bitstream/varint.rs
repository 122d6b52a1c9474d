//! Variable-length integer coding with growing chunk widths.
//!
//! A value is emitted low chunk first. The first chunk is `step` bits wide;
//! each chunk is followed by one continuation bit (`1` = more chunks follow)
//! and the next chunk is `step + increment` bits wide. Once all 32 (or 64)
//! value bits have been emitted the continuation bit is omitted, so the
//! worst case never exceeds the fixed width by more than the continuation
//! bits actually needed.
//!
//! Signed values are zig-zag mapped first so small magnitudes of either sign
//! stay short:
//!
//! | value | mapped |
//! |-------|--------|
//! | 0     | 0      |
//! | -1    | 1      |
//! | 1     | 2      |
//! | -2    | 3      |

use bitbundle_error::{ensure, CodecError, CodecResult};

/// Bit width of the int form.
pub const INT_BITS: u32 = 32;
/// Bit width of the long form.
pub const LONG_BITS: u32 = 64;

/// Parameters of one variable-length integer field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct VarInt {
    pub step: u32,
    pub increment: u32,
    pub signed: bool,
}

impl VarInt {
    pub const fn unsigned(
        step: u32,
        increment: u32,
    ) -> Self {
        Self {
            step,
            increment,
            signed: false,
        }
    }

    pub const fn signed(
        step: u32,
        increment: u32,
    ) -> Self {
        Self {
            step,
            increment,
            signed: true,
        }
    }

    /// Rejects a `step` outside `[1, width - 1]`.
    pub fn check(
        &self,
        width: u32,
    ) -> CodecResult<()> {
        ensure!(
            self.step > 0 && self.step < width,
            CodecError::invalid_config(format!(
                "variable-length step {} outside [1, {}]",
                self.step,
                width - 1
            ))
        );
        Ok(())
    }

    /// Maps an int to the unsigned magnitude that is actually chunked.
    pub fn map_int(
        &self,
        value: i32,
    ) -> u64 {
        if self.signed {
            zigzag_i32(value) as u64
        } else {
            value as u32 as u64
        }
    }

    pub fn unmap_int(
        &self,
        raw: u64,
    ) -> i32 {
        if self.signed {
            unzigzag_i32(raw as u32)
        } else {
            raw as u32 as i32
        }
    }

    pub fn map_long(
        &self,
        value: i64,
    ) -> u64 {
        if self.signed {
            zigzag_i64(value)
        } else {
            value as u64
        }
    }

    pub fn unmap_long(
        &self,
        raw: u64,
    ) -> i64 {
        if self.signed {
            unzigzag_i64(raw)
        } else {
            raw as i64
        }
    }

    /// Number of bits the mapped value `raw` occupies, continuation bits
    /// included, without writing anything.
    pub fn encoded_bits(
        &self,
        mut raw: u64,
        width: u32,
    ) -> u32 {
        let mut step = self.step;
        let mut emitted = 0u32;
        let mut total = 0u32;
        loop {
            let take = step.min(width - emitted);
            total += take;
            emitted += take;
            raw = if take >= 64 { 0 } else { raw >> take };
            if emitted >= width {
                return total;
            }
            total += 1;
            if raw == 0 {
                return total;
            }
            step = step.saturating_add(self.increment);
        }
    }
}

#[inline]
pub fn zigzag_i32(v: i32) -> u32 {
    ((v << 1) ^ (v >> 31)) as u32
}

#[inline]
pub fn unzigzag_i32(u: u32) -> i32 {
    ((u >> 1) as i32) ^ -((u & 1) as i32)
}

#[inline]
pub fn zigzag_i64(v: i64) -> u64 {
    ((v << 1) ^ (v >> 63)) as u64
}

#[inline]
pub fn unzigzag_i64(u: u64) -> i64 {
    ((u >> 1) as i64) ^ -((u & 1) as i64)
}
