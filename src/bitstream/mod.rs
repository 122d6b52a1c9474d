//! Bit-granular I/O over byte sources and sinks.
//!
//! Bits are packed most-significant-bit first within each byte. Headers are
//! bit-packed; payloads (string bytes, raw byte arrays, key names) are copied
//! byte-aligned after an explicit [`BitWriter::align`].
//!
//! ## Modules
//!
//! - [`writer`]: [`BitWriter`] over any [`std::io::Write`]
//! - [`reader`]: [`BitReader`] over any [`std::io::Read`]
//! - [`varint`]: the step/increment variable-length integer coding

pub mod reader;
pub mod varint;
pub mod writer;

pub use reader::BitReader;
pub use varint::VarInt;
pub use writer::BitWriter;

/// Number of bits needed to write any value in `0..bound`, i.e.
/// `ceil(log2(bound))`. Zero when `bound <= 1`.
pub fn bits_for_bound(bound: u64) -> u32 {
    if bound <= 1 {
        0
    } else {
        u64::BITS - (bound - 1).leading_zeros()
    }
}

#[inline]
pub(crate) fn low_mask(bits: u32) -> u64 {
    if bits >= 64 {
        u64::MAX
    } else {
        (1u64 << bits) - 1
    }
}
