//! Variable-length integer parameters of every wire field.
//!
//! Encoder and decoder read the same table; changing any entry changes the
//! format.

use crate::bitstream::VarInt;

pub const KEY_COUNT: VarInt = VarInt::unsigned(3, 0);
pub const KEY_LENGTH: VarInt = VarInt::unsigned(3, 0);
/// Sign carries the has-nulls flag, magnitude the element count.
pub const ELEMENT_COUNT: VarInt = VarInt::signed(3, 0);
pub const BYTES_LENGTH: VarInt = VarInt::unsigned(3, 4);
pub const STRING_LENGTH: VarInt = VarInt::unsigned(3, 4);

pub const SHORT: VarInt = VarInt::signed(3, 0);
pub const INT: VarInt = VarInt::signed(3, 4);
pub const CHAR: VarInt = VarInt::unsigned(3, 0);
pub const LONG: VarInt = VarInt::signed(7, 0);
/// IEEE-754 bit pattern of a float.
pub const FLOAT_BITS: VarInt = VarInt::unsigned(7, 0);
/// IEEE-754 bit pattern of a double.
pub const DOUBLE_BITS: VarInt = VarInt::unsigned(7, 0);
/// Epoch milliseconds.
pub const DATE: VarInt = VarInt::unsigned(7, 0);
