//! Value kinds and the prefix code that tags them on the wire.
//!
//! The order of [`FIELD_TYPES`] is part of the format. The three most common
//! kinds get 2-bit tags, the next seven get 5-bit tags and the last two get
//! 6-bit tags:
//!
//! ```text
//! 00, 01, 10          -> entries 0..=2
//! 11 000 .. 11 110    -> entries 3..=9
//! 11 111 0, 11 111 1  -> entries 10, 11
//! ```

use std::{
    fmt,
    io::{Read, Write},
};

use bitbundle_error::{CodecError, CodecResult};
use num_enum::{IntoPrimitive, TryFromPrimitive};

use crate::{
    bitstream::{BitReader, BitWriter},
    bundle::Value,
};

/// The closed set of value kinds, plus the [`FieldType::Unknown`] sentinel.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, TryFromPrimitive, IntoPrimitive,
)]
#[repr(u8)]
pub enum FieldType {
    String = 0,
    Int = 1,
    Long = 2,
    Boolean = 3,
    Double = 4,
    Bundle = 5,
    Date = 6,
    Float = 7,
    Short = 8,
    Byte = 9,
    Char = 10,
    /// Tags a collection with no non-null element to classify. Never valid
    /// for a scalar or a present element.
    Unknown = 11,
}

/// Wire order of the type table. Index `i` is encoded with `PREFIX_CODES[i]`.
pub const FIELD_TYPES: [FieldType; 12] = [
    FieldType::String,
    FieldType::Int,
    FieldType::Long,
    FieldType::Boolean,
    FieldType::Double,
    FieldType::Bundle,
    FieldType::Date,
    FieldType::Float,
    FieldType::Short,
    FieldType::Byte,
    FieldType::Char,
    FieldType::Unknown,
];

/// `(pattern, bit length)` per table entry.
pub const PREFIX_CODES: [(u8, u8); 12] = [
    (0b00, 2),
    (0b01, 2),
    (0b10, 2),
    (0b11_000, 5),
    (0b11_001, 5),
    (0b11_010, 5),
    (0b11_011, 5),
    (0b11_100, 5),
    (0b11_101, 5),
    (0b11_110, 5),
    (0b11_111_0, 6),
    (0b11_111_1, 6),
];

const ESCAPE_2: u64 = 0b11;
const ESCAPE_3: u64 = 0b111;

/// Shape of a value slot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Shape {
    Scalar,
    List,
    Array,
}

impl FieldType {
    /// Number of real value kinds (the sentinel excluded).
    pub const KIND_COUNT: usize = 11;

    pub fn index(self) -> usize {
        u8::from(self) as usize
    }

    pub fn prefix_code(self) -> (u8, u8) {
        PREFIX_CODES[self.index()]
    }

    pub fn name(self) -> &'static str {
        match self {
            Self::String => "string",
            Self::Int => "int",
            Self::Long => "long",
            Self::Boolean => "boolean",
            Self::Double => "double",
            Self::Bundle => "bundle",
            Self::Date => "date",
            Self::Float => "float",
            Self::Short => "short",
            Self::Byte => "byte",
            Self::Char => "char",
            Self::Unknown => "unknown",
        }
    }

    pub fn write_tag<W: Write>(
        self,
        w: &mut BitWriter<W>,
    ) -> CodecResult<()> {
        let (pattern, bits) = self.prefix_code();
        w.write_bits(pattern as u64, bits as u32)
    }

    /// Decodes one prefix code. Every bit pattern maps to a table entry, so
    /// this only fails on truncated input.
    pub fn read_tag<R: Read>(r: &mut BitReader<R>) -> CodecResult<FieldType> {
        let first = r.read_bits(2)?;
        let index = if first != ESCAPE_2 {
            first
        } else {
            let second = r.read_bits(3)?;
            if second != ESCAPE_3 {
                3 + second
            } else {
                10 + r.read_bit()? as u64
            }
        };
        FieldType::try_from(index as u8).map_err(|_| {
            CodecError::malformed(format!("type table index {index} out of range")).into()
        })
    }

    /// Kind of a scalar value; `None` for arrays, lists and raw bytes.
    pub fn of_scalar(value: &Value) -> Option<FieldType> {
        let kind = match value {
            Value::Boolean(_) => Self::Boolean,
            Value::Byte(_) => Self::Byte,
            Value::Short(_) => Self::Short,
            Value::Char(_) => Self::Char,
            Value::Int(_) => Self::Int,
            Value::Long(_) => Self::Long,
            Value::Float(_) => Self::Float,
            Value::Double(_) => Self::Double,
            Value::String(_) => Self::String,
            Value::Date(_) => Self::Date,
            Value::Bundle(_) => Self::Bundle,
            Value::Bytes(_) | Value::Array(_) | Value::List(_) => return None,
        };
        Some(kind)
    }

    /// Unifies the element kinds of a collection.
    ///
    /// Null elements are skipped; a collection without any present element
    /// classifies as [`FieldType::Unknown`]. Nested collections and mixed
    /// kinds are rejected.
    pub fn of_elements(items: &[Option<Value>]) -> CodecResult<FieldType> {
        let mut unified: Option<FieldType> = None;
        for (i, item) in items.iter().enumerate() {
            let Some(item) = item else { continue };
            let Some(kind) = Self::of_scalar(item) else {
                return Err(CodecError::unsupported(format!(
                    "element {i} is itself a collection; nested arrays and lists are not supported"
                ))
                .into());
            };
            match unified {
                None => unified = Some(kind),
                Some(seen) if seen == kind => {}
                Some(seen) => {
                    return Err(CodecError::unsupported(format!(
                        "mixed element types {seen} and {kind} at element {i}"
                    ))
                    .into());
                }
            }
        }
        Ok(unified.unwrap_or(Self::Unknown))
    }

    /// Kind and shape of any value slot.
    pub fn classify(value: &Value) -> CodecResult<(FieldType, Shape)> {
        match value {
            Value::Bytes(_) => Ok((Self::Byte, Shape::Array)),
            Value::List(items) => Ok((Self::of_elements(items)?, Shape::List)),
            Value::Array(items) => match Self::of_elements(items)? {
                Self::Byte => Err(CodecError::unsupported(
                    "byte arrays carry no null flags; use Value::Bytes",
                )
                .into()),
                kind => Ok((kind, Shape::Array)),
            },
            scalar => match Self::of_scalar(scalar) {
                Some(kind) => Ok((kind, Shape::Scalar)),
                None => Err(CodecError::unsupported("unclassifiable value").into()),
            },
        }
    }
}

impl fmt::Display for FieldType {
    fn fmt(
        &self,
        f: &mut fmt::Formatter<'_>,
    ) -> fmt::Result {
        f.write_str(self.name())
    }
}
