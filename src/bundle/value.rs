use std::{
    fmt,
    hash::{Hash, Hasher},
    mem,
};

use ordered_float::OrderedFloat;
use serde::{Deserialize, Serialize};

use super::{Bundle, Date};
use crate::field_type::FieldType;

/// A value slot of a [`Bundle`].
///
/// Arrays and lists hold `Option` elements so nulls can appear inside a
/// collection. Byte arrays are the exception: they are [`Value::Bytes`], raw
/// contiguous bytes without null tracking.
///
/// Floating point values compare and hash by total order (`NaN == NaN`), so
/// a decoded Bundle always equals the one that was encoded.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum Value {
    Boolean(bool),
    Byte(i8),
    Short(i16),
    /// A UTF-16 code unit.
    Char(u16),
    Int(i32),
    Long(i64),
    Float(f32),
    Double(f64),
    String(String),
    Date(Date),
    Bundle(Bundle),
    /// Byte array.
    Bytes(Vec<u8>),
    /// Fixed-size array.
    Array(Vec<Option<Value>>),
    /// Growable list.
    List(Vec<Option<Value>>),
}

/// Conversion between a Rust type and the scalar [`Value`] variant of one
/// [`FieldType`].
pub trait FieldValue: Sized {
    const FIELD_TYPE: FieldType;

    fn into_value(self) -> Value;

    fn from_value(value: &Value) -> Option<Self>;
}

macro_rules! field_value {
    ($($ty:ty => $variant:ident;)*) => {
        $(
            impl FieldValue for $ty {
                const FIELD_TYPE: FieldType = FieldType::$variant;

                fn into_value(self) -> Value {
                    Value::$variant(self)
                }

                fn from_value(value: &Value) -> Option<Self> {
                    match value {
                        Value::$variant(v) => Some(v.clone()),
                        _ => None,
                    }
                }
            }

            impl From<$ty> for Value {
                fn from(v: $ty) -> Self {
                    Value::$variant(v)
                }
            }
        )*
    };
}

field_value! {
    bool => Boolean;
    i8 => Byte;
    i16 => Short;
    u16 => Char;
    i32 => Int;
    i64 => Long;
    f32 => Float;
    f64 => Double;
    String => String;
    Date => Date;
    Bundle => Bundle;
}

impl From<&str> for Value {
    fn from(v: &str) -> Self {
        Value::String(v.to_string())
    }
}

impl From<Vec<u8>> for Value {
    fn from(v: Vec<u8>) -> Self {
        Value::Bytes(v)
    }
}

impl From<&[u8]> for Value {
    fn from(v: &[u8]) -> Self {
        Value::Bytes(v.to_vec())
    }
}

impl Value {
    /// Array with every element present.
    pub fn array<T: FieldValue>(items: impl IntoIterator<Item = T>) -> Self {
        Value::Array(items.into_iter().map(|v| Some(v.into_value())).collect())
    }

    pub fn nullable_array<T: FieldValue>(items: impl IntoIterator<Item = Option<T>>) -> Self {
        Value::Array(
            items
                .into_iter()
                .map(|v| v.map(FieldValue::into_value))
                .collect(),
        )
    }

    /// List with every element present.
    pub fn list<T: FieldValue>(items: impl IntoIterator<Item = T>) -> Self {
        Value::List(items.into_iter().map(|v| Some(v.into_value())).collect())
    }

    pub fn nullable_list<T: FieldValue>(items: impl IntoIterator<Item = Option<T>>) -> Self {
        Value::List(
            items
                .into_iter()
                .map(|v| v.map(FieldValue::into_value))
                .collect(),
        )
    }

    pub fn is_collection(&self) -> bool {
        matches!(self, Value::Bytes(_) | Value::Array(_) | Value::List(_))
    }

    /// Scalar kind, `None` for collections.
    pub fn field_type(&self) -> Option<FieldType> {
        FieldType::of_scalar(self)
    }

    pub fn as_scalar<T: FieldValue>(&self) -> Option<T> {
        T::from_value(self)
    }

    /// Elements of an array, typed. `None` if this is not an array or an
    /// element is of a different kind.
    pub fn as_array_of<T: FieldValue>(&self) -> Option<Vec<Option<T>>> {
        match self {
            Value::Array(items) => typed_elements(items),
            _ => None,
        }
    }

    pub fn as_list_of<T: FieldValue>(&self) -> Option<Vec<Option<T>>> {
        match self {
            Value::List(items) => typed_elements(items),
            _ => None,
        }
    }

    pub fn as_bytes(&self) -> Option<&[u8]> {
        match self {
            Value::Bytes(b) => Some(b),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::String(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_bundle(&self) -> Option<&Bundle> {
        match self {
            Value::Bundle(b) => Some(b),
            _ => None,
        }
    }
}

fn typed_elements<T: FieldValue>(items: &[Option<Value>]) -> Option<Vec<Option<T>>> {
    items
        .iter()
        .map(|item| match item {
            None => Some(None),
            Some(v) => T::from_value(v).map(Some),
        })
        .collect()
}

impl PartialEq for Value {
    fn eq(
        &self,
        other: &Self,
    ) -> bool {
        use Value::*;
        match (self, other) {
            (Boolean(a), Boolean(b)) => a == b,
            (Byte(a), Byte(b)) => a == b,
            (Short(a), Short(b)) => a == b,
            (Char(a), Char(b)) => a == b,
            (Int(a), Int(b)) => a == b,
            (Long(a), Long(b)) => a == b,
            (Float(a), Float(b)) => OrderedFloat(*a) == OrderedFloat(*b),
            (Double(a), Double(b)) => OrderedFloat(*a) == OrderedFloat(*b),
            (String(a), String(b)) => a == b,
            (Date(a), Date(b)) => a == b,
            (Bundle(a), Bundle(b)) => a == b,
            (Bytes(a), Bytes(b)) => a == b,
            (Array(a), Array(b)) => a == b,
            (List(a), List(b)) => a == b,
            _ => false,
        }
    }
}

impl Eq for Value {}

impl Hash for Value {
    fn hash<H: Hasher>(
        &self,
        state: &mut H,
    ) {
        mem::discriminant(self).hash(state);
        match self {
            Value::Boolean(v) => v.hash(state),
            Value::Byte(v) => v.hash(state),
            Value::Short(v) => v.hash(state),
            Value::Char(v) => v.hash(state),
            Value::Int(v) => v.hash(state),
            Value::Long(v) => v.hash(state),
            Value::Float(v) => OrderedFloat(*v).hash(state),
            Value::Double(v) => OrderedFloat(*v).hash(state),
            Value::String(v) => v.hash(state),
            Value::Date(v) => v.hash(state),
            Value::Bundle(v) => v.hash(state),
            Value::Bytes(v) => v.hash(state),
            Value::Array(v) | Value::List(v) => v.hash(state),
        }
    }
}

impl fmt::Display for Value {
    fn fmt(
        &self,
        f: &mut fmt::Formatter<'_>,
    ) -> fmt::Result {
        match self {
            Value::Boolean(v) => write!(f, "{v}"),
            Value::Byte(v) => write!(f, "{v}b"),
            Value::Short(v) => write!(f, "{v}s"),
            Value::Char(v) => match char::from_u32(*v as u32) {
                Some(c) => write!(f, "'{c}'"),
                None => write!(f, "'\\u{v:04x}'"),
            },
            Value::Int(v) => write!(f, "{v}"),
            Value::Long(v) => write!(f, "{v}L"),
            Value::Float(v) => write!(f, "{v}f"),
            Value::Double(v) => write!(f, "{v}"),
            Value::String(v) => write!(f, "{v:?}"),
            Value::Date(v) => write!(f, "{v}"),
            Value::Bundle(v) => write!(f, "{v}"),
            Value::Bytes(v) => write!(f, "bytes[{}]", v.len()),
            Value::Array(items) => write_items(f, "[", items, "]"),
            Value::List(items) => write_items(f, "(", items, ")"),
        }
    }
}

fn write_items(
    f: &mut fmt::Formatter<'_>,
    open: &str,
    items: &[Option<Value>],
    close: &str,
) -> fmt::Result {
    f.write_str(open)?;
    for (i, item) in items.iter().enumerate() {
        if i > 0 {
            f.write_str(", ")?;
        }
        match item {
            Some(v) => write!(f, "{v}")?,
            None => f.write_str("null")?,
        }
    }
    f.write_str(close)
}
