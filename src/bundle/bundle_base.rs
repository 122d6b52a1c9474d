use std::{
    collections::{btree_map, BTreeMap},
    fmt,
};

use serde::{Deserialize, Serialize};

use super::{Date, FieldValue, Value};

/// Ordered, string-keyed map of typed values.
///
/// Keys iterate in their natural (byte-wise) order regardless of insertion
/// order. A Bundle never stores a null scalar: putting `None` removes the key,
/// so an absent collection field stays distinguishable from an empty one.
/// Bundles nest through [`Value::Bundle`]; cycles cannot be built.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Bundle {
    entries: BTreeMap<String, Value>,
}

impl Bundle {
    pub fn new() -> Self {
        Self::default()
    }

    /// Inserts or overwrites `key`; returns the previous value.
    pub fn put(
        &mut self,
        key: impl Into<String>,
        value: impl Into<Value>,
    ) -> Option<Value> {
        self.entries.insert(key.into(), value.into())
    }

    /// Like [`put`](Self::put), but `None` removes the key.
    pub fn put_opt(
        &mut self,
        key: impl Into<String>,
        value: Option<Value>,
    ) -> Option<Value> {
        let key = key.into();
        match value {
            Some(v) => self.entries.insert(key, v),
            None => self.entries.remove(&key),
        }
    }

    /// Builder-style [`put`](Self::put).
    pub fn with(
        mut self,
        key: impl Into<String>,
        value: impl Into<Value>,
    ) -> Self {
        self.put(key, value);
        self
    }

    pub fn get(
        &self,
        key: &str,
    ) -> Option<&Value> {
        self.entries.get(key)
    }

    pub fn get_mut(
        &mut self,
        key: &str,
    ) -> Option<&mut Value> {
        self.entries.get_mut(key)
    }

    pub fn contains_key(
        &self,
        key: &str,
    ) -> bool {
        self.entries.contains_key(key)
    }

    pub fn remove(
        &mut self,
        key: &str,
    ) -> Option<Value> {
        self.entries.remove(key)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }

    /// Keys in sorted order.
    pub fn keys(&self) -> impl Iterator<Item = &str> + '_ {
        self.entries.keys().map(String::as_str)
    }

    pub fn values(&self) -> impl Iterator<Item = &Value> + '_ {
        self.entries.values()
    }

    /// Entries in sorted key order.
    pub fn iter(&self) -> btree_map::Iter<'_, String, Value> {
        self.entries.iter()
    }

    /// Copies every entry of `other` into `self`; `other` wins on conflicts.
    pub fn put_all(
        &mut self,
        other: &Bundle,
    ) {
        for (k, v) in other.iter() {
            self.entries.insert(k.clone(), v.clone());
        }
    }

    /// Scalar of type `T` stored under `key`.
    pub fn get_as<T: FieldValue>(
        &self,
        key: &str,
    ) -> Option<T> {
        self.get(key).and_then(T::from_value)
    }

    pub fn put_array<T: FieldValue>(
        &mut self,
        key: impl Into<String>,
        items: impl IntoIterator<Item = Option<T>>,
    ) -> Option<Value> {
        self.put(key, Value::nullable_array(items))
    }

    pub fn get_array_of<T: FieldValue>(
        &self,
        key: &str,
    ) -> Option<Vec<Option<T>>> {
        self.get(key).and_then(Value::as_array_of)
    }

    pub fn put_list<T: FieldValue>(
        &mut self,
        key: impl Into<String>,
        items: impl IntoIterator<Item = Option<T>>,
    ) -> Option<Value> {
        self.put(key, Value::nullable_list(items))
    }

    pub fn get_list_of<T: FieldValue>(
        &self,
        key: &str,
    ) -> Option<Vec<Option<T>>> {
        self.get(key).and_then(Value::as_list_of)
    }

    pub fn put_bytes(
        &mut self,
        key: impl Into<String>,
        bytes: impl Into<Vec<u8>>,
    ) -> Option<Value> {
        self.put(key, Value::Bytes(bytes.into()))
    }

    pub fn get_bytes(
        &self,
        key: &str,
    ) -> Option<&[u8]> {
        self.get(key).and_then(Value::as_bytes)
    }

    pub fn get_string(
        &self,
        key: &str,
    ) -> Option<&str> {
        self.get(key).and_then(Value::as_str)
    }

    pub fn get_bundle(
        &self,
        key: &str,
    ) -> Option<&Bundle> {
        self.get(key).and_then(Value::as_bundle)
    }

    pub fn get_bundle_mut(
        &mut self,
        key: &str,
    ) -> Option<&mut Bundle> {
        match self.get_mut(key) {
            Some(Value::Bundle(b)) => Some(b),
            _ => None,
        }
    }
}

/// Named accessors per kind: scalar, array and list.
macro_rules! typed_accessors {
    ($($ty:ty, $name:literal => $put:ident, $get:ident, $put_array:ident, $get_array:ident, $put_list:ident, $get_list:ident;)*) => {
        impl Bundle {
            $(
                #[doc = concat!("Stores a ", $name, " scalar.")]
                pub fn $put(
                    &mut self,
                    key: impl Into<String>,
                    value: $ty,
                ) -> Option<Value> {
                    self.put(key, value)
                }

                #[doc = concat!("The ", $name, " scalar under `key`, if present and of that kind.")]
                pub fn $get(
                    &self,
                    key: &str,
                ) -> Option<$ty> {
                    self.get_as::<$ty>(key)
                }

                #[doc = concat!("Stores a ", $name, " array; `None` elements are nulls.")]
                pub fn $put_array(
                    &mut self,
                    key: impl Into<String>,
                    items: impl IntoIterator<Item = Option<$ty>>,
                ) -> Option<Value> {
                    self.put_array(key, items)
                }

                pub fn $get_array(
                    &self,
                    key: &str,
                ) -> Option<Vec<Option<$ty>>> {
                    self.get_array_of::<$ty>(key)
                }

                #[doc = concat!("Stores a ", $name, " list; `None` elements are nulls.")]
                pub fn $put_list(
                    &mut self,
                    key: impl Into<String>,
                    items: impl IntoIterator<Item = Option<$ty>>,
                ) -> Option<Value> {
                    self.put_list(key, items)
                }

                pub fn $get_list(
                    &self,
                    key: &str,
                ) -> Option<Vec<Option<$ty>>> {
                    self.get_list_of::<$ty>(key)
                }
            )*
        }
    };
}

typed_accessors! {
    bool, "boolean" => put_boolean, get_boolean, put_boolean_array, get_boolean_array, put_boolean_list, get_boolean_list;
    i16, "short" => put_short, get_short, put_short_array, get_short_array, put_short_list, get_short_list;
    u16, "char" => put_char, get_char, put_char_array, get_char_array, put_char_list, get_char_list;
    i32, "int" => put_int, get_int, put_int_array, get_int_array, put_int_list, get_int_list;
    i64, "long" => put_long, get_long, put_long_array, get_long_array, put_long_list, get_long_list;
    f32, "float" => put_float, get_float, put_float_array, get_float_array, put_float_list, get_float_list;
    f64, "double" => put_double, get_double, put_double_array, get_double_array, put_double_list, get_double_list;
    Date, "date" => put_date, get_date, put_date_array, get_date_array, put_date_list, get_date_list;
    String, "string" => put_string, get_string_owned, put_string_array, get_string_array, put_string_list, get_string_list;
    Bundle, "bundle" => put_bundle, get_bundle_owned, put_bundle_array, get_bundle_array, put_bundle_list, get_bundle_list;
}

// Byte arrays are `Value::Bytes`; bytes only get scalar and list accessors here.
impl Bundle {
    pub fn put_byte(
        &mut self,
        key: impl Into<String>,
        value: i8,
    ) -> Option<Value> {
        self.put(key, value)
    }

    pub fn get_byte(
        &self,
        key: &str,
    ) -> Option<i8> {
        self.get_as::<i8>(key)
    }

    pub fn put_byte_list(
        &mut self,
        key: impl Into<String>,
        items: impl IntoIterator<Item = Option<i8>>,
    ) -> Option<Value> {
        self.put_list(key, items)
    }

    pub fn get_byte_list(
        &self,
        key: &str,
    ) -> Option<Vec<Option<i8>>> {
        self.get_list_of::<i8>(key)
    }
}

impl<K: Into<String>, V: Into<Value>> FromIterator<(K, V)> for Bundle {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut bundle = Bundle::new();
        bundle.extend(iter);
        bundle
    }
}

impl<K: Into<String>, V: Into<Value>> Extend<(K, V)> for Bundle {
    fn extend<I: IntoIterator<Item = (K, V)>>(
        &mut self,
        iter: I,
    ) {
        for (k, v) in iter {
            self.put(k, v);
        }
    }
}

impl IntoIterator for Bundle {
    type Item = (String, Value);
    type IntoIter = btree_map::IntoIter<String, Value>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.into_iter()
    }
}

impl<'a> IntoIterator for &'a Bundle {
    type Item = (&'a String, &'a Value);
    type IntoIter = btree_map::Iter<'a, String, Value>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.iter()
    }
}

impl fmt::Display for Bundle {
    fn fmt(
        &self,
        f: &mut fmt::Formatter<'_>,
    ) -> fmt::Result {
        f.write_str("{")?;
        for (i, (k, v)) in self.entries.iter().enumerate() {
            if i > 0 {
                f.write_str(", ")?;
            }
            write!(f, "{k}={v}")?;
        }
        f.write_str("}")
    }
}
