use std::io::Read;

use bitbundle_error::{bail, CodecError, CodecResult};
use tracing::trace;

use super::{at_key, dictionary::KeyDictionary, wire};
use crate::{
    bitstream::{BitReader, VarInt},
    bundle::{Bundle, Date, Value},
    config::CodecConfig,
    field_type::FieldType,
};

/// Upper bound for capacity reserved from a length read off the wire.
const PREALLOC_LIMIT: usize = 4096;

/// A key as announced in the key-name loop.
enum KeySlot {
    Known(usize),
    New(usize),
}

/// One unmarshal pass: the bit source plus the dictionary rebuilt from it.
pub(crate) struct Decoder<'a, R: Read> {
    input: BitReader<R>,
    dict: KeyDictionary,
    config: &'a CodecConfig,
}

impl<'a, R: Read> Decoder<'a, R> {
    pub(crate) fn new(
        source: R,
        config: &'a CodecConfig,
    ) -> Self {
        Self {
            input: BitReader::new(source),
            dict: KeyDictionary::new(),
            config,
        }
    }

    pub(crate) fn bit_position(&self) -> u64 {
        self.input.bit_position()
    }

    pub(crate) fn dictionary_len(&self) -> usize {
        self.dict.len()
    }

    /// Reads one Bundle. The outermost Bundle has `depth == 1`.
    pub(crate) fn read_bundle(
        &mut self,
        depth: usize,
    ) -> CodecResult<Bundle> {
        if depth > self.config.max_depth {
            return Err(CodecError::limit(
                "bundle nesting depth",
                depth as u64,
                self.config.max_depth as u64,
            )
            .into());
        }

        let count = self.read_len(wire::KEY_COUNT, self.config.max_keys, "key count")?;
        let mut slots = Vec::with_capacity(count.min(PREALLOC_LIMIT));
        let mut pending = 0usize;
        for _ in 0..count {
            if self.input.read_bit()? {
                let len =
                    self.read_len(wire::KEY_LENGTH, self.config.max_string_len, "key length")?;
                slots.push(KeySlot::New(len));
                pending += 1;
            } else {
                // Encoder registers new keys as it goes, so pending ones count.
                let bound = self.dict.len() + pending;
                let at = self.input.bit_position();
                let index = self.input.read_bounded(bound as u64)?;
                if index >= bound as u64 {
                    bail!(CodecError::BackReference {
                        index,
                        dict_size: bound,
                        bit_offset: Some(at),
                    });
                }
                slots.push(KeySlot::Known(index as usize));
            }
        }

        self.input.align();
        let mut keys = Vec::with_capacity(slots.len());
        let first_new = self.dict.len();
        for slot in &slots {
            if let KeySlot::New(len) = *slot {
                let at = self.input.bit_position();
                let bytes = self.input.read_bytes(len)?;
                let key = String::from_utf8(bytes).map_err(|e| {
                    CodecError::malformed(format!("key is not valid UTF-8: {e}")).with_offset(at)
                })?;
                if self.dict.lookup(&key).is_some() {
                    return Err(CodecError::malformed(format!(
                        "key '{key}' transmitted twice"
                    ))
                    .with_offset(at)
                    .into());
                }
                let index = self.dict.register(&key);
                trace!(key = %key, index, "new key");
            }
        }
        let mut next_new = first_new;
        for slot in slots {
            let index = match slot {
                KeySlot::Known(index) => index,
                KeySlot::New(_) => {
                    next_new += 1;
                    next_new - 1
                }
            };
            match self.dict.get(index) {
                Some(key) => keys.push(key.to_string()),
                None => {
                    return Err(CodecError::BackReference {
                        index: index as u64,
                        dict_size: self.dict.len(),
                        bit_offset: None,
                    }
                    .into());
                }
            }
        }

        let mut bundle = Bundle::new();
        for key in keys {
            if bundle.contains_key(&key) {
                return Err(CodecError::malformed("duplicate key in bundle")
                    .with_offset(self.input.bit_position())
                    .with_key(key)
                    .into());
            }
            let value = self
                .read_entry(depth)
                .map_err(|e| at_key(e, &key, "decoding"))?;
            bundle.put(key, value);
        }
        Ok(bundle)
    }

    fn read_entry(
        &mut self,
        depth: usize,
    ) -> CodecResult<Value> {
        let tag_at = self.input.bit_position();
        let kind = FieldType::read_tag(&mut self.input)?;
        if !self.input.read_bit()? {
            return self.read_value(kind, tag_at, depth);
        }

        let is_array = self.input.read_bit()?;
        if is_array && kind == FieldType::Byte {
            let len = self.read_len(
                wire::BYTES_LENGTH,
                self.config.max_collection_len,
                "byte array length",
            )?;
            return Ok(Value::Bytes(self.input.read_bytes(len)?));
        }

        let items = self.read_elements(kind, tag_at, depth)?;
        Ok(if is_array {
            Value::Array(items)
        } else {
            Value::List(items)
        })
    }

    fn read_elements(
        &mut self,
        kind: FieldType,
        tag_at: u64,
        depth: usize,
    ) -> CodecResult<Vec<Option<Value>>> {
        let count = self.input.read_variable_int(wire::ELEMENT_COUNT)?;
        let has_nulls = count < 0;
        let len = count.unsigned_abs() as usize;
        if len > self.config.max_collection_len {
            return Err(CodecError::limit(
                "element count",
                len as u64,
                self.config.max_collection_len as u64,
            )
            .into());
        }

        let mut items = Vec::with_capacity(len.min(PREALLOC_LIMIT));
        for _ in 0..len {
            if has_nulls && self.input.read_bit()? {
                items.push(None);
            } else {
                items.push(Some(self.read_value(kind, tag_at, depth)?));
            }
        }
        Ok(items)
    }

    fn read_value(
        &mut self,
        kind: FieldType,
        tag_at: u64,
        depth: usize,
    ) -> CodecResult<Value> {
        let at = self.input.bit_position();
        let value = match kind {
            FieldType::Boolean => Value::Boolean(self.input.read_bit()?),
            FieldType::Byte => Value::Byte(self.input.read_bits(8)? as u8 as i8),
            FieldType::Short => {
                let v = self.input.read_variable_int(wire::SHORT)?;
                Value::Short(i16::try_from(v).map_err(|_| {
                    CodecError::malformed(format!("short value {v} out of range")).with_offset(at)
                })?)
            }
            FieldType::Char => {
                let v = self.input.read_variable_int(wire::CHAR)?;
                Value::Char(u16::try_from(v).map_err(|_| {
                    CodecError::malformed(format!("char value {v} out of range")).with_offset(at)
                })?)
            }
            FieldType::Int => Value::Int(self.input.read_variable_int(wire::INT)?),
            FieldType::Long => Value::Long(self.input.read_variable_long(wire::LONG)?),
            FieldType::Float => Value::Float(f32::from_bits(
                self.input.read_variable_int(wire::FLOAT_BITS)? as u32,
            )),
            FieldType::Double => Value::Double(f64::from_bits(
                self.input.read_variable_long(wire::DOUBLE_BITS)? as u64,
            )),
            FieldType::String => {
                let len = self.read_len(
                    wire::STRING_LENGTH,
                    self.config.max_string_len,
                    "string length",
                )?;
                let bytes = self.input.read_bytes(len)?;
                Value::String(String::from_utf8(bytes).map_err(|e| {
                    CodecError::malformed(format!("string is not valid UTF-8: {e}"))
                        .with_offset(at)
                })?)
            }
            FieldType::Date => Value::Date(Date::from_millis(
                self.input.read_variable_long(wire::DATE)?,
            )),
            FieldType::Bundle => Value::Bundle(self.read_bundle(depth + 1)?),
            FieldType::Unknown => {
                // Допустим только как тег пустой или полностью null коллекции.
                let (pattern, bits) = FieldType::Unknown.prefix_code();
                return Err(CodecError::InvalidTag {
                    pattern,
                    bits,
                    bit_offset: Some(tag_at),
                    key: None,
                }
                .into());
            }
        };
        Ok(value)
    }

    /// Unsigned length field, checked against `limit` before use.
    fn read_len(
        &mut self,
        coding: VarInt,
        limit: usize,
        what: &str,
    ) -> CodecResult<usize> {
        let raw = self.input.read_variable_int(coding)? as u32 as u64;
        if raw > limit as u64 {
            return Err(CodecError::limit(what, raw, limit as u64).into());
        }
        Ok(raw as usize)
    }
}
