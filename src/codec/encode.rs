use std::io::Write;

use bitbundle_error::{ensure, CodecError, CodecResult};
use tracing::trace;

use super::{at_key, dictionary::KeyDictionary, wire};
use crate::{
    bitstream::BitWriter,
    bundle::{Bundle, Value},
    config::CodecConfig,
    field_type::FieldType,
};

/// One marshal pass: a bit sink plus the key dictionary it fills.
pub(crate) struct Encoder<'a, W: Write> {
    out: BitWriter<W>,
    dict: KeyDictionary,
    config: &'a CodecConfig,
}

impl<'a, W: Write> Encoder<'a, W> {
    pub(crate) fn new(
        sink: W,
        config: &'a CodecConfig,
    ) -> Self {
        Self {
            out: BitWriter::new(sink),
            dict: KeyDictionary::new(),
            config,
        }
    }

    pub(crate) fn bit_position(&self) -> u64 {
        self.out.bit_position()
    }

    pub(crate) fn dictionary_len(&self) -> usize {
        self.dict.len()
    }

    pub(crate) fn finish(self) -> CodecResult<W> {
        self.out.finish()
    }

    /// Writes one Bundle. The outermost Bundle has `depth == 1`.
    pub(crate) fn write_bundle(
        &mut self,
        bundle: &Bundle,
        depth: usize,
    ) -> CodecResult<()> {
        ensure!(
            depth <= self.config.max_depth,
            CodecError::limit(
                "bundle nesting depth",
                depth as u64,
                self.config.max_depth as u64
            )
        );

        let count = self.checked_len(bundle.len(), self.config.max_keys, "key count")?;
        self.out.write_variable_int(count, wire::KEY_COUNT)?;

        // Новые ключи регистрируются сразу, их байты идут после выравнивания.
        let mut fresh: Vec<&str> = Vec::new();
        for key in bundle.keys() {
            match self.dict.lookup(key) {
                Some(index) => {
                    self.out.write_bit(false)?;
                    self.out
                        .write_bounded(index as u64, self.dict.len() as u64)?;
                    trace!(key, index, "key back-reference");
                }
                None => {
                    let len =
                        self.checked_len(key.len(), self.config.max_string_len, "key length")?;
                    self.out.write_bit(true)?;
                    self.out.write_variable_int(len, wire::KEY_LENGTH)?;
                    let index = self.dict.register(key);
                    trace!(key, index, "new key");
                    fresh.push(key);
                }
            }
        }
        self.out.align()?;
        for key in fresh {
            self.out.write_bytes(key.as_bytes())?;
        }

        for (key, value) in bundle.iter() {
            self.write_entry(value, depth)
                .map_err(|e| at_key(e, key, "encoding"))?;
        }
        Ok(())
    }

    /// Type tag, shape selector and body of one value slot.
    fn write_entry(
        &mut self,
        value: &Value,
        depth: usize,
    ) -> CodecResult<()> {
        let (kind, _) = FieldType::classify(value)?;
        kind.write_tag(&mut self.out)?;

        match value {
            Value::Bytes(bytes) => {
                self.write_selector(true)?;
                let len = self.checked_len(
                    bytes.len(),
                    self.config.max_collection_len,
                    "byte array length",
                )?;
                self.out.write_variable_int(len, wire::BYTES_LENGTH)?;
                self.out.write_bytes(bytes)
            }
            Value::List(items) => {
                self.write_selector(false)?;
                self.write_elements(items, depth)
            }
            Value::Array(items) => {
                self.write_selector(true)?;
                self.write_elements(items, depth)
            }
            scalar => {
                self.out.write_bit(false)?;
                self.write_value(scalar, depth)
            }
        }
    }

    /// Collection marker followed by `0` for a list, `1` for an array.
    fn write_selector(
        &mut self,
        array: bool,
    ) -> CodecResult<()> {
        self.out.write_bit(true)?;
        self.out.write_bit(array)
    }

    fn write_elements(
        &mut self,
        items: &[Option<Value>],
        depth: usize,
    ) -> CodecResult<()> {
        let len = self.checked_len(items.len(), self.config.max_collection_len, "element count")?;
        let has_nulls = items.iter().any(Option::is_none);
        let count = if has_nulls { -len } else { len };
        self.out.write_variable_int(count, wire::ELEMENT_COUNT)?;

        for item in items {
            if has_nulls {
                self.out.write_bit(item.is_none())?;
            }
            if let Some(value) = item {
                self.write_value(value, depth)?;
            }
        }
        Ok(())
    }

    fn write_value(
        &mut self,
        value: &Value,
        depth: usize,
    ) -> CodecResult<()> {
        match value {
            Value::Boolean(v) => self.out.write_bit(*v),
            Value::Byte(v) => self.out.write_bits(*v as u8 as u64, 8),
            Value::Short(v) => self.out.write_variable_int(*v as i32, wire::SHORT),
            Value::Char(v) => self.out.write_variable_int(*v as i32, wire::CHAR),
            Value::Int(v) => self.out.write_variable_int(*v, wire::INT),
            Value::Long(v) => self.out.write_variable_long(*v, wire::LONG),
            Value::Float(v) => self
                .out
                .write_variable_int(v.to_bits() as i32, wire::FLOAT_BITS),
            Value::Double(v) => self
                .out
                .write_variable_long(v.to_bits() as i64, wire::DOUBLE_BITS),
            Value::String(s) => {
                let len = self.checked_len(s.len(), self.config.max_string_len, "string length")?;
                self.out.write_variable_int(len, wire::STRING_LENGTH)?;
                self.out.write_bytes(s.as_bytes())
            }
            Value::Date(d) => self.out.write_variable_long(d.millis(), wire::DATE),
            Value::Bundle(b) => self.write_bundle(b, depth + 1),
            Value::Bytes(_) | Value::Array(_) | Value::List(_) => Err(CodecError::unsupported(
                "collection where a scalar element was expected",
            )
            .into()),
        }
    }

    /// Applies the same limit the decoder enforces on this length field.
    fn checked_len(
        &self,
        n: usize,
        limit: usize,
        what: &str,
    ) -> CodecResult<i32> {
        ensure!(n <= limit, CodecError::limit(what, n as u64, limit as u64));
        to_count(n, what)
    }
}

/// Lengths travel as 32-bit ints.
fn to_count(
    n: usize,
    what: &str,
) -> CodecResult<i32> {
    i32::try_from(n).map_err(|_| {
        CodecError::unsupported(format!("{what} {n} does not fit a 32-bit count")).into()
    })
}
