//! Binary marshal / unmarshal of [`Bundle`]s.
//!
//! Layout of one Bundle on the wire:
//!
//! ```text
//! KeyCount  KeyEntry*  align  KeyNameBytes*  ValueEntry*
//!
//! KeyEntry   := 0 Index[ceil(log2(dict size))] | 1 Length
//! ValueEntry := TypeTag (0 Scalar | 1 0 List | 1 1 Array)
//! ```
//!
//! Every call owns a fresh key dictionary, so encoding the same Bundle twice
//! gives identical bytes and nothing leaks between calls.

pub mod dictionary;
mod decode;
mod encode;
pub mod wire;

use std::io::{Read, Write};

use bitbundle_error::{CodecError, CodecResult, ResultExt, StackError};
use tracing::{debug, warn};

use self::{decode::Decoder, encode::Encoder};
use crate::{bundle::Bundle, config::CodecConfig};

/// Encodes `bundle` with the default limits.
pub fn marshal(bundle: &Bundle) -> CodecResult<Vec<u8>> {
    Marshaller::default().marshal(bundle)
}

/// Decodes a Bundle with the default limits.
pub fn unmarshal(bytes: &[u8]) -> CodecResult<Bundle> {
    Unmarshaller::default().unmarshal(bytes)
}

/// Encoder entry point carrying a [`CodecConfig`].
#[derive(Debug, Clone, Default)]
pub struct Marshaller {
    config: CodecConfig,
}

impl Marshaller {
    pub fn new(config: CodecConfig) -> CodecResult<Self> {
        config.validate()?;
        Ok(Self { config })
    }

    pub fn config(&self) -> &CodecConfig {
        &self.config
    }

    /// Encodes `bundle` into a fresh buffer. On failure nothing is returned.
    pub fn marshal(
        &self,
        bundle: &Bundle,
    ) -> CodecResult<Vec<u8>> {
        debug!(keys = bundle.len(), "marshal started");
        let mut enc = Encoder::new(Vec::new(), &self.config);
        enc.write_bundle(bundle, 1)?;
        let bits = enc.bit_position();
        let dictionary = enc.dictionary_len();
        let bytes = enc.finish()?;
        debug!(
            keys = bundle.len(),
            bytes = bytes.len(),
            bits,
            dictionary,
            "marshal finished"
        );
        Ok(bytes)
    }

    /// Encodes `bundle` and writes it to `sink`. Nothing reaches `sink`
    /// unless encoding succeeds. Returns the number of bytes written.
    pub fn marshal_to<W: Write>(
        &self,
        bundle: &Bundle,
        mut sink: W,
    ) -> CodecResult<usize> {
        let bytes = self.marshal(bundle)?;
        sink.write_all(&bytes)
            .and_then(|()| sink.flush())
            .context("writing encoded bundle")?;
        Ok(bytes.len())
    }
}

/// Decoder entry point carrying a [`CodecConfig`].
#[derive(Debug, Clone, Default)]
pub struct Unmarshaller {
    config: CodecConfig,
}

impl Unmarshaller {
    pub fn new(config: CodecConfig) -> CodecResult<Self> {
        config.validate()?;
        Ok(Self { config })
    }

    pub fn config(&self) -> &CodecConfig {
        &self.config
    }

    pub fn unmarshal(
        &self,
        bytes: &[u8],
    ) -> CodecResult<Bundle> {
        self.unmarshal_from(bytes)
    }

    /// Decodes one Bundle from `source`, reading no further than its last
    /// byte. `source` is read a byte at a time; wrap files and sockets in a
    /// `BufReader`.
    pub fn unmarshal_from<R: Read>(
        &self,
        source: R,
    ) -> CodecResult<Bundle> {
        let mut dec = Decoder::new(source, &self.config);
        match dec.read_bundle(1) {
            Ok(bundle) => {
                debug!(
                    keys = bundle.len(),
                    bits = dec.bit_position(),
                    dictionary = dec.dictionary_len(),
                    "unmarshal finished"
                );
                Ok(bundle)
            }
            Err(e) => {
                warn!(
                    status = %e.status_code(),
                    bits = dec.bit_position(),
                    error = %e,
                    "unmarshal failed"
                );
                Err(e)
            }
        }
    }
}

/// Attaches `key` to a codec error and records the step in the context chain.
pub(crate) fn at_key(
    err: StackError,
    key: &str,
    action: &str,
) -> StackError {
    err.map_root(|e: CodecError| e.with_key(key))
        .context(format!("{action} value of key '{key}'"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bundle::Value;

    #[test]
    fn test_marshal_to_writes_nothing_on_failure() {
        let bad = Bundle::new().with(
            "mixed",
            Value::List(vec![Some(Value::Int(1)), Some(Value::Long(2))]),
        );
        let mut sink = Vec::new();
        assert!(Marshaller::default().marshal_to(&bad, &mut sink).is_err());
        assert!(sink.is_empty());
    }

    #[test]
    fn test_marshal_to_and_unmarshal_from() {
        let b = Bundle::new().with("x", 1.25f32).with("y", true);
        let mut sink = Vec::new();
        let n = Marshaller::default().marshal_to(&b, &mut sink).unwrap();
        assert_eq!(n, sink.len());

        // trailing bytes after the Bundle stay unread
        sink.extend_from_slice(b"tail");
        let mut cursor = std::io::Cursor::new(sink);
        let decoded = Unmarshaller::default().unmarshal_from(&mut cursor).unwrap();
        assert_eq!(decoded, b);
        assert_eq!(cursor.position() as usize, n);
    }

    #[test]
    fn test_invalid_config_rejected() {
        let config = CodecConfig {
            max_depth: 0,
            ..Default::default()
        };
        assert!(Marshaller::new(config).is_err());
        assert!(Unmarshaller::new(config).is_err());
    }

    #[test]
    fn test_error_path_through_nested_bundles() {
        let inner = Bundle::new().with("bad", Value::Array(vec![Some(Value::Byte(1))]));
        let outer = Bundle::new().with("outer", inner);
        let err = marshal(&outer).unwrap_err();

        assert_eq!(
            err.downcast_ref::<CodecError>().and_then(CodecError::key),
            Some("bad")
        );
        let shown = err.to_string();
        assert!(
            shown.starts_with("encoding value of key 'outer' → encoding value of key 'bad'"),
            "got: {shown}"
        );
    }
}
