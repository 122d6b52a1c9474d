//! Codec resource limits.

use bitbundle_error::{ensure, CodecError, CodecResult};
use config::{Config, ConfigError, Environment};
use serde::{Deserialize, Serialize};

/// Limits shared by the encoder and the decoder.
///
/// The decoder checks every length read from the stream against these before
/// any allocation, so a hostile prefix cannot force a huge buffer. The encoder
/// checks the same limits on the Bundle it is given, so bytes produced under
/// one config always decode under that config.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CodecConfig {
    /// Maximum nesting of Bundles, the outermost Bundle counting as 1.
    pub max_depth: usize,
    /// Maximum number of elements in one array, list or byte array.
    pub max_collection_len: usize,
    /// Maximum UTF-8 byte length of a string value or key name.
    pub max_string_len: usize,
    /// Maximum number of keys in one Bundle.
    pub max_keys: usize,
}

impl Default for CodecConfig {
    fn default() -> Self {
        Self {
            max_depth: 256,
            max_collection_len: 16 * 1024 * 1024,
            max_string_len: 64 * 1024 * 1024,
            max_keys: 1024 * 1024,
        }
    }
}

impl CodecConfig {
    /// Defaults overlaid with `BITBUNDLE_*` environment variables.
    pub fn load() -> Result<Self, ConfigError> {
        Self::load_with_prefix("BITBUNDLE")
    }

    pub fn load_with_prefix(prefix: &str) -> Result<Self, ConfigError> {
        let defaults = Self::default();
        let cfg = Config::builder()
            // Значения по умолчанию
            .set_default("max_depth", defaults.max_depth as u64)?
            .set_default("max_collection_len", defaults.max_collection_len as u64)?
            .set_default("max_string_len", defaults.max_string_len as u64)?
            .set_default("max_keys", defaults.max_keys as u64)?
            // Переменные окружения с префиксом, например BITBUNDLE_MAX_DEPTH
            .add_source(Environment::with_prefix(prefix).try_parsing(true))
            .build()?;

        cfg.try_deserialize()
    }

    /// Rejects zero limits.
    pub fn validate(&self) -> CodecResult<()> {
        let limits = [
            ("max_depth", self.max_depth),
            ("max_collection_len", self.max_collection_len),
            ("max_string_len", self.max_string_len),
            ("max_keys", self.max_keys),
        ];
        for (name, value) in limits {
            ensure!(
                value > 0,
                CodecError::invalid_config(format!("{name} must be positive"))
            );
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use serial_test::serial;

    use super::*;

    #[test]
    fn test_defaults_are_valid() {
        let cfg = CodecConfig::default();
        assert!(cfg.validate().is_ok());
        assert_eq!(cfg.max_depth, 256);
    }

    #[test]
    fn test_zero_limit_rejected() {
        let cfg = CodecConfig {
            max_keys: 0,
            ..Default::default()
        };
        let err = cfg.validate().unwrap_err();
        assert!(matches!(
            err.downcast_ref::<CodecError>(),
            Some(CodecError::InvalidConfiguration { .. })
        ));
        assert!(err.to_string().contains("max_keys"));
    }

    #[test]
    #[serial]
    fn test_load_from_env() {
        std::env::set_var("BBTEST_MAX_DEPTH", "16");
        let cfg = CodecConfig::load_with_prefix("BBTEST").unwrap();
        std::env::remove_var("BBTEST_MAX_DEPTH");

        assert_eq!(cfg.max_depth, 16);
        assert_eq!(cfg.max_keys, CodecConfig::default().max_keys);
    }

    #[test]
    #[serial]
    fn test_load_without_env_gives_defaults() {
        let cfg = CodecConfig::load_with_prefix("BBTEST_UNSET").unwrap();
        assert_eq!(cfg, CodecConfig::default());
    }

    #[test]
    fn test_serde_partial_document() {
        let cfg: CodecConfig = serde_json::from_str(r#"{"max_depth": 8}"#).unwrap();
        assert_eq!(cfg.max_depth, 8);
        assert_eq!(cfg.max_string_len, CodecConfig::default().max_string_len);
    }
}
