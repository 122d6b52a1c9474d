use std::any::Any;

use crate::{ErrorExt, StatusCode};

/// Ошибка кодирования/декодирования `Bundle`.
///
/// Все варианты фатальны для текущего вызова: частичный результат не
/// возвращается. Поля `key` и `bit_offset` заполняются по мере того, как
/// ошибка поднимается через рекурсию кодека.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CodecError {
    /// Структурно некорректный поток.
    MalformedInput {
        reason: String,
        bit_offset: Option<u64>,
        key: Option<String>,
    },

    /// Поток закончился раньше, чем ожидал декодер.
    UnexpectedEof {
        context: String,
        bit_offset: Option<u64>,
        key: Option<String>,
    },

    /// Битовый шаблон, которому не соответствует ни один тип.
    InvalidTag {
        pattern: u8,
        bits: u8,
        bit_offset: Option<u64>,
        key: Option<String>,
    },

    /// Обратная ссылка на ключ за пределами словаря.
    BackReference {
        index: u64,
        dict_size: usize,
        bit_offset: Option<u64>,
    },

    /// Значение, которое не выражается в формате.
    UnsupportedValue { reason: String, key: Option<String> },

    /// Неверные параметры вызова (шаг varint, лимиты).
    InvalidConfiguration { reason: String },

    /// Длина из потока превышает настроенный лимит.
    LimitExceeded {
        what: String,
        size: u64,
        limit: u64,
        key: Option<String>,
    },

    /// Ошибка источника или приёмника, отличная от EOF.
    Io { reason: String },
}

impl CodecError {
    pub fn malformed(reason: impl Into<String>) -> Self {
        Self::MalformedInput {
            reason: reason.into(),
            bit_offset: None,
            key: None,
        }
    }

    pub fn eof(context: impl Into<String>) -> Self {
        Self::UnexpectedEof {
            context: context.into(),
            bit_offset: None,
            key: None,
        }
    }

    pub fn unsupported(reason: impl Into<String>) -> Self {
        Self::UnsupportedValue {
            reason: reason.into(),
            key: None,
        }
    }

    pub fn invalid_config(reason: impl Into<String>) -> Self {
        Self::InvalidConfiguration {
            reason: reason.into(),
        }
    }

    pub fn limit(
        what: impl Into<String>,
        size: u64,
        limit: u64,
    ) -> Self {
        Self::LimitExceeded {
            what: what.into(),
            size,
            limit,
            key: None,
        }
    }

    /// Добавляет позицию в битовом потоке.
    pub fn with_offset(
        mut self,
        offset: u64,
    ) -> Self {
        match &mut self {
            Self::MalformedInput { bit_offset: o, .. }
            | Self::UnexpectedEof { bit_offset: o, .. }
            | Self::InvalidTag { bit_offset: o, .. }
            | Self::BackReference { bit_offset: o, .. } => {
                // Самая глубокая позиция точнее, не перезаписываем.
                if o.is_none() {
                    *o = Some(offset);
                }
            }
            _ => {}
        }
        self
    }

    /// Добавляет ключ, на котором произошла ошибка.
    pub fn with_key(
        mut self,
        key: impl Into<String>,
    ) -> Self {
        match &mut self {
            Self::MalformedInput { key: k, .. }
            | Self::UnexpectedEof { key: k, .. }
            | Self::InvalidTag { key: k, .. }
            | Self::UnsupportedValue { key: k, .. }
            | Self::LimitExceeded { key: k, .. } => {
                if k.is_none() {
                    *k = Some(key.into());
                }
            }
            _ => {}
        }
        self
    }

    /// Ключ, к которому относится ошибка (если известен).
    pub fn key(&self) -> Option<&str> {
        match self {
            Self::MalformedInput { key, .. }
            | Self::UnexpectedEof { key, .. }
            | Self::InvalidTag { key, .. }
            | Self::UnsupportedValue { key, .. }
            | Self::LimitExceeded { key, .. } => key.as_deref(),
            _ => None,
        }
    }

    /// Ошибка вызвана содержимым входного потока.
    pub fn is_malformed(&self) -> bool {
        matches!(
            self,
            Self::MalformedInput { .. }
                | Self::UnexpectedEof { .. }
                | Self::InvalidTag { .. }
                | Self::BackReference { .. }
        )
    }
}

impl std::fmt::Display for CodecError {
    fn fmt(
        &self,
        f: &mut std::fmt::Formatter<'_>,
    ) -> std::fmt::Result {
        match self {
            Self::MalformedInput {
                reason,
                bit_offset,
                key,
            } => {
                write!(f, "Malformed input: {reason}")?;
                write_context(f, *bit_offset, key.as_deref())
            }
            Self::UnexpectedEof {
                context,
                bit_offset,
                key,
            } => {
                write!(f, "Unexpected EOF: {context}")?;
                write_context(f, *bit_offset, key.as_deref())
            }
            Self::InvalidTag {
                pattern,
                bits,
                bit_offset,
                key,
            } => {
                write!(
                    f,
                    "Invalid type tag 0b{pattern:0width$b}",
                    width = *bits as usize
                )?;
                write_context(f, *bit_offset, key.as_deref())
            }
            Self::BackReference {
                index,
                dict_size,
                bit_offset,
            } => {
                write!(
                    f,
                    "Key back-reference {index} out of range (dictionary size {dict_size})"
                )?;
                write_context(f, *bit_offset, None)
            }
            Self::UnsupportedValue { reason, key } => {
                write!(f, "Unsupported value: {reason}")?;
                write_context(f, None, key.as_deref())
            }
            Self::InvalidConfiguration { reason } => {
                write!(f, "Invalid configuration: {reason}")
            }
            Self::LimitExceeded {
                what,
                size,
                limit,
                key,
            } => {
                write!(f, "{what} {size} exceeds limit {limit}")?;
                write_context(f, None, key.as_deref())
            }
            Self::Io { reason } => write!(f, "I/O error: {reason}"),
        }
    }
}

fn write_context(
    f: &mut std::fmt::Formatter<'_>,
    offset: Option<u64>,
    key: Option<&str>,
) -> std::fmt::Result {
    let mut parts = Vec::new();
    if let Some(o) = offset {
        parts.push(format!("bit: {o}"));
    }
    if let Some(k) = key {
        parts.push(format!("key: {k}"));
    }
    if !parts.is_empty() {
        write!(f, " [{}]", parts.join(", "))?;
    }
    Ok(())
}

impl std::error::Error for CodecError {}

impl ErrorExt for CodecError {
    fn status_code(&self) -> StatusCode {
        match self {
            Self::MalformedInput { .. } => StatusCode::DecodingError,
            Self::UnexpectedEof { .. } => StatusCode::UnexpectedEof,
            Self::InvalidTag { .. } => StatusCode::InvalidData,
            Self::BackReference { .. } => StatusCode::CorruptedData,
            Self::UnsupportedValue { .. } => StatusCode::EncodingError,
            Self::InvalidConfiguration { .. } => StatusCode::InvalidArgs,
            Self::LimitExceeded { .. } => StatusCode::SizeLimit,
            Self::Io { .. } => StatusCode::Io,
        }
    }

    fn as_any(&self) -> &dyn Any {
        self
    }

    fn client_message(&self) -> String {
        match self {
            Self::MalformedInput { .. }
            | Self::InvalidTag { .. }
            | Self::BackReference { .. } => "Malformed bundle data".to_string(),
            Self::UnexpectedEof { .. } => "Truncated bundle data".to_string(),
            Self::UnsupportedValue { reason, .. } => format!("Cannot encode value: {reason}"),
            Self::InvalidConfiguration { reason } => format!("Invalid configuration: {reason}"),
            Self::LimitExceeded { what, .. } => format!("{what} exceeds limit"),
            Self::Io { .. } => "I/O failure".to_string(),
        }
    }

    fn metrics_tags(&self) -> Vec<(&'static str, String)> {
        let mut tags = vec![
            ("error_type", self.type_name()),
            ("status_code", self.status_code().to_string()),
            ("malformed", self.is_malformed().to_string()),
        ];

        match self {
            Self::InvalidTag { pattern, bits, .. } => {
                tags.push(("invalid_tag", format!("{pattern:#04x}/{bits}")));
            }
            Self::LimitExceeded { what, .. } => {
                tags.push(("limit_type", what.clone()));
            }
            _ => {}
        }

        tags
    }
}

impl From<std::io::Error> for CodecError {
    fn from(e: std::io::Error) -> Self {
        match e.kind() {
            std::io::ErrorKind::UnexpectedEof => CodecError::eof(e.to_string()),
            _ => CodecError::Io {
                reason: e.to_string(),
            },
        }
    }
}
