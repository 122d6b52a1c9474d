use std::fmt;

use num_enum::TryFromPrimitive;
#[cfg(feature = "serde")]
use serde_repr::{Deserialize_repr, Serialize_repr};

/// Коды статуса для категоризации ошибок кодека.
///
/// # Диапазоны:
/// - 1xxx: Общие ошибки
/// - 2xxx: Ошибки данных
/// - 5xxx: Повреждённый поток
/// - 6xxx: IO
/// - 8xxx: Формат (кодирование и разбор бинарного потока)
///
/// `num_enum::TryFromPrimitive` даёт `TryFrom<u32>`, что удобно, когда код
/// передаётся по сети вызывающей стороной.
#[cfg_attr(feature = "serde", derive(Serialize_repr, Deserialize_repr))]
#[derive(Debug, Clone, Copy, PartialEq, Eq, TryFromPrimitive)]
#[repr(u32)]
#[non_exhaustive]
pub enum StatusCode {
    // === 1xxx: Общие ошибки ===
    Unknown = 1000,
    Internal = 1003,
    InvalidArgs = 1004,

    // === 2xxx: Ошибки данных ===
    InvalidData = 2009,

    // === 5xxx: Повреждённый поток ===
    CorruptedData = 5002,

    // === 6xxx: IO ===
    Io = 6000,
    UnexpectedEof = 6007,

    // === 8xxx: Формат ===
    SizeLimit = 8007,
    EncodingError = 8010,
    DecodingError = 8011,
}

////////////////////////////////////////////////////////////////////////////////
// Собственные методы
////////////////////////////////////////////////////////////////////////////////

impl StatusCode {
    /// Числовое представление кода статуса.
    pub const fn code(self) -> u32 {
        self as u32
    }

    /// Входной поток не является корректной закодированной записью
    /// (повреждённые или оборванные данные).
    pub fn is_format_error(&self) -> bool {
        matches!(
            self,
            Self::DecodingError | Self::UnexpectedEof | Self::CorruptedData | Self::InvalidData
        )
    }
}

////////////////////////////////////////////////////////////////////////////////
// Общие реализации трейтов для StatusCode
////////////////////////////////////////////////////////////////////////////////

impl From<StatusCode> for u32 {
    fn from(c: StatusCode) -> Self {
        c.code()
    }
}

impl fmt::Display for StatusCode {
    fn fmt(
        &self,
        f: &mut fmt::Formatter<'_>,
    ) -> fmt::Result {
        write!(f, "{:?} ({})", self, self.code())
    }
}

////////////////////////////////////////////////////////////////////////////////
// Тесты
////////////////////////////////////////////////////////////////////////////////

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_errors() {
        assert!(StatusCode::DecodingError.is_format_error());
        assert!(StatusCode::UnexpectedEof.is_format_error());
        assert!(StatusCode::CorruptedData.is_format_error());
        assert!(!StatusCode::InvalidArgs.is_format_error());
        assert!(!StatusCode::EncodingError.is_format_error());
        assert!(!StatusCode::SizeLimit.is_format_error());
    }

    /// Тест проверяет конвертацию через `TryFrom<u32>`.
    #[test]
    fn test_try_from_u32() {
        let n = StatusCode::DecodingError.code();
        assert_eq!(StatusCode::try_from(n).unwrap(), StatusCode::DecodingError);
        assert!(StatusCode::try_from(99999).is_err());
    }

    #[test]
    fn test_code_and_into() {
        let c = StatusCode::UnexpectedEof;
        assert_eq!(c.code(), 6007);
        let n: u32 = c.into();
        assert_eq!(n, 6007);
    }

    /// Тест проверяет формат `Display`: строка должна содержать имя варианта и
    /// числовой код.
    #[test]
    fn test_display_contains_name_and_code() {
        let s = format!("{}", StatusCode::SizeLimit);
        assert!(s.contains("8007"), "got: {s}");
        assert!(s.contains("SizeLimit"), "got: {s}");
    }

    #[cfg(feature = "serde")]
    #[test]
    fn test_serialized_as_number() {
        let json = serde_json::to_string(&StatusCode::SizeLimit).unwrap();
        assert_eq!(json, "8007");
        let back: StatusCode = serde_json::from_str("8011").unwrap();
        assert_eq!(back, StatusCode::DecodingError);
    }
}
