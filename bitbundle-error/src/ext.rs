use std::{any::Any, error::Error};

use crate::StatusCode;

/// Расширение для ошибок кодека (object-safe).
///
/// Предоставляет вспомогательные методы для работы с ошибками:
/// - извлечение статус-кода,
/// - безопасное сообщение для вызывающей стороны,
/// - детализированное сообщение для логов,
/// - формирование тегов для систем наблюдаемости.
pub trait ErrorExt: Error + Send + Sync + 'static {
    /// Категория ошибки.
    ///
    /// По умолчанию возвращает [`StatusCode::Internal`].
    fn status_code(&self) -> StatusCode {
        StatusCode::Internal
    }

    /// Возвращает ошибку как [`Any`](std::any::Any),
    /// чтобы можно было выполнить downcast к конкретному типу.
    fn as_any(&self) -> &dyn Any;

    /// Короткое сообщение без внутренних деталей (смещения, содержимое
    /// ключей). Для внутренних ошибок возвращает `"Internal codec error"`.
    fn client_message(&self) -> String {
        match self.status_code() {
            StatusCode::Unknown | StatusCode::Internal => {
                "Internal codec error".to_string()
            }
            _ => self.to_string(),
        }
    }

    /// Детализированное сообщение для логов.
    fn log_message(&self) -> String {
        format!("{self:?}")
    }

    /// Набор тегов (ключ–значение) для метрик и структурированных логов.
    fn metrics_tags(&self) -> Vec<(&'static str, String)> {
        vec![
            ("error_type", self.type_name()),
            ("status_code", self.status_code().to_string()),
        ]
    }

    /// Имя типа ошибки без пути модуля.
    fn type_name(&self) -> String {
        std::any::type_name::<Self>()
            .split("::")
            .last()
            .unwrap_or("Unknown")
            .to_string()
    }
}

#[cfg(test)]
mod tests {
    use std::{any::Any, error::Error, fmt};

    use super::*;

    // Ошибка без переопределения status_code (default = Internal).
    #[derive(Debug)]
    struct DefaultError(pub &'static str);

    impl fmt::Display for DefaultError {
        fn fmt(
            &self,
            f: &mut fmt::Formatter<'_>,
        ) -> fmt::Result {
            write!(f, "DefaultError: {}", self.0)
        }
    }

    impl Error for DefaultError {}

    impl ErrorExt for DefaultError {
        fn as_any(&self) -> &dyn Any {
            self
        }
    }

    #[derive(Debug)]
    struct TruncatedError(pub &'static str);

    impl fmt::Display for TruncatedError {
        fn fmt(
            &self,
            f: &mut fmt::Formatter<'_>,
        ) -> fmt::Result {
            write!(f, "Truncated: {}", self.0)
        }
    }

    impl Error for TruncatedError {}

    impl ErrorExt for TruncatedError {
        fn status_code(&self) -> StatusCode {
            StatusCode::UnexpectedEof
        }

        fn as_any(&self) -> &dyn Any {
            self
        }
    }

    /// Тест проверяет, что по умолчанию статус ошибки: `Internal`.
    #[test]
    fn test_default_status_code_is_internal() {
        let e = DefaultError("oops");
        assert_eq!(e.status_code(), StatusCode::Internal);
    }

    /// Тест проверяет, что для внутренних ошибок `client_message` скрывает
    /// детали.
    #[test]
    fn test_client_message_internal() {
        let e = DefaultError("sensitive");
        assert_eq!(e.client_message(), "Internal codec error");
    }

    #[test]
    fn test_client_message_non_internal() {
        let e = TruncatedError("header");
        assert_eq!(e.client_message(), e.to_string());
    }

    #[test]
    fn test_as_any_downcast() {
        let e = TruncatedError("x");
        let down = e.as_any().downcast_ref::<TruncatedError>();
        assert_eq!(down.map(|d| d.0), Some("x"));
    }

    /// Тест проверяет, что `metrics_tags` содержит `error_type` и
    /// `status_code`.
    #[test]
    fn test_metrics_tags_contains_expected_pairs() {
        let e = TruncatedError("t");
        let tags = e.metrics_tags();

        let error_type = tags.iter().find(|(k, _)| *k == "error_type");
        let status = tags.iter().find(|(k, _)| *k == "status_code");

        assert!(error_type.is_some_and(|(_, v)| v.ends_with("TruncatedError")));
        assert_eq!(
            status.map(|(_, v)| v.clone()),
            Some(StatusCode::UnexpectedEof.to_string())
        );
    }
}
