use std::{fmt, panic::Location, sync::Arc};

use crate::{ErrorExt, StatusCode};

/// Ошибка с цепочкой контекстов.
///
/// Каждый уровень рекурсии кодека может добавить свой контекст
/// (например, ключ вложенного `Bundle`), так что итоговое сообщение
/// показывает путь до проблемного значения.
#[derive(Clone)]
pub struct StackError {
    inner: Arc<dyn ErrorExt>,
    contexts: Arc<Vec<ErrorContext>>,
}

/// Контекст ошибки с location tracking.
#[derive(Debug, Clone)]
pub struct ErrorContext {
    pub message: String,
    pub location: Option<&'static Location<'static>>,
}

////////////////////////////////////////////////////////////////////////////////
// Собственные методы
////////////////////////////////////////////////////////////////////////////////

impl StackError {
    #[track_caller]
    pub fn new<E: ErrorExt>(err: E) -> Self {
        Self {
            inner: Arc::new(err),
            contexts: Arc::new(Vec::new()),
        }
    }

    /// Добавляет контекст к ошибке.
    #[track_caller]
    pub fn context(
        mut self,
        msg: impl Into<String>,
    ) -> Self {
        let mut new_contexts = (*self.contexts).clone();
        new_contexts.push(ErrorContext {
            message: msg.into(),
            location: Some(Location::caller()),
        });
        self.contexts = Arc::new(new_contexts);
        self
    }

    pub fn status_code(&self) -> StatusCode {
        self.inner.status_code()
    }

    pub fn client_message(&self) -> String {
        self.inner.client_message()
    }

    /// Возвращает корневую ошибку.
    pub fn root(&self) -> &dyn ErrorExt {
        self.inner.as_ref()
    }

    /// Контексты в порядке добавления (от самого глубокого к внешнему).
    pub fn contexts(&self) -> &[ErrorContext] {
        &self.contexts
    }

    pub fn metrics_tags(&self) -> Vec<(&'static str, String)> {
        self.inner.metrics_tags()
    }

    /// Попытка downcast к конкретному типу ошибки.
    pub fn downcast_ref<T: ErrorExt + 'static>(&self) -> Option<&T> {
        self.inner.as_any().downcast_ref::<T>()
    }

    /// Заменяет корневую ошибку типа `T`, сохраняя цепочку контекстов.
    /// Если корень другого типа, ошибка возвращается без изменений.
    pub fn map_root<T: ErrorExt + Clone>(
        mut self,
        f: impl FnOnce(T) -> T,
    ) -> Self {
        if let Some(root) = self.downcast_ref::<T>() {
            self.inner = Arc::new(f(root.clone()));
        }
        self
    }

    fn format_contexts(&self) -> Vec<String> {
        self.contexts
            .iter()
            .map(|ctx| {
                if let Some(loc) = ctx.location {
                    format!("{} ({}:{})", ctx.message, loc.file(), loc.line())
                } else {
                    ctx.message.clone()
                }
            })
            .collect()
    }
}

////////////////////////////////////////////////////////////////////////////////
// Общие реализации трейтов для StackError
////////////////////////////////////////////////////////////////////////////////

impl fmt::Debug for StackError {
    fn fmt(
        &self,
        f: &mut fmt::Formatter<'_>,
    ) -> fmt::Result {
        let mut debug = f.debug_struct("StackError");
        debug.field("inner", &self.inner.to_string());
        debug.field("status_code", &self.status_code());

        if !self.contexts.is_empty() {
            debug.field("contexts", &self.format_contexts());
        }

        debug.finish()
    }
}

impl fmt::Display for StackError {
    fn fmt(
        &self,
        f: &mut fmt::Formatter<'_>,
    ) -> fmt::Result {
        if !self.contexts.is_empty() {
            // Внешний контекст печатается первым.
            let contexts: Vec<&str> = self
                .contexts
                .iter()
                .rev()
                .map(|c| c.message.as_str())
                .collect();
            write!(f, "{}: {}", contexts.join(" → "), self.inner)
        } else {
            write!(f, "{}", self.inner)
        }
    }
}

impl std::error::Error for StackError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        Some(self.inner.as_ref())
    }
}

impl<E: ErrorExt> From<E> for StackError {
    #[track_caller]
    fn from(e: E) -> Self {
        StackError::new(e)
    }
}

impl From<StackError> for std::io::Error {
    fn from(e: StackError) -> Self {
        std::io::Error::other(e.to_string())
    }
}

////////////////////////////////////////////////////////////////////////////////
// Тесты
////////////////////////////////////////////////////////////////////////////////
