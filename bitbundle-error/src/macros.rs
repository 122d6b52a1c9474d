/// Немедленно возвращает ошибку (аналогично `anyhow::bail!`).
///
/// Принимает готовую ошибку или `StackError`-совместимый тип.
///
/// ```ignore
/// use bitbundle_error::{bail, CodecError};
///
/// fn check_step(step: u32) -> bitbundle_error::CodecResult<()> {
///     if step == 0 {
///         bail!(CodecError::invalid_config("step must be positive"));
///     }
///     Ok(())
/// }
/// ```
#[macro_export]
macro_rules! bail {
    ($err:expr) => {
        return Err($crate::StackError::from($err))
    };
}

/// Проверяет условие и вызывает `bail!`, если условие ложно.
#[macro_export]
macro_rules! ensure {
    ($cond:expr, $err:expr) => {
        if !($cond) {
            $crate::bail!($err);
        }
    };
}

/// Трейт-расширение для `Result`, добавляющее методы контекстирования.
///
/// Позволяет вызывать `.context(...)` и `.with_context(...)` на результатах,
/// превращая ошибку в [`StackError`](crate::StackError) и приклеивая к ней
/// контекст.
pub trait ResultExt<T> {
    fn context<C>(
        self,
        ctx: C,
    ) -> Result<T, crate::StackError>
    where
        C: Into<String>;

    /// Ленивый контекст (замыкание вызывается только в случае ошибки).
    fn with_context<C, F>(
        self,
        f: F,
    ) -> Result<T, crate::StackError>
    where
        C: Into<String>,
        F: FnOnce() -> C;
}

impl<T, E> ResultExt<T> for Result<T, E>
where
    E: Into<crate::StackError>,
{
    #[track_caller]
    fn context<C>(
        self,
        ctx: C,
    ) -> Result<T, crate::StackError>
    where
        C: Into<String>,
    {
        self.map_err(|e| e.into().context(ctx))
    }

    #[track_caller]
    fn with_context<C, F>(
        self,
        f: F,
    ) -> Result<T, crate::StackError>
    where
        C: Into<String>,
        F: FnOnce() -> C,
    {
        self.map_err(|e| e.into().context(f()))
    }
}

////////////////////////////////////////////////////////////////////////////////
// Тесты
////////////////////////////////////////////////////////////////////////////////
