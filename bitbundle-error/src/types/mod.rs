pub mod codec_error;

pub use codec_error::*;

/// Конвертация из std::io::Error: обрыв потока становится
/// [`CodecError::UnexpectedEof`], остальное: [`CodecError::Io`].
impl From<std::io::Error> for crate::StackError {
    fn from(err: std::io::Error) -> Self {
        crate::StackError::new(CodecError::from(err))
    }
}

////////////////////////////////////////////////////////////////////////////////
// Тесты
////////////////////////////////////////////////////////////////////////////////
