//! Подсистема логирования на `tracing`.
//!
//! Библиотека только эмитит события; установка subscriber'а остаётся за
//! приложением (см. [`init_logging`]).

pub mod config;
mod filters;
mod formatter;

pub use config::{LogFormat, LoggingConfig};
pub use filters::build_filter;
pub use formatter::{build_layer, build_layer_with_writer};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Debug, thiserror::Error)]
pub enum LoggingError {
    #[error("invalid log filter directive '{directive}': {reason}")]
    InvalidDirective { directive: String, reason: String },

    #[error("global subscriber already installed: {0}")]
    AlreadyInitialized(String),
}

/// Устанавливает глобальный subscriber. Повторный вызов возвращает
/// [`LoggingError::AlreadyInitialized`], а не паникует.
pub fn init_logging(config: LoggingConfig) -> Result<(), LoggingError> {
    let filter = build_filter(&config)?;
    let layer = build_layer(&config);

    tracing_subscriber::registry()
        .with(filter)
        .with(layer)
        .try_init()
        .map_err(|e| LoggingError::AlreadyInitialized(e.to_string()))?;

    tracing::debug!(
        version = env!("CARGO_PKG_VERSION"),
        level = %config.level,
        format = %config.format,
        "logging initialized"
    );
    Ok(())
}
