use tracing_subscriber::EnvFilter;

use super::{config::LoggingConfig, LoggingError};

/// `RUST_LOG` wins when set; otherwise the configured directive is used.
pub fn build_filter(config: &LoggingConfig) -> Result<EnvFilter, LoggingError> {
    if let Ok(filter) = EnvFilter::try_from_default_env() {
        return Ok(filter);
    }
    let directive = config.build_filter_directive();
    EnvFilter::try_new(&directive).map_err(|e| LoggingError::InvalidDirective {
        directive,
        reason: e.to_string(),
    })
}
