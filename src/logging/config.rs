use std::{fmt, str::FromStr};

use serde::{Deserialize, Serialize};

/// Output format of log lines.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    #[default]
    Compact,
    Pretty,
    Json,
}

impl FromStr for LogFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "compact" => Ok(Self::Compact),
            "pretty" => Ok(Self::Pretty),
            "json" => Ok(Self::Json),
            other => Err(format!("unknown log format '{other}'")),
        }
    }
}

impl fmt::Display for LogFormat {
    fn fmt(
        &self,
        f: &mut fmt::Formatter<'_>,
    ) -> fmt::Result {
        let name = match self {
            Self::Compact => "compact",
            Self::Pretty => "pretty",
            Self::Json => "json",
        };
        f.write_str(name)
    }
}

/// Настройки логирования.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Уровень или полная директива `EnvFilter`, например `"debug"` или
    /// `"bitbundle=trace,warn"`.
    pub level: String,
    pub format: LogFormat,
    pub with_ansi: bool,
    pub with_target: bool,
    pub with_line_numbers: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            format: LogFormat::Compact,
            with_ansi: true,
            with_target: true,
            with_line_numbers: false,
        }
    }
}

impl LoggingConfig {
    /// Директива для `EnvFilter`.
    pub fn build_filter_directive(&self) -> String {
        let level = self.level.trim();
        if level.is_empty() {
            "info".to_string()
        } else {
            level.to_string()
        }
    }
}
