//! Logging configuration and initialization.

use serde::Deserialize;
use tracing_subscriber::{fmt, EnvFilter};

/// Output format of the subscriber.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    #[default]
    Pretty,
    Json,
}

/// Logging configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct LoggingConfig {
    #[serde(default = "default_level")]
    pub level: String,
    #[serde(default)]
    pub format: LogFormat,
}

fn default_level() -> String {
    "info".into()
}

impl LoggingConfig {
    /// Apply command-line flags on top of the configured values.
    ///
    /// Any `-v` picks the level from the count; `--json` forces JSON lines.
    #[must_use]
    pub fn with_overrides(mut self, verbosity: u8, json: bool) -> Self {
        match verbosity {
            0 => {}
            1 => self.level = "info".into(),
            2 => self.level = "debug".into(),
            _ => self.level = "trace".into(),
        }
        if json {
            self.format = LogFormat::Json;
        }
        self
    }

    /// Initialize the tracing subscriber with this logging configuration.
    ///
    /// `RUST_LOG` wins over the configured level. A second call is a no-op.
    pub fn init(&self) {
        let filter =
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&self.level));

        let result = match self.format {
            LogFormat::Json => fmt()
                .json()
                .with_env_filter(filter)
                .with_writer(std::io::stderr)
                .try_init(),
            LogFormat::Pretty => fmt()
                .with_env_filter(filter)
                .with_writer(std::io::stderr)
                .try_init(),
        };
        // already installed by an earlier call or by the host process
        let _ = result;
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_level(),
            format: LogFormat::default(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn configured() -> LoggingConfig {
        LoggingConfig {
            level: "debug".into(),
            format: LogFormat::Json,
        }
    }

    #[test]
    fn configured_values_survive_without_flags() {
        let logging = configured().with_overrides(0, false);
        assert_eq!(logging.level, "debug");
        assert_eq!(logging.format, LogFormat::Json);
    }

    #[test]
    fn verbosity_overrides_level() {
        assert_eq!(configured().with_overrides(1, false).level, "info");
        assert_eq!(LoggingConfig::default().with_overrides(3, false).level, "trace");
    }

    #[test]
    fn json_flag_forces_json_format() {
        let logging = LoggingConfig::default().with_overrides(0, true);
        assert_eq!(logging.format, LogFormat::Json);
        assert_eq!(logging.level, "info");
    }
}
