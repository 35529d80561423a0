//! Application configuration loading and validation.
//!
//! Provides the main [`Config`] struct that aggregates all settings.
//! Configuration is loaded from a TOML file; the endpoint can be overridden
//! through `SLOTBID_BASE_URL`. Every section is optional.
//!
//! # Example
//!
//! ```no_run
//! use slotbid::infrastructure::config::settings::Config;
//!
//! fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = Config::load("slotbid.toml")?;
//!     config.init_logging();
//!     Ok(())
//! }
//! ```

use std::path::Path;
use std::time::Duration;

use serde::Deserialize;
use url::Url;

use super::logging::LoggingConfig;
use super::partner::{AdapterConfig, PartnerConfig};
use crate::adapter::outbound::http::HttpConfig;
use crate::error::{ConfigError, Result};

/// Environment variable overriding `adapter.base_url`.
pub const BASE_URL_ENV: &str = "SLOTBID_BASE_URL";

/// Main application configuration.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub partner: PartnerConfig,

    #[serde(default)]
    pub adapter: AdapterConfig,

    /// HTTP client settings for the delivery channel.
    #[serde(default)]
    pub http: HttpConfig,

    /// Logging and tracing configuration.
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl Config {
    /// Parse configuration from TOML content and apply environment overrides.
    ///
    /// # Errors
    ///
    /// Returns an error if the TOML content is malformed or validation fails.
    pub fn parse_toml(content: &str) -> Result<Self> {
        let mut config: Self = toml::from_str(content).map_err(ConfigError::Parse)?;
        config.apply_overrides(|key| std::env::var(key).ok());
        config.validate()?;
        Ok(config)
    }

    /// Load configuration from a TOML file.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read, the TOML content is
    /// malformed or validation fails.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(ConfigError::ReadFile)?;
        Self::parse_toml(&content)
    }

    fn apply_overrides(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        if let Some(url) = lookup(BASE_URL_ENV).filter(|v| !v.trim().is_empty()) {
            self.adapter.base_url = url.trim().to_string();
        }
    }

    /// Validate configuration values.
    pub fn validate(&self) -> Result<()> {
        if self.partner.id.trim().is_empty() {
            return Err(ConfigError::MissingField { field: "partner.id" }.into());
        }
        if self.partner.targeting_keys.om.trim().is_empty() {
            return Err(ConfigError::MissingField {
                field: "partner.targeting_keys.om",
            }
            .into());
        }

        self.base_url()?;

        let callback = &self.adapter.callback_name;
        if callback.is_empty()
            || !callback
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '$')
        {
            return Err(ConfigError::InvalidValue {
                field: "adapter.callback_name",
                reason: "must be a non-empty identifier".to_string(),
            }
            .into());
        }

        if self.adapter.timeout_ms == 0 {
            return Err(ConfigError::InvalidValue {
                field: "adapter.timeout_ms",
                reason: "must be greater than 0".to_string(),
            }
            .into());
        }

        if let Some(buckets) = &self.adapter.bid_transformer {
            buckets.validate().map_err(|e| ConfigError::InvalidValue {
                field: "adapter.bid_transformer",
                reason: e.to_string(),
            })?;
        }

        if self.http.timeout_ms == 0 || self.http.connect_timeout_ms == 0 {
            return Err(ConfigError::InvalidValue {
                field: "http",
                reason: "timeouts must be greater than 0".to_string(),
            }
            .into());
        }

        Ok(())
    }

    /// Parsed endpoint URL.
    pub fn base_url(&self) -> Result<Url> {
        let url = Url::parse(&self.adapter.base_url).map_err(|e| ConfigError::InvalidValue {
            field: "adapter.base_url",
            reason: e.to_string(),
        })?;
        if !matches!(url.scheme(), "http" | "https") {
            return Err(ConfigError::InvalidValue {
                field: "adapter.base_url",
                reason: format!("unsupported scheme '{}'", url.scheme()),
            }
            .into());
        }
        Ok(url)
    }

    #[must_use]
    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.adapter.timeout_ms)
    }

    /// Initialize logging based on configuration.
    pub fn init_logging(&self) {
        self.logging.init();
    }
}
