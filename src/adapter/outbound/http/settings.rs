//! HTTP channel configuration.

use serde::Deserialize;

/// HTTP client settings for the delivery channel.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct HttpConfig {
    /// Request timeout in milliseconds. Acts as a backstop behind the
    /// retrieval timeout.
    #[serde(default = "default_http_timeout_ms")]
    pub timeout_ms: u64,
    /// Connect timeout in milliseconds.
    #[serde(default = "default_http_connect_timeout_ms")]
    pub connect_timeout_ms: u64,
    #[serde(default = "default_user_agent")]
    pub user_agent: String,
}

const fn default_http_timeout_ms() -> u64 {
    5000
}

const fn default_http_connect_timeout_ms() -> u64 {
    2000
}

fn default_user_agent() -> String {
    concat!("slotbid/", env!("CARGO_PKG_VERSION")).to_string()
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            timeout_ms: default_http_timeout_ms(),
            connect_timeout_ms: default_http_connect_timeout_ms(),
            user_agent: default_user_agent(),
        }
    }
}
