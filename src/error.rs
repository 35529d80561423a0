use thiserror::Error;

use crate::domain::error::DomainError;

/// Configuration-related errors with structured variants.
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("missing required field: {field}")]
    MissingField { field: &'static str },

    #[error("invalid value for {field}: {reason}")]
    InvalidValue { field: &'static str, reason: String },

    #[error("failed to read config file: {0}")]
    ReadFile(#[source] std::io::Error),

    #[error("failed to parse config: {0}")]
    Parse(#[source] toml::de::Error),
}

/// Errors surfaced to the caller of a retrieval.
///
/// Only caller mistakes end up here. Timeouts and channel failures are
/// absorbed into an all-pass result instead.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RetrievalError {
    #[error("invalid batch: {reason}")]
    InvalidBatch { reason: String },
}

/// Errors raised by an out-of-band delivery channel.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TransportError {
    #[error("network failure: {0}")]
    Network(String),

    #[error("malformed delivery: {0}")]
    MalformedDelivery(String),

    #[error("execution scope unavailable: {0}")]
    ScopeUnavailable(String),

    #[error("delivery channel closed before settlement")]
    ChannelClosed,
}

/// Errors raised by the callback correlator.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CorrelatorError {
    #[error("correlation id already pending: {0}")]
    AlreadyPending(String),
}

#[derive(Error, Debug)]
pub enum Error {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Domain(#[from] DomainError),

    #[error(transparent)]
    Retrieval(#[from] RetrievalError),

    #[error(transparent)]
    Transport(#[from] TransportError),

    #[error(transparent)]
    Correlator(#[from] CorrelatorError),

    #[error("JSON parsing error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("URL parse error: {0}")]
    Url(#[from] url::ParseError),
}

pub type Result<T> = std::result::Result<T, Error>;
