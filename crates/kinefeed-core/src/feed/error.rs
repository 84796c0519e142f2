//! Feed errors

use thiserror::Error;

/// Errors that can occur while running a live feed
#[derive(Error, Debug, Clone, PartialEq)]
pub enum FeedError {
    /// Recording identifier is empty or blank
    #[error("Invalid recording identifier: {0:?}")]
    InvalidRecordingId(String),

    /// Endpoint unreachable or handshake failed
    #[error("Connection failed: {0}")]
    Connection(String),

    /// Handshake did not finish within the connect timeout
    #[error("Connection timeout after {0}ms")]
    ConnectTimeout(u64),

    /// Open connection dropped with an error
    #[error("Transport error: {0}")]
    Transport(String),

    /// Feed opened outside a tokio runtime
    #[error("No async runtime available to drive the feed")]
    NoRuntime,

    /// Unusable configuration value
    #[error("Invalid configuration: {0}")]
    Config(String),

    /// Reading a configuration file failed
    #[error("I/O error: {0}")]
    Io(String),
}

impl From<std::io::Error> for FeedError {
    fn from(err: std::io::Error) -> Self {
        FeedError::Io(err.to_string())
    }
}

/// Reasons an inbound frame is rejected as malformed
#[derive(Error, Debug)]
pub enum PacketError {
    /// Not JSON, or missing `angle_deg`
    #[error("Unparseable packet: {0}")]
    Json(#[from] serde_json::Error),

    /// NaN or infinite number
    #[error("Non-finite value for {field}: {value}")]
    NonFinite {
        /// Offending field name
        field: &'static str,
        /// Value received
        value: f64,
    },

    /// Binary payload that is not text
    #[error("Binary frame is not valid UTF-8")]
    InvalidUtf8,
}
