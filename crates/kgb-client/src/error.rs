//! Error types for kgb-client

use serde_json::Value;
use thiserror::Error;

/// Errors that can occur while talking to a KGB relay
#[derive(Error, Debug)]
pub enum KgbError {
    /// Non-200 HTTP status or a network-level failure (DNS, connect, timeout)
    #[error("HTTP error: {0}")]
    Transport(String),

    /// Response body is not valid JSON or not a JSON object
    #[error("Failed to decode response: {0}")]
    Decode(String),

    /// The relay answered with a non-null `error` member
    #[error("error result: {0}")]
    Remote(Value),

    /// HTTP 200 and valid JSON, but `result` is not a success marker
    #[error("unexpected result from {method}: {result}")]
    ProtocolViolation {
        /// Remote procedure that was invoked
        method: String,
        /// The value the relay actually returned
        result: Value,
    },

    /// The request could not be built
    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    /// Missing or invalid client configuration
    #[error("Invalid configuration: {0}")]
    Config(String),
}

impl From<reqwest::Error> for KgbError {
    fn from(err: reqwest::Error) -> Self {
        KgbError::Transport(err.to_string())
    }
}

impl From<serde_json::Error> for KgbError {
    fn from(err: serde_json::Error) -> Self {
        KgbError::Decode(err.to_string())
    }
}
