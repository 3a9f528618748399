//! Error types for the widget messaging protocol.
//!
//! None of these ever escape the inbound path: malformed host data degrades to
//! a dropped event or a null field. They surface only from explicit parse
//! helpers and from outbound commands that validate their input.

use serde_json::Number;
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ProtocolError {
    #[error("unknown event name: {0}")]
    UnknownEvent(String),
    #[error("message has no string `event` field")]
    MissingEventName,
    #[error("not a widget event: {0}")]
    NotWidgetEvent(String),
    #[error("malformed widget event name: {0}")]
    MalformedWidgetEvent(String),
}

/// Reasons an outbound command refused to send anything.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ActionError {
    #[error("invalid date range: startTime ({start_time}) must be before endTime ({end_time})")]
    InvalidDateRange { start_time: Number, end_time: Number },
    #[error("invalid date range payload: {0}")]
    MalformedDateRange(String),
    #[error("widget id is not defined")]
    MissingWidgetId,
    #[error("host rejected message: {0}")]
    Host(String),
}

/// Error type for the authenticated Ubidots API client
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ApiError {
    Network(String),
    Http { status: u16, body: String },
    Deserialize(String),
    InvalidUrl(String),
}

impl std::fmt::Display for ApiError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ApiError::Network(msg) => write!(f, "Network error: {}", msg),
            ApiError::Http { status, body } => write!(f, "HTTP {}: {}", status, body),
            ApiError::Deserialize(msg) => write!(f, "Deserialization error: {}", msg),
            ApiError::InvalidUrl(msg) => write!(f, "Invalid URL: {}", msg),
        }
    }
}

impl std::error::Error for ApiError {}
