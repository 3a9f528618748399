//! Wire envelope and per-widget event naming.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::ProtocolError;
use crate::events::WIDGET_EVENT_PREFIX;

/// The unit exchanged with the host window: `{event, payload?}`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Envelope {
    pub event: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub payload: Option<Value>,
}

impl Envelope {
    pub fn new(event: impl Into<String>, payload: Option<Value>) -> Self {
        Self {
            event: event.into(),
            payload,
        }
    }

    /// Extract an envelope from arbitrary message data.
    ///
    /// Anything without a non-empty string `event` field is rejected; the
    /// payload is kept verbatim (including `null`).
    pub fn from_value(data: &Value) -> Result<Self, ProtocolError> {
        let event = data
            .get("event")
            .and_then(Value::as_str)
            .filter(|name| !name.is_empty())
            .ok_or(ProtocolError::MissingEventName)?;
        Ok(Self {
            event: event.to_string(),
            payload: data.get("payload").cloned(),
        })
    }

    /// Payload, treating an absent field as `null`.
    pub fn payload_or_null(&self) -> &Value {
        self.payload.as_ref().unwrap_or(&Value::Null)
    }
}

/// A message as delivered by the platform, before origin checks.
#[derive(Debug, Clone, PartialEq)]
pub struct InboundMessage {
    pub origin: String,
    pub data: Value,
}

impl InboundMessage {
    pub fn new(origin: impl Into<String>, data: Value) -> Self {
        Self {
            origin: origin.into(),
            data,
        }
    }
}

/// Parsed form of `v2:widget:<event>:<widgetId>`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WidgetEventName {
    pub event: String,
    pub widget_id: String,
}

/// Build the wire name for a widget-scoped event.
pub fn widget_event_name(event: &str, widget_id: &str) -> String {
    format!("{WIDGET_EVENT_PREFIX}{event}:{widget_id}")
}

pub fn is_widget_event(name: &str) -> bool {
    name.starts_with(WIDGET_EVENT_PREFIX)
}

/// Split a widget event name back into its parts.
///
/// The widget id is everything after the last `:`, so event names may contain
/// colons themselves (`v2:widget:chart:zoomed:w1`).
pub fn parse_widget_event(name: &str) -> Result<WidgetEventName, ProtocolError> {
    let rest = name
        .strip_prefix(WIDGET_EVENT_PREFIX)
        .ok_or_else(|| ProtocolError::NotWidgetEvent(name.to_string()))?;
    let (event, widget_id) = rest
        .rsplit_once(':')
        .ok_or_else(|| ProtocolError::MalformedWidgetEvent(name.to_string()))?;
    if event.is_empty() || widget_id.is_empty() {
        return Err(ProtocolError::MalformedWidgetEvent(name.to_string()));
    }
    Ok(WidgetEventName {
        event: event.to_string(),
        widget_id: widget_id.to_string(),
    })
}
