//! Data model shared by the widget and the host dashboard.

use serde::{de, Deserialize, Deserializer, Serialize};
use serde_json::{Map, Number, Value};

use crate::error::ActionError;

/// Extra, unmodelled fields carried along with a record.
pub type Extra = Map<String, Value>;

// --- Lenient field decoding ---
//
// Dashboards are not consistent about scalar types: ids and labels arrive as
// numbers from some views. A descriptive field of the wrong type must not drop
// the whole record.

/// Strings are kept, numbers and booleans are stringified, anything else is `None`.
fn lenient_text<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Option<String>, D::Error> {
    Ok(match Value::deserialize(deserializer)? {
        Value::String(s) => Some(s),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        Value::Null | Value::Array(_) | Value::Object(_) => None,
    })
}

/// Required identifier: a string or a number.
fn lenient_id<'de, D: Deserializer<'de>>(deserializer: D) -> Result<String, D::Error> {
    match Value::deserialize(deserializer)? {
        Value::String(s) => Ok(s),
        Value::Number(n) => Ok(n.to_string()),
        other => Err(de::Error::custom(format!("id must be a string or number, got {other}"))),
    }
}

// --- Dashboard records ---

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
#[serde(rename_all = "camelCase")]
pub struct Device {
    #[serde(deserialize_with = "lenient_id")]
    pub id: String,
    #[serde(default, deserialize_with = "lenient_text", skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, deserialize_with = "lenient_text", skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
    #[serde(default, deserialize_with = "lenient_text", skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(flatten)]
    pub extra: Extra,
}

impl Device {
    pub fn with_id(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            ..Default::default()
        }
    }
}

/// Dashboard time window in epoch milliseconds.
///
/// Bounds keep the number exactly as the host sent it, fractional or not, so a
/// range forwarded back to the host is unchanged. No ordering is enforced on
/// values received from the host; only outbound commands call
/// [`DateRange::validate`].
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct DateRange {
    pub start_time: Number,
    pub end_time: Number,
}

impl DateRange {
    pub fn new(start_time: impl Into<Number>, end_time: impl Into<Number>) -> Self {
        Self {
            start_time: start_time.into(),
            end_time: end_time.into(),
        }
    }

    /// `None` if either bound is NaN or infinite.
    pub fn from_f64(start_time: f64, end_time: f64) -> Option<Self> {
        Some(Self {
            start_time: Number::from_f64(start_time)?,
            end_time: Number::from_f64(end_time)?,
        })
    }

    pub fn start_millis(&self) -> f64 {
        self.start_time.as_f64().unwrap_or(f64::NAN)
    }

    pub fn end_millis(&self) -> f64 {
        self.end_time.as_f64().unwrap_or(f64::NAN)
    }

    pub fn validate(&self) -> Result<(), ActionError> {
        if self.start_millis() < self.end_millis() {
            Ok(())
        } else {
            Err(ActionError::InvalidDateRange {
                start_time: self.start_time.clone(),
                end_time: self.end_time.clone(),
            })
        }
    }

    /// Decode and validate an untyped payload: must be an object with numeric
    /// `startTime` and `endTime`, start strictly before end.
    pub fn from_value(value: &Value) -> Result<Self, ActionError> {
        let obj = value
            .as_object()
            .ok_or_else(|| ActionError::MalformedDateRange(value.to_string()))?;
        let field = |key: &str| match obj.get(key) {
            Some(Value::Number(n)) => Ok(n.clone()),
            _ => Err(ActionError::MalformedDateRange(format!("`{key}` is not a number"))),
        };
        let range = Self::new(field("startTime")?, field("endTime")?);
        range.validate()?;
        Ok(range)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
#[serde(rename_all = "camelCase")]
pub struct DashboardObject {
    #[serde(default, deserialize_with = "lenient_text", skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(default, deserialize_with = "lenient_text", skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(flatten)]
    pub extra: Extra,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
#[serde(rename_all = "camelCase")]
pub struct DeviceObject {
    #[serde(default, deserialize_with = "lenient_text", skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(default, deserialize_with = "lenient_text", skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, deserialize_with = "lenient_text", skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
    #[serde(flatten)]
    pub extra: Extra,
}

/// A dashboard filter selection.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct FilterValue {
    #[serde(deserialize_with = "lenient_id")]
    pub id: String,
    pub value: Value,
}

/// Reserved widget descriptor. Not populated by any current wire event.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
pub struct WidgetInfo {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub settings: Option<Map<String, Value>>,
}

/// Options for the `openDrawer` command.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct DrawerOptions {
    pub url: String,
    pub width: u32,
}

/// Fullscreen request sent with `setFullScreen`.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum FullScreenSetting {
    Toggle,
    Enable,
    Disable,
}

// --- Provider state ---

/// Snapshot of everything the host has told the widget so far.
///
/// Replaced wholesale by [`crate::store::reduce`]; never mutated in place.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
#[serde(rename_all = "camelCase")]
pub struct WidgetState {
    /// Flips false -> true once and never reverts.
    pub ready: bool,
    pub token: Option<String>,
    pub jwt_token: Option<String>,
    pub selected_device: Option<Device>,
    pub selected_devices: Option<Vec<Device>>,
    pub date_range: Option<DateRange>,
    pub dashboard_object: Option<DashboardObject>,
    pub device_object: Option<DeviceObject>,
    pub device_objects: Option<Vec<DeviceObject>>,
    /// `None` means the host has not said either way.
    pub real_time: Option<bool>,
    pub widget: Option<WidgetInfo>,
    pub widget_id: Option<String>,
    pub filters: Option<Vec<FilterValue>>,
}

impl WidgetState {
    /// True when enough context is present to operate without having seen
    /// every configured ready event (public dashboards populate state this way).
    pub fn has_complete_context(&self) -> bool {
        (self.token.is_some() || self.jwt_token.is_some())
            && self.selected_device.is_some()
            && self.date_range.is_some()
            && self.dashboard_object.is_some()
    }
}
