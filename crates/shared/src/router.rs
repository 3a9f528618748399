//! Inbound message routing: wire event name -> state action.
//!
//! Routing is pure. [`route`] decides what an inbound message means (the action
//! to apply, the readiness tag to record, and the V2 message to re-emit for a
//! V1 arrival); the caller owns the store, the readiness set and the host
//! window, and applies the decision.

use serde::de::DeserializeOwned;
use serde_json::Value;

use crate::events::{InboundEvent, Protocol};
use crate::models::Device;
use crate::protocol::Envelope;
use crate::store::Action;

/// Decodes a raw payload into the action for one concept.
type Handler = fn(&Value) -> Action;

/// Outcome of routing one recognized inbound message.
#[derive(Debug, Clone, PartialEq)]
pub struct Routed {
    pub event: InboundEvent,
    pub protocol: Protocol,
    pub action: Action,
    /// The payload was present but could not be decoded, so the field is
    /// stored as `None`.
    pub normalized: bool,
    /// V2 message to forward to the host. Only V1 arrivals with a V2
    /// equivalent produce one.
    pub reemit: Option<Envelope>,
}

impl Routed {
    /// Tag recorded in the readiness set.
    pub fn ready_tag(&self) -> InboundEvent {
        self.event
    }
}

/// Route an inbound event. Unknown names yield `None` and must be ignored.
pub fn route(event_name: &str, payload: &Value) -> Option<Routed> {
    let (event, protocol) = InboundEvent::from_wire(event_name)?;
    let action = handler(event)(payload);
    let normalized = !payload.is_null() && action.clears_field();
    let reemit = match protocol {
        Protocol::V1 => event
            .v2_equivalent()
            .map(|v2| Envelope::new(v2, Some(translate_for_v2(&action, payload)))),
        Protocol::V2 => None,
    };
    Some(Routed {
        event,
        protocol,
        action,
        normalized,
        reemit,
    })
}

fn handler(event: InboundEvent) -> Handler {
    match event {
        InboundEvent::ReceivedToken => |p| Action::ReceivedToken(decode(p)),
        InboundEvent::ReceivedJwtToken => |p| Action::ReceivedJwtToken(decode(p)),
        InboundEvent::SelectedDevice => |p| Action::SelectedDevice(normalize_selected_device(p)),
        InboundEvent::SelectedDevices => |p| Action::SelectedDevices(decode(p)),
        InboundEvent::SelectedDashboardDateRange => {
            |p| Action::SelectedDashboardDateRange(decode(p))
        }
        InboundEvent::SelectedDashboardObject => |p| Action::SelectedDashboardObject(decode(p)),
        InboundEvent::SelectedDeviceObject => |p| Action::SelectedDeviceObject(decode(p)),
        InboundEvent::SelectedDeviceObjects => |p| Action::SelectedDeviceObjects(decode(p)),
        InboundEvent::SelectedFilters => |p| Action::SelectedFilters(decode(p)),
        InboundEvent::IsRealTimeActive => |p| Action::RealTimeStatus(decode(p)),
    }
}

/// Payload forwarded under the V2 name.
///
/// The single-device selection becomes a one-element device list; everything
/// else is forwarded as received.
fn translate_for_v2(action: &Action, payload: &Value) -> Value {
    match action {
        Action::SelectedDevice(Some(device)) => {
            serde_json::to_value(vec![device]).unwrap_or(Value::Null)
        }
        Action::SelectedDevice(None) => Value::Null,
        _ => payload.clone(),
    }
}

/// Typed pass-through. A payload of the wrong shape becomes `None`.
fn decode<T: DeserializeOwned>(payload: &Value) -> Option<T> {
    serde_json::from_value::<Option<T>>(payload.clone())
        .ok()
        .flatten()
}

/// Normalize a single-device selection.
///
/// Accepts a bare id (`"abc"`) or a comma-joined id list from multi-device
/// dashboards (`"abc, def"`), keeping the first trimmed segment. Anything else,
/// including an empty first segment, is `None`.
pub fn normalize_selected_device(payload: &Value) -> Option<Device> {
    let raw = payload.as_str()?;
    let first = raw.split(',').next().unwrap_or_default().trim();
    if first.is_empty() {
        None
    } else {
        Some(Device::with_id(first))
    }
}
