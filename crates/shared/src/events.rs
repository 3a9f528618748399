//! Wire-level event names for the dashboard/widget messaging protocol.
//!
//! Two generations of names coexist on the wire:
//! - V1: flat legacy names (`receivedToken`, `setDashboardDevice`, ...)
//! - V2: namespaced names (`v2:<domain>:<concept>`)
//!
//! Every inbound concept is modelled by [`InboundEvent`], every outbound command
//! by [`OutboundCommand`]. The V1/V2 tables are exhaustive `match`es so adding a
//! variant without deciding its wire spelling does not compile.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::ProtocolError;

// --- V1 inbound ---

pub const RECEIVED_TOKEN: &str = "receivedToken";
pub const RECEIVED_JWT_TOKEN: &str = "receivedJWTToken";
pub const SELECTED_DEVICE: &str = "selectedDevice";
pub const SELECTED_DEVICES: &str = "selectedDevices";
pub const SELECTED_DASHBOARD_DATE_RANGE: &str = "selectedDashboardDateRange";
pub const SELECTED_DASHBOARD_OBJECT: &str = "selectedDashboardObject";
pub const SELECTED_DEVICE_OBJECT: &str = "selectedDeviceObject";
pub const SELECTED_DEVICE_OBJECTS: &str = "selectedDeviceObjects";
pub const SELECTED_FILTERS: &str = "selectedFilters";
pub const IS_REAL_TIME_ACTIVE: &str = "isRealTimeActive";

// --- V1 outbound ---

pub const SET_DASHBOARD_DEVICE: &str = "setDashboardDevice";
pub const SET_DASHBOARD_MULTIPLE_DEVICES: &str = "setDashboardMultipleDevices";
pub const SET_DASHBOARD_DATE_RANGE: &str = "setDashboardDateRange";
pub const SET_DASHBOARD_LAYER: &str = "setDashboardLayer";
pub const SET_REAL_TIME: &str = "setRealTime";
pub const REFRESH_DASHBOARD: &str = "refreshDashboard";
pub const OPEN_DRAWER: &str = "openDrawer";
pub const SET_FULL_SCREEN: &str = "setFullScreen";

// --- V2 ---

pub const V2_AUTH_TOKEN: &str = "v2:auth:token";
pub const V2_AUTH_JWT: &str = "v2:auth:jwt";
pub const V2_DEVICES_SELECTED: &str = "v2:dashboard:devices:selected";
pub const V2_DATE_RANGE: &str = "v2:dashboard:settings:daterange";
pub const V2_DASHBOARD_SELF: &str = "v2:dashboard:self";
pub const V2_FILTERS: &str = "v2:dashboard:settings:filters";
pub const V2_REAL_TIME: &str = "v2:dashboard:settings:rt";
pub const V2_REFRESHED: &str = "v2:dashboard:settings:refreshed";
pub const V2_FULL_SCREEN: &str = "v2:dashboard:settings:fullscreen";
pub const V2_DRAWER_OPEN: &str = "v2:dashboard:drawer:open";

/// Prefix shared by every per-widget event (`v2:widget:<event>:<widgetId>`).
pub const WIDGET_EVENT_PREFIX: &str = "v2:widget:";

/// Widget lifecycle event emitted once the provider becomes ready.
pub const WIDGET_READY_EVENT: &str = "ready";

/// Which generation of the protocol a message was spelled in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Protocol {
    V1,
    V2,
}

/// An inbound concept sent by the host dashboard.
///
/// Doubles as the readiness tag: whichever spelling a concept arrives in, the
/// gate records the same variant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum InboundEvent {
    #[serde(rename = "receivedToken")]
    ReceivedToken,
    #[serde(rename = "receivedJWTToken")]
    ReceivedJwtToken,
    #[serde(rename = "selectedDevice")]
    SelectedDevice,
    #[serde(rename = "selectedDevices")]
    SelectedDevices,
    #[serde(rename = "selectedDashboardDateRange")]
    SelectedDashboardDateRange,
    #[serde(rename = "selectedDashboardObject")]
    SelectedDashboardObject,
    #[serde(rename = "selectedDeviceObject")]
    SelectedDeviceObject,
    #[serde(rename = "selectedDeviceObjects")]
    SelectedDeviceObjects,
    #[serde(rename = "selectedFilters")]
    SelectedFilters,
    #[serde(rename = "isRealTimeActive")]
    IsRealTimeActive,
}

/// Readiness tags are the inbound concepts themselves.
pub type ReadyEvent = InboundEvent;

/// Ready events used when the caller configures none.
pub const DEFAULT_READY_EVENTS: &[ReadyEvent] = &[InboundEvent::ReceivedToken];

impl InboundEvent {
    pub const ALL: [InboundEvent; 10] = [
        InboundEvent::ReceivedToken,
        InboundEvent::ReceivedJwtToken,
        InboundEvent::SelectedDevice,
        InboundEvent::SelectedDevices,
        InboundEvent::SelectedDashboardDateRange,
        InboundEvent::SelectedDashboardObject,
        InboundEvent::SelectedDeviceObject,
        InboundEvent::SelectedDeviceObjects,
        InboundEvent::SelectedFilters,
        InboundEvent::IsRealTimeActive,
    ];

    /// The legacy spelling.
    pub fn v1_name(self) -> &'static str {
        match self {
            InboundEvent::ReceivedToken => RECEIVED_TOKEN,
            InboundEvent::ReceivedJwtToken => RECEIVED_JWT_TOKEN,
            InboundEvent::SelectedDevice => SELECTED_DEVICE,
            InboundEvent::SelectedDevices => SELECTED_DEVICES,
            InboundEvent::SelectedDashboardDateRange => SELECTED_DASHBOARD_DATE_RANGE,
            InboundEvent::SelectedDashboardObject => SELECTED_DASHBOARD_OBJECT,
            InboundEvent::SelectedDeviceObject => SELECTED_DEVICE_OBJECT,
            InboundEvent::SelectedDeviceObjects => SELECTED_DEVICE_OBJECTS,
            InboundEvent::SelectedFilters => SELECTED_FILTERS,
            InboundEvent::IsRealTimeActive => IS_REAL_TIME_ACTIVE,
        }
    }

    /// The V2 name a V1 arrival is re-emitted under, if the concept has one.
    ///
    /// The single-device concept maps onto the multi-device V2 event: V2 has
    /// no singular device selection.
    pub fn v2_equivalent(self) -> Option<&'static str> {
        match self {
            InboundEvent::ReceivedToken => Some(V2_AUTH_TOKEN),
            InboundEvent::ReceivedJwtToken => Some(V2_AUTH_JWT),
            InboundEvent::SelectedDevice | InboundEvent::SelectedDevices => {
                Some(V2_DEVICES_SELECTED)
            }
            InboundEvent::SelectedDashboardDateRange => Some(V2_DATE_RANGE),
            InboundEvent::SelectedDashboardObject => Some(V2_DASHBOARD_SELF),
            InboundEvent::SelectedFilters => Some(V2_FILTERS),
            InboundEvent::IsRealTimeActive => Some(V2_REAL_TIME),
            InboundEvent::SelectedDeviceObject | InboundEvent::SelectedDeviceObjects => None,
        }
    }

    /// Resolve a wire name (either spelling) into its concept.
    ///
    /// `v2:dashboard:devices:selected` always resolves to the multi-device
    /// concept.
    pub fn from_wire(name: &str) -> Option<(InboundEvent, Protocol)> {
        let resolved = match name {
            RECEIVED_TOKEN => (InboundEvent::ReceivedToken, Protocol::V1),
            RECEIVED_JWT_TOKEN => (InboundEvent::ReceivedJwtToken, Protocol::V1),
            SELECTED_DEVICE => (InboundEvent::SelectedDevice, Protocol::V1),
            SELECTED_DEVICES => (InboundEvent::SelectedDevices, Protocol::V1),
            SELECTED_DASHBOARD_DATE_RANGE => {
                (InboundEvent::SelectedDashboardDateRange, Protocol::V1)
            }
            SELECTED_DASHBOARD_OBJECT => (InboundEvent::SelectedDashboardObject, Protocol::V1),
            SELECTED_DEVICE_OBJECT => (InboundEvent::SelectedDeviceObject, Protocol::V1),
            SELECTED_DEVICE_OBJECTS => (InboundEvent::SelectedDeviceObjects, Protocol::V1),
            SELECTED_FILTERS => (InboundEvent::SelectedFilters, Protocol::V1),
            IS_REAL_TIME_ACTIVE => (InboundEvent::IsRealTimeActive, Protocol::V1),

            V2_AUTH_TOKEN => (InboundEvent::ReceivedToken, Protocol::V2),
            V2_AUTH_JWT => (InboundEvent::ReceivedJwtToken, Protocol::V2),
            V2_DEVICES_SELECTED => (InboundEvent::SelectedDevices, Protocol::V2),
            V2_DATE_RANGE => (InboundEvent::SelectedDashboardDateRange, Protocol::V2),
            V2_DASHBOARD_SELF => (InboundEvent::SelectedDashboardObject, Protocol::V2),
            V2_FILTERS => (InboundEvent::SelectedFilters, Protocol::V2),
            V2_REAL_TIME => (InboundEvent::IsRealTimeActive, Protocol::V2),
            _ => return None,
        };
        Some(resolved)
    }
}

impl fmt::Display for InboundEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.v1_name())
    }
}

impl FromStr for InboundEvent {
    type Err = ProtocolError;

    /// Parses the V1 spelling, which is how ready events are configured.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        InboundEvent::ALL
            .into_iter()
            .find(|e| e.v1_name() == s)
            .ok_or_else(|| ProtocolError::UnknownEvent(s.to_string()))
    }
}

/// A command the widget sends to the host dashboard.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum OutboundCommand {
    SetDashboardDevice,
    SetDashboardMultipleDevices,
    SetDashboardDateRange,
    SetDashboardLayer,
    SetRealTime,
    RefreshDashboard,
    OpenDrawer,
    SetFullScreen,
}

impl OutboundCommand {
    pub fn v1_name(self) -> &'static str {
        match self {
            OutboundCommand::SetDashboardDevice => SET_DASHBOARD_DEVICE,
            OutboundCommand::SetDashboardMultipleDevices => SET_DASHBOARD_MULTIPLE_DEVICES,
            OutboundCommand::SetDashboardDateRange => SET_DASHBOARD_DATE_RANGE,
            OutboundCommand::SetDashboardLayer => SET_DASHBOARD_LAYER,
            OutboundCommand::SetRealTime => SET_REAL_TIME,
            OutboundCommand::RefreshDashboard => REFRESH_DASHBOARD,
            OutboundCommand::OpenDrawer => OPEN_DRAWER,
            OutboundCommand::SetFullScreen => SET_FULL_SCREEN,
        }
    }

    /// `None` means the host only understands the legacy spelling.
    pub fn v2_name(self) -> Option<&'static str> {
        match self {
            OutboundCommand::SetDashboardDevice | OutboundCommand::SetDashboardMultipleDevices => {
                Some(V2_DEVICES_SELECTED)
            }
            OutboundCommand::SetDashboardDateRange => Some(V2_DATE_RANGE),
            OutboundCommand::SetRealTime => Some(V2_REAL_TIME),
            OutboundCommand::RefreshDashboard => Some(V2_REFRESHED),
            OutboundCommand::OpenDrawer => Some(V2_DRAWER_OPEN),
            OutboundCommand::SetFullScreen => Some(V2_FULL_SCREEN),
            OutboundCommand::SetDashboardLayer => None,
        }
    }
}
