//! Provider state reducer.

use serde::{Deserialize, Serialize};

use crate::models::{
    DashboardObject, DateRange, Device, DeviceObject, FilterValue, WidgetInfo, WidgetState,
};

/// A state transition. Each variant replaces exactly one field.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "payload", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Action {
    ReceivedToken(Option<String>),
    ReceivedJwtToken(Option<String>),
    SelectedDevice(Option<Device>),
    SelectedDevices(Option<Vec<Device>>),
    SelectedDashboardDateRange(Option<DateRange>),
    SelectedDashboardObject(Option<DashboardObject>),
    SelectedDeviceObject(Option<DeviceObject>),
    SelectedDeviceObjects(Option<Vec<DeviceObject>>),
    SelectedFilters(Option<Vec<FilterValue>>),
    RealTimeStatus(Option<bool>),
    SetReady(bool),
    SetWidget(Option<WidgetInfo>),
    SetWidgetId(Option<String>),
}

impl Action {
    /// True when the action sets its field to `None`.
    pub fn clears_field(&self) -> bool {
        match self {
            Action::ReceivedToken(v) | Action::ReceivedJwtToken(v) | Action::SetWidgetId(v) => {
                v.is_none()
            }
            Action::SelectedDevice(v) => v.is_none(),
            Action::SelectedDevices(v) => v.is_none(),
            Action::SelectedDashboardDateRange(v) => v.is_none(),
            Action::SelectedDashboardObject(v) => v.is_none(),
            Action::SelectedDeviceObject(v) => v.is_none(),
            Action::SelectedDeviceObjects(v) => v.is_none(),
            Action::SelectedFilters(v) => v.is_none(),
            Action::RealTimeStatus(v) => v.is_none(),
            Action::SetWidget(v) => v.is_none(),
            Action::SetReady(_) => false,
        }
    }
}

/// Apply `action` to `state`, returning the next snapshot.
///
/// Pure: no validation, no side effects. Validation happens in the router and
/// in outbound commands.
pub fn reduce(state: &WidgetState, action: Action) -> WidgetState {
    let mut next = state.clone();
    match action {
        Action::ReceivedToken(token) => next.token = token,
        Action::ReceivedJwtToken(jwt) => next.jwt_token = jwt,
        Action::SelectedDevice(device) => next.selected_device = device,
        Action::SelectedDevices(devices) => next.selected_devices = devices,
        Action::SelectedDashboardDateRange(range) => next.date_range = range,
        Action::SelectedDashboardObject(dashboard) => next.dashboard_object = dashboard,
        Action::SelectedDeviceObject(device) => next.device_object = device,
        Action::SelectedDeviceObjects(devices) => next.device_objects = devices,
        Action::SelectedFilters(filters) => next.filters = filters,
        Action::RealTimeStatus(rt) => next.real_time = rt,
        Action::SetReady(ready) => next.ready = ready,
        Action::SetWidget(widget) => next.widget = widget,
        Action::SetWidgetId(id) => next.widget_id = id,
    }
    next
}
