//! One hook per piece of widget state.

use dioxus::prelude::*;
use ubidots_widget_shared::{
    DashboardObject, DateRange, Device, DeviceObject, FilterValue, WidgetInfo, WidgetState,
};

use super::use_ubidots;
use crate::bridge::UbidotsActions;

fn select<T>(f: impl FnOnce(&WidgetState) -> T) -> T {
    let state = use_ubidots().state();
    let snapshot = state.read();
    f(&snapshot)
}

pub fn use_ubidots_ready() -> bool {
    select(|s| s.ready)
}

/// Plain API token sent by the dashboard.
pub fn use_ubidots_token() -> Option<String> {
    select(|s| s.token.clone())
}

pub fn use_ubidots_jwt() -> Option<String> {
    select(|s| s.jwt_token.clone())
}

pub fn use_ubidots_selected_device() -> Option<Device> {
    select(|s| s.selected_device.clone())
}

pub fn use_ubidots_selected_devices() -> Option<Vec<Device>> {
    select(|s| s.selected_devices.clone())
}

pub fn use_ubidots_dashboard_date_range() -> Option<DateRange> {
    select(|s| s.date_range.clone())
}

/// `None` until the dashboard reports its real-time setting.
pub fn use_ubidots_real_time_status() -> Option<bool> {
    select(|s| s.real_time)
}

pub fn use_ubidots_dashboard_object() -> Option<DashboardObject> {
    select(|s| s.dashboard_object.clone())
}

pub fn use_ubidots_device_object() -> Option<DeviceObject> {
    select(|s| s.device_object.clone())
}

pub fn use_ubidots_device_objects() -> Option<Vec<DeviceObject>> {
    select(|s| s.device_objects.clone())
}

pub fn use_ubidots_filters() -> Option<Vec<FilterValue>> {
    select(|s| s.filters.clone())
}

pub fn use_ubidots_widget() -> Option<WidgetInfo> {
    select(|s| s.widget.clone())
}

pub fn use_ubidots_widget_id() -> Option<String> {
    select(|s| s.widget_id.clone())
}

/// Outbound commands. Rebuilt whenever the credentials change so
/// `get_headers` always reflects the latest token.
pub fn use_ubidots_actions() -> UbidotsActions {
    use_ubidots().actions()
}
