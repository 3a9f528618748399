//! Render-prop components for code that prefers wrapping over hooks.

use dioxus::prelude::*;
use ubidots_widget_shared::Device;

use crate::bridge::UbidotsActions;
use crate::hooks::{use_ubidots_actions, use_ubidots_selected_device};

/// Renders `render` with the dashboard's currently selected device.
///
/// ```rust,ignore
/// rsx! {
///     WithSelectedDevice {
///         render: move |device: Option<Device>| rsx! {
///             span { {device.map(|d| d.id).unwrap_or_default()} }
///         }
///     }
/// }
/// ```
#[component]
pub fn WithSelectedDevice(render: Callback<Option<Device>, Element>) -> Element {
    let device = use_ubidots_selected_device();
    render.call(device)
}

/// Renders `render` with the outbound command set.
#[component]
pub fn WithUbidotsActions(render: Callback<UbidotsActions, Element>) -> Element {
    let actions = use_ubidots_actions();
    render.call(actions)
}
