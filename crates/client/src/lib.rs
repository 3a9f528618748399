//! Ubidots widget client - Dioxus binding for dashboard widgets
//!
//! This crate connects a widget running inside a Ubidots dashboard iframe to
//! its host page: it tracks what the dashboard has told the widget, decides
//! when the widget is ready, sends commands back, and namespaces events
//! between several widgets on the same page.
//!
//! ```rust,ignore
//! #[component]
//! fn App() -> Element {
//!     rsx! {
//!         UbidotsProvider {
//!             ready_events: vec![InboundEvent::ReceivedToken, InboundEvent::SelectedDevice],
//!             on_ready: move |_| log_info!("ready"),
//!             DeviceLabel {}
//!         }
//!     }
//! }
//!
//! #[component]
//! fn DeviceLabel() -> Element {
//!     let device = use_ubidots_selected_device();
//!     let actions = use_ubidots_actions();
//!     rsx! {
//!         button { onclick: move |_| actions.refresh_dashboard(), "Refresh" }
//!         span { {device.map(|d| d.id).unwrap_or_default()} }
//!     }
//! }
//! ```

pub mod logging;

pub mod api_client;
pub mod bridge;
pub mod components;
pub mod hooks;
pub mod provider;

pub use api_client::{ApiClient, DEFAULT_API_BASE};
pub use bridge::{
    auth_headers, BridgeConfig, BridgeCore, HostHandle, MemoryHost, OriginCheck, Subscription,
    UbidotsActions, WidgetEvents,
};
pub use components::{WithSelectedDevice, WithUbidotsActions};
pub use hooks::*;
pub use provider::{UbidotsContext, UbidotsProvider};

pub use ubidots_widget_shared as shared;
pub use ubidots_widget_shared::{
    Action, DateRange, Device, DrawerOptions, FullScreenSetting, InboundEvent, ReadyEvent,
    ReadyFallback, WidgetState,
};
