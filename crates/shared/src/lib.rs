//! Shared protocol types for Ubidots dashboard widgets.
//!
//! Platform-independent: event taxonomy, wire envelope, state model, reducer,
//! inbound routing and the readiness gate. The Dioxus binding lives in
//! `ubidots-widget-client`.

pub mod error;
pub mod events;
pub mod models;
pub mod protocol;
pub mod readiness;
pub mod router;
pub mod store;

pub use error::*;
pub use events::{
    InboundEvent, OutboundCommand, Protocol, ReadyEvent, DEFAULT_READY_EVENTS, WIDGET_EVENT_PREFIX,
    WIDGET_READY_EVENT,
};
pub use models::*;
pub use protocol::*;
pub use readiness::{ReadinessGate, ReadyFallback};
pub use router::{normalize_selected_device, route, Routed};
pub use store::{reduce, Action};
