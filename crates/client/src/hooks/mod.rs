//! Hooks for components below an [`UbidotsProvider`](crate::UbidotsProvider).
//!
//! Every hook reads the provider's state signal, so the calling component
//! re-renders when the value it asked for may have changed.

mod api;
mod selections;
mod widget_events;

use dioxus::prelude::*;

use crate::provider::UbidotsContext;

pub use api::use_ubidots_api;
pub use selections::*;
pub use widget_events::use_widget_events;

/// The provider context, if there is one above the caller.
pub fn try_use_ubidots() -> Option<UbidotsContext> {
    try_use_context::<UbidotsContext>()
}

/// The provider context.
///
/// # Panics
/// When called outside an `UbidotsProvider`.
pub fn use_ubidots() -> UbidotsContext {
    match try_use_ubidots() {
        Some(context) => context,
        None => panic!("use_ubidots must be used within UbidotsProvider"),
    }
}
