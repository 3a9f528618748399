use std::cell::RefCell;
use std::rc::Rc;

use dioxus::prelude::*;

use super::use_ubidots;
use crate::bridge::{MessageListener, WidgetEvents};
use crate::provider::UbidotsContext;

/// A manager and its host subscription, keyed by the override it was built for.
struct Bound {
    widget_id: Option<String>,
    events: WidgetEvents,
    _listener: MessageListener,
}

impl Bound {
    fn new(context: &UbidotsContext, widget_id: Option<String>) -> Self {
        let events = context.widget_events(widget_id.clone());
        let listener = events.listen();
        Self {
            widget_id,
            events,
            _listener: listener,
        }
    }
}

/// Widget-event manager for the calling component.
///
/// `widget_id` overrides the provider's identity. When the override changes
/// between renders the manager is rebuilt: subscriptions made on the previous
/// one stop receiving, and the new identity gets its own `ready`
/// announcement. Once the provider is ready and an id resolves, a `ready`
/// widget event is announced exactly once per manager.
pub fn use_widget_events(widget_id: Option<String>) -> WidgetEvents {
    let context = use_ubidots();
    let bound = use_hook(|| Rc::new(RefCell::new(Bound::new(&context, widget_id.clone()))));

    let stale = bound.borrow().widget_id != widget_id;
    if stale {
        crate::log_debug!("widget event override changed to {:?}", widget_id);
        *bound.borrow_mut() = Bound::new(&context, widget_id.clone());
    }
    let events = bound.borrow().events.clone();

    let state = context.state();
    let announcer = bound.clone();
    // Re-runs on any state change, so an id assigned after readiness still
    // gets its announcement.
    use_effect(use_reactive((&widget_id,), move |_| {
        let ready = state.read().ready;
        let events = announcer.borrow().events.clone();
        events.notify_ready(ready);
    }));

    events
}
