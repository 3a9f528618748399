//! Widget-scoped events: `v2:widget:<event>:<widgetId>`.
//!
//! Several widgets can share one dashboard page. Each emits under its own id
//! and may listen to everybody else's. This path runs next to the inbound
//! router on the same raw message channel and never touches bridge state.

use std::cell::{Cell, RefCell};
use std::collections::HashMap;
use std::fmt;
use std::rc::{Rc, Weak};

use serde_json::{json, Value};
use ubidots_widget_shared::{
    is_widget_event, widget_event_name, ActionError, Envelope, InboundMessage,
    WIDGET_READY_EVENT,
};

use super::config::{OriginCheck, WidgetIdRegistry};
use super::host::{HostHandle, MessageListener};

/// Pattern matching every widget event regardless of name or id.
pub const WILDCARD: &str = "*";

type PayloadCallback = Rc<dyn Fn(&Value)>;
type NamedCallback = Rc<dyn Fn(&str, &Value)>;

struct Inner {
    host: HostHandle,
    widget_id: Option<String>,
    registry: WidgetIdRegistry,
    origin_check: RefCell<OriginCheck>,
    listeners: RefCell<HashMap<String, Vec<(u64, PayloadCallback)>>>,
    any_listeners: RefCell<Vec<(u64, NamedCallback)>>,
    next_id: Cell<u64>,
    ready_emitted: Cell<bool>,
}

impl Inner {
    fn next_id(&self) -> u64 {
        let id = self.next_id.get();
        self.next_id.set(id + 1);
        id
    }
}

/// Emits and receives widget events for one widget.
///
/// Clones share subscriptions.
#[derive(Clone)]
pub struct WidgetEvents {
    inner: Rc<Inner>,
}

impl WidgetEvents {
    /// `widget_id` overrides whatever the registry holds.
    pub fn new(host: HostHandle, widget_id: Option<String>, registry: WidgetIdRegistry) -> Self {
        Self {
            inner: Rc::new(Inner {
                host,
                widget_id: widget_id.filter(|id| !id.is_empty()),
                registry,
                origin_check: RefCell::new(OriginCheck::any()),
                listeners: RefCell::new(HashMap::new()),
                any_listeners: RefCell::new(Vec::new()),
                next_id: Cell::new(0),
                ready_emitted: Cell::new(false),
            }),
        }
    }

    pub fn with_origin_check(self, check: OriginCheck) -> Self {
        *self.inner.origin_check.borrow_mut() = check;
        self
    }

    /// The id this manager emits under: its own, else the registered one.
    pub fn widget_id(&self) -> Option<String> {
        self.inner
            .widget_id
            .clone()
            .or_else(|| self.inner.registry.get())
    }

    /// Emit `event` under this widget's id.
    pub fn emit(&self, event: &str, payload: Option<Value>) -> Result<(), ActionError> {
        self.emit_as(None, event, payload)
    }

    /// Emit with an explicit id taking precedence over the resolved one.
    ///
    /// Without any resolvable id nothing is posted; a warning is logged and
    /// [`ActionError::MissingWidgetId`] returned.
    pub fn emit_as(
        &self,
        widget_id: Option<&str>,
        event: &str,
        payload: Option<Value>,
    ) -> Result<(), ActionError> {
        let Some(id) = widget_id
            .filter(|id| !id.is_empty())
            .map(str::to_string)
            .or_else(|| self.widget_id())
        else {
            crate::log_warn!("widget event {} not sent: widget id is not defined", event);
            return Err(ActionError::MissingWidgetId);
        };

        let envelope = Envelope::new(widget_event_name(event, &id), payload);
        self.inner
            .host
            .post_logged(&envelope)
            .map_err(|e| ActionError::Host(e.to_string()))
    }

    /// Subscribe to an exact wire name or to [`WILDCARD`].
    pub fn on(&self, pattern: impl Into<String>, callback: impl Fn(&Value) + 'static) -> Subscription {
        let pattern = pattern.into();
        let id = self.inner.next_id();
        self.inner
            .listeners
            .borrow_mut()
            .entry(pattern.clone())
            .or_default()
            .push((id, Rc::new(callback)));

        let weak = Rc::downgrade(&self.inner);
        Subscription::new(weak, move |inner| {
            let mut listeners = inner.listeners.borrow_mut();
            if let Some(entries) = listeners.get_mut(&pattern) {
                entries.retain(|(lid, _)| *lid != id);
                if entries.is_empty() {
                    listeners.remove(&pattern);
                }
            }
        })
    }

    /// Subscribe to every widget event, with its full wire name.
    pub fn on_any(&self, callback: impl Fn(&str, &Value) + 'static) -> Subscription {
        let id = self.inner.next_id();
        self.inner
            .any_listeners
            .borrow_mut()
            .push((id, Rc::new(callback)));

        let weak = Rc::downgrade(&self.inner);
        Subscription::new(weak, move |inner| {
            inner.any_listeners.borrow_mut().retain(|(lid, _)| *lid != id);
        })
    }

    pub fn subscription_count(&self) -> usize {
        let exact: usize = self.inner.listeners.borrow().values().map(Vec::len).sum();
        exact + self.inner.any_listeners.borrow().len()
    }

    /// Fan one raw inbound message out to matching subscribers.
    ///
    /// Returns the number of callbacks invoked.
    pub fn handle_message(&self, message: &InboundMessage) -> usize {
        if !self.inner.origin_check.borrow().allows(&message.origin) {
            return 0;
        }
        let Ok(envelope) = Envelope::from_value(&message.data) else {
            return 0;
        };
        if !is_widget_event(&envelope.event) {
            return 0;
        }
        let payload = envelope.payload_or_null();

        // Snapshot so callbacks may (un)subscribe while running.
        let exact: Vec<PayloadCallback> = {
            let listeners = self.inner.listeners.borrow();
            [envelope.event.as_str(), WILDCARD]
                .iter()
                .filter_map(|pattern| listeners.get(*pattern))
                .flatten()
                .map(|(_, cb)| cb.clone())
                .collect()
        };
        let any: Vec<NamedCallback> = self
            .inner
            .any_listeners
            .borrow()
            .iter()
            .map(|(_, cb)| cb.clone())
            .collect();

        for callback in &exact {
            callback(payload);
        }
        for callback in &any {
            callback(&envelope.event, payload);
        }
        exact.len() + any.len()
    }

    /// Emit the `ready` lifecycle event once the owning bridge is ready.
    ///
    /// Fires at most once per manager, and only when an id resolves. Returns
    /// `true` when the event was posted by this call.
    pub fn notify_ready(&self, ready: bool) -> bool {
        if !ready || self.inner.ready_emitted.get() {
            return false;
        }
        let Some(widget_id) = self.widget_id() else {
            return false;
        };
        let payload = json!({
            "widgetId": widget_id,
            "timestamp": chrono::Utc::now().timestamp_millis(),
        });
        if self.emit_as(Some(&widget_id), WIDGET_READY_EVENT, Some(payload)).is_ok() {
            self.inner.ready_emitted.set(true);
            crate::log_info!("widget {} announced ready", widget_id);
            return true;
        }
        false
    }

    /// Attach to the host's raw message channel.
    pub fn listen(&self) -> MessageListener {
        let weak: Weak<Inner> = Rc::downgrade(&self.inner);
        self.inner.host.listen(Rc::new(move |message| {
            if let Some(inner) = weak.upgrade() {
                WidgetEvents { inner }.handle_message(message);
            }
        }))
    }
}

impl fmt::Debug for WidgetEvents {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("WidgetEvents")
            .field("widget_id", &self.widget_id())
            .field("subscriptions", &self.subscription_count())
            .finish()
    }
}

impl PartialEq for WidgetEvents {
    fn eq(&self, other: &Self) -> bool {
        Rc::ptr_eq(&self.inner, &other.inner)
    }
}

/// Handle for one registration. Dropping it keeps the callback registered;
/// call [`Subscription::unsubscribe`] to remove it.
#[must_use = "keep the subscription to be able to unsubscribe"]
pub struct Subscription {
    remove: Box<dyn FnOnce()>,
}

impl Subscription {
    fn new(weak: Weak<Inner>, remove: impl FnOnce(&Inner) + 'static) -> Self {
        Self {
            remove: Box::new(move || {
                if let Some(inner) = weak.upgrade() {
                    remove(&inner);
                }
            }),
        }
    }

    /// Remove exactly this registration.
    pub fn unsubscribe(self) {
        (self.remove)();
    }
}

impl fmt::Debug for Subscription {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Subscription")
    }
}
