//! In-memory host window.
//!
//! Records every posted envelope and fans injected messages out to all
//! listeners, in registration order. Used for native builds and in tests.

use std::cell::{Cell, RefCell};
use std::rc::{Rc, Weak};

use serde_json::Value;
use ubidots_widget_shared::{Envelope, InboundMessage};

use super::{HostError, HostWindow, MessageHandler, MessageListener};

#[derive(Default)]
struct Inner {
    posted: RefCell<Vec<Envelope>>,
    listeners: RefCell<Vec<(u64, MessageHandler)>>,
    next_id: Cell<u64>,
}

#[derive(Clone, Default)]
pub struct MemoryHost {
    inner: Rc<Inner>,
}

impl MemoryHost {
    pub fn new() -> Self {
        Self::default()
    }

    /// Everything posted so far, oldest first.
    pub fn posted(&self) -> Vec<Envelope> {
        self.inner.posted.borrow().clone()
    }

    /// Drain the posted envelopes.
    pub fn take_posted(&self) -> Vec<Envelope> {
        std::mem::take(&mut *self.inner.posted.borrow_mut())
    }

    pub fn listener_count(&self) -> usize {
        self.inner.listeners.borrow().len()
    }

    /// Deliver a raw message from `origin` to every listener.
    pub fn deliver(&self, origin: &str, data: Value) {
        let message = InboundMessage::new(origin, data);
        // Snapshot so handlers may subscribe or unsubscribe while running.
        let handlers: Vec<MessageHandler> = self
            .inner
            .listeners
            .borrow()
            .iter()
            .map(|(_, h)| h.clone())
            .collect();
        for handler in handlers {
            handler(&message);
        }
    }

    /// Deliver `{event, payload}` from `origin`.
    pub fn deliver_event(&self, origin: &str, event: &str, payload: Value) {
        self.deliver(
            origin,
            serde_json::json!({ "event": event, "payload": payload }),
        );
    }
}

impl HostWindow for MemoryHost {
    fn post(&self, envelope: &Envelope) -> Result<(), HostError> {
        self.inner.posted.borrow_mut().push(envelope.clone());
        Ok(())
    }

    fn listen(&self, handler: MessageHandler) -> MessageListener {
        let id = self.inner.next_id.get();
        self.inner.next_id.set(id + 1);
        self.inner.listeners.borrow_mut().push((id, handler));

        let weak: Weak<Inner> = Rc::downgrade(&self.inner);
        MessageListener::new(move || {
            if let Some(inner) = weak.upgrade() {
                inner.listeners.borrow_mut().retain(|(lid, _)| *lid != id);
            }
        })
    }
}
