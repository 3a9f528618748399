//! Host window transport.
//!
//! This module provides the shared types and conditionally includes
//! the platform-specific implementation:
//! - Web: the embedding parent window via `postMessage` / `message` events
//! - Native: [`MemoryHost`], which records posts and lets callers inject
//!   inbound messages

use std::fmt;
use std::ops::Deref;
use std::rc::Rc;

use thiserror::Error;
use ubidots_widget_shared::{Envelope, InboundMessage};

mod memory;
pub use memory::MemoryHost;

#[cfg(target_arch = "wasm32")]
mod host_wasm;
#[cfg(target_arch = "wasm32")]
pub use host_wasm::ParentWindow;

/// Failure to hand a message to the host.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum HostError {
    #[error("failed to serialize envelope: {0}")]
    Serialize(String),
    #[error("no window available")]
    NoWindow,
    #[error("widget is not embedded in a parent window")]
    NoParent,
    #[error("postMessage failed: {0}")]
    Post(String),
}

/// Callback invoked for every raw message the host delivers.
pub type MessageHandler = Rc<dyn Fn(&InboundMessage)>;

/// The cross-document channel to the embedding dashboard.
pub trait HostWindow {
    /// Post one envelope to the host. Fire-and-forget: there is no
    /// acknowledgement channel.
    fn post(&self, envelope: &Envelope) -> Result<(), HostError>;

    /// Subscribe to raw inbound messages. The subscription lasts until the
    /// returned listener is dropped.
    fn listen(&self, handler: MessageHandler) -> MessageListener;
}

/// Guard for a [`HostWindow::listen`] registration. Dropping it detaches the
/// handler.
pub struct MessageListener {
    detach: Option<Box<dyn FnOnce()>>,
}

impl MessageListener {
    pub fn new(detach: impl FnOnce() + 'static) -> Self {
        Self {
            detach: Some(Box::new(detach)),
        }
    }

    /// A listener that was never attached (no window available).
    pub fn detached() -> Self {
        Self { detach: None }
    }

    pub fn is_attached(&self) -> bool {
        self.detach.is_some()
    }
}

impl Drop for MessageListener {
    fn drop(&mut self) {
        if let Some(detach) = self.detach.take() {
            detach();
        }
    }
}

impl fmt::Debug for MessageListener {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MessageListener")
            .field("attached", &self.is_attached())
            .finish()
    }
}

/// Shared, cheaply clonable handle to a host window.
#[derive(Clone)]
pub struct HostHandle(Rc<dyn HostWindow>);

impl HostHandle {
    pub fn new(host: impl HostWindow + 'static) -> Self {
        Self(Rc::new(host))
    }

    /// Post and log. Failures are reported to the console and swallowed so a
    /// missing parent window never breaks the widget.
    pub fn post_logged(&self, envelope: &Envelope) -> Result<(), HostError> {
        match self.0.post(envelope) {
            Ok(()) => {
                crate::log_debug!("posted {} to host", envelope.event);
                Ok(())
            }
            Err(e) => {
                crate::log_error!("failed to post {}: {}", envelope.event, e);
                Err(e)
            }
        }
    }
}

impl Deref for HostHandle {
    type Target = dyn HostWindow;

    fn deref(&self) -> &Self::Target {
        self.0.as_ref()
    }
}

impl PartialEq for HostHandle {
    fn eq(&self, other: &Self) -> bool {
        std::ptr::addr_eq(Rc::as_ptr(&self.0), Rc::as_ptr(&other.0))
    }
}

impl fmt::Debug for HostHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("HostHandle")
    }
}

impl From<MemoryHost> for HostHandle {
    fn from(host: MemoryHost) -> Self {
        HostHandle::new(host)
    }
}

/// The host a provider talks to when none is supplied.
#[cfg(target_arch = "wasm32")]
pub fn default_host() -> HostHandle {
    HostHandle::new(ParentWindow)
}

/// Native builds have no embedding page; messages go to an in-memory host.
#[cfg(not(target_arch = "wasm32"))]
pub fn default_host() -> HostHandle {
    HostHandle::new(MemoryHost::new())
}
