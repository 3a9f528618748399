//! WASM/Web-specific host window using `window.parent.postMessage`.

use serde_json::Value;
use ubidots_widget_shared::{Envelope, InboundMessage};
use wasm_bindgen::prelude::*;
use wasm_bindgen::JsCast;
use web_sys::MessageEvent;

use super::{HostError, HostWindow, MessageHandler, MessageListener};

/// The dashboard page embedding this widget's iframe.
#[derive(Debug, Clone, Copy, Default)]
pub struct ParentWindow;

impl HostWindow for ParentWindow {
    fn post(&self, envelope: &Envelope) -> Result<(), HostError> {
        let window = web_sys::window().ok_or(HostError::NoWindow)?;
        let parent = window
            .parent()
            .map_err(|e| HostError::Post(format!("{:?}", e)))?
            .ok_or(HostError::NoParent)?;

        let json = serde_json::to_string(envelope).map_err(|e| HostError::Serialize(e.to_string()))?;
        let message = js_sys::JSON::parse(&json).map_err(|e| HostError::Serialize(format!("{:?}", e)))?;

        parent
            .post_message(&message, "*")
            .map_err(|e| HostError::Post(format!("{:?}", e)))
    }

    fn listen(&self, handler: MessageHandler) -> MessageListener {
        let Some(window) = web_sys::window() else {
            crate::log_warn!("no window; inbound host messages will not be received");
            return MessageListener::detached();
        };

        let onmessage_callback = Closure::wrap(Box::new(move |e: MessageEvent| {
            let data = message_data(&e.data());
            handler(&InboundMessage::new(e.origin(), data));
        }) as Box<dyn FnMut(MessageEvent)>);

        if let Err(e) = window
            .add_event_listener_with_callback("message", onmessage_callback.as_ref().unchecked_ref())
        {
            crate::log_error!("failed to attach message listener: {:?}", e);
            return MessageListener::detached();
        }

        MessageListener::new(move || {
            let _ = window.remove_event_listener_with_callback(
                "message",
                onmessage_callback.as_ref().unchecked_ref(),
            );
        })
    }
}

/// Convert structured-clone message data into JSON. Data that cannot be
/// represented (functions, cyclic objects) becomes `null` and is ignored later.
fn message_data(data: &JsValue) -> Value {
    js_sys::JSON::stringify(data)
        .ok()
        .map(String::from)
        .and_then(|text| serde_json::from_str(&text).ok())
        .unwrap_or(Value::Null)
}
