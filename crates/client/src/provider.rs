//! The composition root: one bridge per provider instance.

use std::cell::RefCell;
use std::rc::Rc;

use dioxus::prelude::*;
use ubidots_widget_shared::{Action, InboundMessage, ReadyEvent, ReadyFallback, WidgetState};

use crate::bridge::{
    default_host, BridgeConfig, BridgeCore, Delivery, HostHandle, OriginCheck, UbidotsActions,
    WidgetEvents, WidgetIdRegistry,
};

/// Context provided to every descendant of [`UbidotsProvider`].
///
/// The bridge owns the authoritative state; `state` mirrors it for rendering.
#[derive(Clone)]
pub struct UbidotsContext {
    state: Signal<WidgetState>,
    core: Rc<RefCell<BridgeCore>>,
    on_ready: Option<EventHandler<()>>,
}

impl UbidotsContext {
    fn new(core: BridgeCore, on_ready: Option<EventHandler<()>>) -> Self {
        Self {
            state: Signal::new(core.state().clone()),
            core: Rc::new(RefCell::new(core)),
            on_ready,
        }
    }

    /// Reactive state handle. Reading it subscribes the calling component.
    pub fn state(&self) -> Signal<WidgetState> {
        self.state
    }

    pub fn is_ready(&self) -> bool {
        self.state.read().ready
    }

    /// Commands bound to the credentials currently in state.
    pub fn actions(&self) -> UbidotsActions {
        let state = self.state.read();
        let core = self.core.borrow();
        UbidotsActions::new(
            core.host().clone(),
            core.registry().clone(),
            state.token.clone(),
            state.jwt_token.clone(),
        )
    }

    pub fn host(&self) -> HostHandle {
        self.core.borrow().host().clone()
    }

    pub fn registry(&self) -> WidgetIdRegistry {
        self.core.borrow().registry().clone()
    }

    /// Feed one raw host message through the bridge.
    pub fn deliver(&self, message: &InboundMessage) -> Delivery {
        let delivery = self.core.borrow_mut().handle_message(message);
        self.publish(delivery.changed_state(), delivery.became_ready);
        delivery
    }

    /// Apply a local action (e.g. from a test harness or a settings panel).
    pub fn dispatch(&self, action: Action) {
        let became_ready = self.core.borrow_mut().dispatch(action);
        self.publish(true, became_ready);
    }

    /// Re-evaluate readiness against the current state.
    pub fn check_ready(&self) -> bool {
        let became_ready = self.core.borrow_mut().check_ready();
        self.publish(became_ready, became_ready);
        became_ready
    }

    pub fn set_widget_id(&self, widget_id: Option<String>) {
        let became_ready = self.core.borrow_mut().set_widget_id(widget_id);
        self.publish(true, became_ready);
    }

    /// A widget-event manager sharing this provider's host and identity.
    pub fn widget_events(&self, widget_id: Option<String>) -> WidgetEvents {
        self.core.borrow().widget_events(widget_id)
    }

    /// Copy the bridge state into the signal, then fire `on_ready` so the
    /// callback already sees `ready == true`.
    fn publish(&self, changed: bool, became_ready: bool) {
        if changed {
            let snapshot = self.core.borrow().state().clone();
            let mut state = self.state;
            if *state.peek() != snapshot {
                state.set(snapshot);
            }
        }
        if became_ready {
            if let Some(on_ready) = &self.on_ready {
                on_ready.call(());
            }
        }
    }
}

/// Connects its subtree to the embedding dashboard.
///
/// Listens for host messages for as long as it is mounted. All props are
/// read once at mount, except `widget_id` which is re-applied on change.
///
/// - `on_ready` fires once, when the widget first becomes ready
/// - `ready_events` must all arrive before that (default: the API token)
/// - `validate_origin` returns `false` to drop messages from an origin
/// - `host` defaults to the parent window on web
#[component]
pub fn UbidotsProvider(
    children: Element,
    on_ready: Option<EventHandler<()>>,
    ready_events: Option<Vec<ReadyEvent>>,
    #[props(default)] fallback: ReadyFallback,
    validate_origin: Option<Callback<String, bool>>,
    initial_state: Option<WidgetState>,
    widget_id: Option<String>,
    host: Option<HostHandle>,
) -> Element {
    let context = use_hook(|| {
        let mut config = BridgeConfig::new().with_fallback(fallback);
        if let Some(events) = ready_events.clone() {
            config = config.with_ready_events(events);
        }
        if let Some(validate) = validate_origin {
            config = config.with_origin_check(OriginCheck::new(move |origin| {
                validate.call(origin.to_string())
            }));
        }
        if let Some(state) = initial_state.clone() {
            config = config.with_initial_state(state);
        }
        if let Some(id) = widget_id.clone() {
            config = config.with_widget_id(id);
        }
        let host = host.clone().unwrap_or_else(default_host);
        UbidotsContext::new(BridgeCore::new(config, host), on_ready)
    });

    use_context_provider(|| context.clone());

    // Detached when the provider unmounts and the hook value is dropped.
    let listening = context.clone();
    use_hook(move || {
        let handler = listening.clone();
        let listener = listening
            .host()
            .listen(Rc::new(move |message: &InboundMessage| {
                handler.deliver(message);
            }));
        Rc::new(listener)
    });

    // Initial state may already satisfy the fallback.
    let initial = context.clone();
    use_effect(move || {
        initial.check_ready();
    });

    let identity = context.clone();
    use_effect(use_reactive((&widget_id,), move |(widget_id,)| {
        if widget_id.is_some() && identity.registry().get() != widget_id {
            identity.set_widget_id(widget_id);
        }
    }));

    children
}
