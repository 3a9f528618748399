//! The per-provider bridge: state, readiness and inbound handling.

use ubidots_widget_shared::{
    reduce, route, Action, Envelope, InboundEvent, InboundMessage, ReadinessGate, WidgetState,
};

use super::actions::UbidotsActions;
use super::config::{BridgeConfig, OriginCheck, WidgetIdRegistry};
use super::host::HostHandle;
use super::widget_events::WidgetEvents;

/// What happened to one inbound message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Delivery {
    /// Dropped by the origin check before anything else ran.
    pub rejected: bool,
    /// The concept the message was routed to, if its name was recognized.
    pub routed: Option<InboundEvent>,
    /// The payload did not decode and the field was stored as `None`.
    pub normalized: bool,
    /// This message completed the readiness gate.
    pub became_ready: bool,
}

impl Delivery {
    /// Whether the state snapshot may have changed.
    pub fn changed_state(&self) -> bool {
        self.routed.is_some() || self.became_ready
    }
}

/// Owns everything scoped to one provider instance.
///
/// Single-threaded: inbound messages, dispatches and readiness checks are
/// serialized by the platform's event loop.
pub struct BridgeCore {
    state: WidgetState,
    gate: ReadinessGate,
    origin_check: OriginCheck,
    host: HostHandle,
    registry: WidgetIdRegistry,
}

impl BridgeCore {
    pub fn new(config: BridgeConfig, host: HostHandle) -> Self {
        let BridgeConfig {
            ready_events,
            fallback,
            origin_check,
            mut initial_state,
            widget_id,
        } = config;

        if widget_id.is_some() {
            initial_state.widget_id = widget_id;
        }
        let registry = WidgetIdRegistry::new();
        registry.set(initial_state.widget_id.clone());

        Self {
            state: initial_state,
            gate: ReadinessGate::new(ready_events, fallback),
            origin_check,
            host,
            registry,
        }
    }

    pub fn state(&self) -> &WidgetState {
        &self.state
    }

    pub fn is_ready(&self) -> bool {
        self.state.ready
    }

    pub fn gate(&self) -> &ReadinessGate {
        &self.gate
    }

    pub fn host(&self) -> &HostHandle {
        &self.host
    }

    pub fn registry(&self) -> &WidgetIdRegistry {
        &self.registry
    }

    pub fn origin_check(&self) -> &OriginCheck {
        &self.origin_check
    }

    /// Apply an action and re-evaluate readiness.
    ///
    /// Returns `true` if this call made the widget ready.
    pub fn dispatch(&mut self, action: Action) -> bool {
        self.state = reduce(&self.state, action);
        self.check_ready()
    }

    /// Run the readiness gate against the current state.
    ///
    /// On the transition the state is updated before this returns, so any
    /// ready callback the caller runs afterwards observes `ready == true`.
    pub fn check_ready(&mut self) -> bool {
        if !self.gate.check(&self.state) {
            return false;
        }
        self.state = reduce(&self.state, Action::SetReady(true));
        crate::log_info!("widget ready (seen: {:?})", self.gate.satisfied());
        true
    }

    /// Process a raw message from the host.
    ///
    /// Messages from rejected origins are dropped silently, readiness
    /// bookkeeping included. Data without an `event` name is ignored.
    pub fn handle_message(&mut self, message: &InboundMessage) -> Delivery {
        if !self.origin_check.allows(&message.origin) {
            return Delivery {
                rejected: true,
                ..Delivery::default()
            };
        }
        match Envelope::from_value(&message.data) {
            Ok(envelope) => self.handle_envelope(&envelope),
            Err(_) => Delivery::default(),
        }
    }

    /// Route an already-decoded envelope.
    pub fn handle_envelope(&mut self, envelope: &Envelope) -> Delivery {
        let mut delivery = Delivery::default();

        if let Some(routed) = route(&envelope.event, envelope.payload_or_null()) {
            crate::log_debug!("inbound {} -> {}", envelope.event, routed.event);
            if routed.normalized {
                crate::log_debug!(
                    "{} payload did not decode, stored as null: {}",
                    envelope.event,
                    envelope.payload_or_null()
                );
            }
            delivery.normalized = routed.normalized;
            self.state = reduce(&self.state, routed.action);
            self.gate.mark(routed.event);
            if let Some(v2) = &routed.reemit {
                let _ = self.host.post_logged(v2);
            }
            delivery.routed = Some(routed.event);
        }

        delivery.became_ready = self.check_ready();
        delivery
    }

    /// Assign the widget identity, in state and in the shared registry.
    pub fn set_widget_id(&mut self, widget_id: Option<String>) -> bool {
        self.registry.set(widget_id.clone());
        self.dispatch(Action::SetWidgetId(widget_id))
    }

    /// Outbound commands bound to the current credentials.
    pub fn actions(&self) -> UbidotsActions {
        UbidotsActions::new(
            self.host.clone(),
            self.registry.clone(),
            self.state.token.clone(),
            self.state.jwt_token.clone(),
        )
    }

    /// A widget-event manager sharing this bridge's host and identity.
    pub fn widget_events(&self, widget_id: Option<String>) -> WidgetEvents {
        WidgetEvents::new(self.host.clone(), widget_id, self.registry.clone())
            .with_origin_check(self.origin_check.clone())
    }
}
