//! Configuration accepted by the bridge at construction.

use std::cell::RefCell;
use std::fmt;
use std::rc::Rc;

use ubidots_widget_shared::{ReadyEvent, ReadyFallback, WidgetState, DEFAULT_READY_EVENTS};

/// Predicate deciding whether a message origin is trusted.
#[derive(Clone, Default)]
pub struct OriginCheck(Option<Rc<dyn Fn(&str) -> bool>>);

impl OriginCheck {
    /// Accept every origin.
    pub fn any() -> Self {
        Self(None)
    }

    pub fn new(predicate: impl Fn(&str) -> bool + 'static) -> Self {
        Self(Some(Rc::new(predicate)))
    }

    /// Accept only the listed origins (exact match, e.g. `https://app.ubidots.com`).
    pub fn allow_list<I, S>(origins: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let allowed: Vec<String> = origins.into_iter().map(Into::into).collect();
        Self::new(move |origin| allowed.iter().any(|o| o == origin))
    }

    pub fn allows(&self, origin: &str) -> bool {
        self.0.as_ref().map_or(true, |check| check(origin))
    }
}

impl fmt::Debug for OriginCheck {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.0 {
            Some(_) => f.write_str("OriginCheck(custom)"),
            None => f.write_str("OriginCheck(any)"),
        }
    }
}

/// The widget identity shared by the dispatcher and the widget-event manager.
///
/// Injected into both at construction; last write wins.
#[derive(Clone, Default, Debug)]
pub struct WidgetIdRegistry(Rc<RefCell<Option<String>>>);

impl WidgetIdRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self) -> Option<String> {
        self.0.borrow().clone()
    }

    /// Empty strings clear the registration.
    pub fn set(&self, widget_id: Option<String>) {
        *self.0.borrow_mut() = widget_id.filter(|id| !id.is_empty());
    }
}

/// Everything a provider is configured with.
#[derive(Debug, Clone)]
pub struct BridgeConfig {
    /// Inbound events that must all be seen before the widget is ready.
    pub ready_events: Vec<ReadyEvent>,
    /// State-based alternative to `ready_events`.
    pub fallback: ReadyFallback,
    pub origin_check: OriginCheck,
    /// Starting state; fields left at their defaults stay null.
    pub initial_state: WidgetState,
    /// Externally assigned widget identity.
    pub widget_id: Option<String>,
}

impl Default for BridgeConfig {
    fn default() -> Self {
        Self {
            ready_events: DEFAULT_READY_EVENTS.to_vec(),
            fallback: ReadyFallback::default(),
            origin_check: OriginCheck::any(),
            initial_state: WidgetState::default(),
            widget_id: None,
        }
    }
}

impl BridgeConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_ready_events(mut self, events: impl IntoIterator<Item = ReadyEvent>) -> Self {
        self.ready_events = events.into_iter().collect();
        self
    }

    pub fn with_fallback(mut self, fallback: ReadyFallback) -> Self {
        self.fallback = fallback;
        self
    }

    pub fn with_origin_check(mut self, check: OriginCheck) -> Self {
        self.origin_check = check;
        self
    }

    pub fn with_initial_state(mut self, state: WidgetState) -> Self {
        self.initial_state = state;
        self
    }

    pub fn with_widget_id(mut self, widget_id: impl Into<String>) -> Self {
        self.widget_id = Some(widget_id.into());
        self
    }
}
