//! One-way readiness latch.
//!
//! ```text
//!   pending ──(all required events seen  OR  fallback(state))──▶ ready
//! ```
//!
//! Once ready, [`ReadinessGate::check`] is a no-op forever.

use std::collections::HashSet;

use serde::{Deserialize, Serialize};

use crate::events::{ReadyEvent, DEFAULT_READY_EVENTS};
use crate::models::WidgetState;

/// State-derived alternative to the event checklist.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum ReadyFallback {
    /// Ready once a credential, a selected device, a date range and a dashboard
    /// object are all present, whatever events delivered them.
    #[default]
    StateComplete,
    /// Only the configured ready events count.
    Disabled,
}

impl ReadyFallback {
    fn is_met(self, state: &WidgetState) -> bool {
        match self {
            ReadyFallback::StateComplete => state.has_complete_context(),
            ReadyFallback::Disabled => false,
        }
    }
}

/// Tracks observed inbound events for one provider instance.
#[derive(Debug, Clone)]
pub struct ReadinessGate {
    required: Vec<ReadyEvent>,
    fallback: ReadyFallback,
    satisfied: HashSet<ReadyEvent>,
    latched: bool,
}

impl Default for ReadinessGate {
    fn default() -> Self {
        Self::new(DEFAULT_READY_EVENTS.to_vec(), ReadyFallback::default())
    }
}

impl ReadinessGate {
    /// An empty `required` list is satisfied immediately.
    pub fn new(required: Vec<ReadyEvent>, fallback: ReadyFallback) -> Self {
        Self {
            required,
            fallback,
            satisfied: HashSet::new(),
            latched: false,
        }
    }

    /// Record that an event kind has been observed. The set never shrinks.
    pub fn mark(&mut self, event: ReadyEvent) {
        self.satisfied.insert(event);
    }

    pub fn has_seen(&self, event: ReadyEvent) -> bool {
        self.satisfied.contains(&event)
    }

    pub fn satisfied(&self) -> &HashSet<ReadyEvent> {
        &self.satisfied
    }

    pub fn required(&self) -> &[ReadyEvent] {
        &self.required
    }

    pub fn is_ready(&self) -> bool {
        self.latched
    }

    /// Evaluate the gate against `state`.
    ///
    /// Returns `true` exactly once: on the call that performs the pending ->
    /// ready transition. The caller then applies `SetReady(true)` and only
    /// afterwards runs its ready callback.
    pub fn check(&mut self, state: &WidgetState) -> bool {
        if self.latched {
            return false;
        }
        let all_seen = self.required.iter().all(|e| self.satisfied.contains(e));
        if all_seen || self.fallback.is_met(state) {
            self.latched = true;
            return true;
        }
        false
    }
}
