//! Messaging bridge between an embedded widget and its dashboard.
//!
//! This module provides:
//! - The per-provider engine: state, readiness and inbound routing
//! - Outbound commands, dual-emitted for legacy and V2 hosts
//! - Widget-scoped events so several widgets can share one page
//!
//! # Architecture
//!
//! ```text
//!              ┌─────────────────────────────┐
//!              │   Host window (dashboard)   │
//!              └─────────────────────────────┘
//!                  │ message          ▲ postMessage
//!                  ▼                  │
//!   ┌──────────────────────┐   ┌──────────────────┐
//!   │      BridgeCore      │   │  UbidotsActions  │
//!   │ router + reducer +   │──▶│  (dual emit)     │
//!   │ readiness gate       │   └──────────────────┘
//!   └──────────────────────┘            ▲
//!                  │                    │ WidgetIdRegistry
//!                  ▼                    ▼
//!   ┌──────────────────────┐   ┌──────────────────┐
//!   │  Signal<WidgetState> │   │   WidgetEvents   │
//!   │  (read by hooks)     │   │ v2:widget:<e>:<id>│
//!   └──────────────────────┘   └──────────────────┘
//! ```
//!
//! Nothing here depends on Dioxus; the provider wraps a [`BridgeCore`] and
//! mirrors its state into a signal. Tests drive the engine with a
//! [`MemoryHost`].
//!
//! ```rust,ignore
//! let host = MemoryHost::new();
//! let mut core = BridgeCore::new(BridgeConfig::default(), host.clone().into());
//! let _listener = host.listen(/* forward to core.handle_message */);
//! core.actions().set_real_time(true);
//! ```

mod actions;
mod config;
mod engine;
pub mod host;
mod widget_events;

pub use actions::{auth_headers, UbidotsActions, X_AUTH_TOKEN};
pub use config::{BridgeConfig, OriginCheck, WidgetIdRegistry};
pub use engine::{BridgeCore, Delivery};
pub use host::{default_host, HostError, HostHandle, HostWindow, MemoryHost, MessageListener};
pub use widget_events::{Subscription, WidgetEvents, WILDCARD};

#[cfg(target_arch = "wasm32")]
pub use host::ParentWindow;
