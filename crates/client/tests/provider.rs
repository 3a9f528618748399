//! The provider mounted in a headless virtual DOM against an in-memory dashboard.

use std::cell::{Cell, RefCell};
use std::rc::Rc;
use std::time::Duration;

use dioxus::dioxus_core::NoOpMutations;
use dioxus::prelude::*;
use pretty_assertions::assert_eq;
use serde_json::json;
use ubidots_widget_client::bridge::{HostHandle, MemoryHost};
use ubidots_widget_client::shared::{DashboardObject, DateRange, Device, DrawerOptions};
use ubidots_widget_client::{
    use_ubidots, use_widget_events, InboundEvent, ReadyEvent, UbidotsContext, UbidotsProvider,
    WidgetEvents, WidgetState,
};

const DASHBOARD: &str = "https://industrial.ubidots.com";

/// Props the root hands to the provider and the widget on every render.
#[derive(Clone, Default)]
struct Setup {
    widget_id: Option<String>,
    events_override: Option<String>,
    ready_events: Option<Vec<ReadyEvent>>,
    initial_state: Option<WidgetState>,
}

/// Shared between the test body and the mounted components.
#[derive(Clone, Default)]
struct Fixture {
    host: MemoryHost,
    setup: Rc<RefCell<Setup>>,
    /// `is_ready()` as observed from inside each `on_ready` call.
    ready_seen: Rc<RefCell<Vec<bool>>>,
    context: Rc<RefCell<Option<UbidotsContext>>>,
    events: Rc<RefCell<Option<WidgetEvents>>>,
    revision: Rc<Cell<Option<Signal<u32>>>>,
}

impl Fixture {
    fn new(setup: Setup) -> Self {
        Self {
            setup: Rc::new(RefCell::new(setup)),
            ..Default::default()
        }
    }

    fn context(&self) -> UbidotsContext {
        self.context.borrow().clone().expect("widget rendered")
    }

    fn announcements(&self) -> Vec<String> {
        self.host
            .posted()
            .into_iter()
            .map(|e| e.event)
            .filter(|event| event.starts_with("v2:widget:ready:"))
            .collect()
    }
}

fn app(fixture: Fixture) -> Element {
    use_context_provider(|| fixture.clone());
    let revision = use_signal(|| 0u32);
    use_hook(|| fixture.revision.set(Some(revision)));
    let _ = *revision.read();

    let setup = fixture.setup.borrow().clone();
    let ready_seen = fixture.ready_seen.clone();
    let slot = fixture.context.clone();

    rsx! {
        UbidotsProvider {
            host: HostHandle::from(fixture.host.clone()),
            widget_id: setup.widget_id,
            ready_events: setup.ready_events,
            initial_state: setup.initial_state,
            on_ready: move |_| {
                let ready = slot.borrow().as_ref().is_some_and(|c| c.is_ready());
                ready_seen.borrow_mut().push(ready);
            },
            Widget {}
        }
    }
}

#[allow(non_snake_case)]
fn Widget() -> Element {
    let fixture = use_context::<Fixture>();
    if let Some(revision) = fixture.revision.get() {
        let _ = *revision.read();
    }
    let events_override = fixture.setup.borrow().events_override.clone();
    let context = use_ubidots();
    let events = use_widget_events(events_override);

    *fixture.context.borrow_mut() = Some(context);
    *fixture.events.borrow_mut() = Some(events);
    rsx! { div {} }
}

/// Let renders and effects run until the DOM goes quiet.
async fn settle(dom: &mut VirtualDom) {
    for _ in 0..4 {
        tokio::select! {
            _ = dom.wait_for_work() => {}
            _ = tokio::time::sleep(Duration::from_millis(20)) => {}
        }
        dom.render_immediate(&mut NoOpMutations);
    }
}

async fn mount(fixture: &Fixture) -> VirtualDom {
    let mut dom = VirtualDom::new_with_props(app, fixture.clone());
    dom.rebuild_in_place();
    settle(&mut dom).await;
    dom
}

/// Re-render the root with the current [`Setup`].
async fn rerender(dom: &mut VirtualDom, fixture: &Fixture) {
    let revision = fixture.revision.get().expect("root rendered");
    dom.in_scope(ScopeId::APP, || {
        let mut revision = revision;
        *revision.write() += 1;
    });
    settle(dom).await;
}

async fn send(dom: &mut VirtualDom, fixture: &Fixture, event: &str, payload: serde_json::Value) {
    dom.in_scope(ScopeId::APP, || fixture.host.deliver_event(DASHBOARD, event, payload.clone()));
    settle(dom).await;
}

#[tokio::test]
async fn repeated_token_fires_on_ready_once() {
    let fixture = Fixture::new(Setup {
        widget_id: Some("w1".into()),
        ..Default::default()
    });
    let mut dom = mount(&fixture).await;
    assert!(fixture.ready_seen.borrow().is_empty());
    assert!(fixture.announcements().is_empty());

    send(&mut dom, &fixture, "receivedToken", json!("tok")).await;
    send(&mut dom, &fixture, "receivedToken", json!("tok2")).await;

    assert_eq!(*fixture.ready_seen.borrow(), vec![true]);
    assert_eq!(fixture.announcements(), vec!["v2:widget:ready:w1"]);
    let token = dom.in_scope(ScopeId::APP, || fixture.context().state().read().token.clone());
    assert_eq!(token.as_deref(), Some("tok2"));
}

#[tokio::test]
async fn initial_state_can_make_the_provider_ready() {
    let fixture = Fixture::new(Setup {
        widget_id: Some("panel".into()),
        ready_events: Some(vec![InboundEvent::ReceivedJwtToken]),
        initial_state: Some(WidgetState {
            token: Some("tok".into()),
            selected_device: Some(Device::with_id("d1")),
            date_range: Some(DateRange::new(0, 60_000)),
            dashboard_object: Some(DashboardObject::default()),
            ..Default::default()
        }),
        ..Default::default()
    });
    let mut dom = mount(&fixture).await;

    assert_eq!(*fixture.ready_seen.borrow(), vec![true]);
    assert!(dom.in_scope(ScopeId::APP, || fixture.context().is_ready()));
    assert_eq!(fixture.announcements(), vec!["v2:widget:ready:panel"]);

    // Nothing further happens once latched.
    send(&mut dom, &fixture, "receivedJWTToken", json!("jwt")).await;
    assert_eq!(fixture.ready_seen.borrow().len(), 1);
}

#[tokio::test]
async fn widget_id_prop_change_reaches_state_and_registry() {
    let fixture = Fixture::new(Setup {
        widget_id: Some("w1".into()),
        ..Default::default()
    });
    let mut dom = mount(&fixture).await;
    assert_eq!(fixture.context().registry().get().as_deref(), Some("w1"));

    fixture.setup.borrow_mut().widget_id = Some("w2".into());
    rerender(&mut dom, &fixture).await;

    let context = fixture.context();
    assert_eq!(context.registry().get().as_deref(), Some("w2"));
    let in_state = dom.in_scope(ScopeId::APP, || context.state().read().widget_id.clone());
    assert_eq!(in_state.as_deref(), Some("w2"));

    // Commands pick up the new identity without remounting.
    dom.in_scope(ScopeId::APP, || {
        context.actions().open_drawer(DrawerOptions {
            url: "https://example.com/details".into(),
            width: 400,
        });
    });
    let drawer = fixture
        .host
        .posted()
        .into_iter()
        .find(|e| e.event == "openDrawer")
        .expect("drawer posted");
    assert_eq!(drawer.payload_or_null()["id"], json!("w2"));
}

#[tokio::test]
async fn widget_event_override_change_rebuilds_the_manager() {
    let fixture = Fixture::new(Setup {
        events_override: Some("left".into()),
        ..Default::default()
    });
    let mut dom = mount(&fixture).await;
    send(&mut dom, &fixture, "receivedToken", json!("tok")).await;
    assert_eq!(fixture.announcements(), vec!["v2:widget:ready:left"]);
    let listeners = fixture.host.listener_count();

    fixture.setup.borrow_mut().events_override = Some("right".into());
    rerender(&mut dom, &fixture).await;

    let events = fixture.events.borrow().clone().expect("widget rendered");
    assert_eq!(events.widget_id().as_deref(), Some("right"));
    assert_eq!(
        fixture.announcements(),
        vec!["v2:widget:ready:left", "v2:widget:ready:right"]
    );
    // The previous manager's host listener is released.
    assert_eq!(fixture.host.listener_count(), listeners);
}
