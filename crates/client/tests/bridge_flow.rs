//! End-to-end flows through the bridge against an in-memory dashboard.

use std::cell::{Cell, RefCell};
use std::rc::Rc;

use pretty_assertions::assert_eq;
use serde_json::{json, Value};
use ubidots_widget_client::bridge::{
    BridgeConfig, BridgeCore, HostWindow, MemoryHost, OriginCheck, WILDCARD,
};
use ubidots_widget_client::shared::{
    parse_widget_event, DateRange, Device, Envelope, InboundEvent, ReadyFallback,
};

const DASHBOARD: &str = "https://industrial.ubidots.com";

/// A bridge wired to a host the way the provider wires it.
struct Harness {
    host: MemoryHost,
    core: Rc<RefCell<BridgeCore>>,
    ready_calls: Rc<Cell<u32>>,
    _listener: ubidots_widget_client::bridge::MessageListener,
}

impl Harness {
    fn new(config: BridgeConfig) -> Self {
        let host = MemoryHost::new();
        let core = Rc::new(RefCell::new(BridgeCore::new(config, host.clone().into())));
        let ready_calls = Rc::new(Cell::new(0));

        let handler_core = core.clone();
        let handler_calls = ready_calls.clone();
        let listener = host.listen(Rc::new(move |message| {
            let delivery = handler_core.borrow_mut().handle_message(message);
            if delivery.became_ready {
                assert!(handler_core.borrow().is_ready());
                handler_calls.set(handler_calls.get() + 1);
            }
        }));

        Self {
            host,
            core,
            ready_calls,
            _listener: listener,
        }
    }

    fn send(&self, event: &str, payload: Value) {
        self.host.deliver_event(DASHBOARD, event, payload);
    }
}

#[test]
fn legacy_dashboard_session() {
    let harness = Harness::new(
        BridgeConfig::new()
            .with_ready_events([InboundEvent::ReceivedToken, InboundEvent::SelectedDevice])
            .with_fallback(ReadyFallback::Disabled),
    );

    harness.send("selectedDevice", json!("d1"));
    assert!(!harness.core.borrow().is_ready());
    harness.send("receivedToken", json!("tok"));
    harness.send("selectedDashboardDateRange", json!({"startTime": 0, "endTime": 60000}));
    harness.send("isRealTimeActive", json!(false));

    assert_eq!(harness.ready_calls.get(), 1);
    let state = harness.core.borrow().state().clone();
    assert_eq!(state.selected_device, Some(Device::with_id("d1")));
    assert_eq!(state.date_range, Some(DateRange::new(0, 60000)));
    assert_eq!(state.real_time, Some(false));

    let reemitted: Vec<String> = harness.host.take_posted().into_iter().map(|e| e.event).collect();
    assert_eq!(
        reemitted,
        [
            "v2:dashboard:devices:selected",
            "v2:auth:token",
            "v2:dashboard:settings:daterange",
            "v2:dashboard:settings:rt",
        ]
    );
}

#[test]
fn device_object_events_are_never_reemitted() {
    let harness = Harness::new(BridgeConfig::default());
    harness.send("selectedDeviceObject", json!({"id": "obj", "label": "pump"}));
    harness.send("selectedDeviceObjects", json!([{"id": "a"}, {"id": "b"}]));

    let state = harness.core.borrow().state().clone();
    assert_eq!(state.device_object.and_then(|o| o.label).as_deref(), Some("pump"));
    assert_eq!(state.device_objects.map(|o| o.len()), Some(2));
    assert!(harness.host.posted().is_empty());
}

#[test]
fn untrusted_origin_cannot_make_the_widget_ready() {
    let harness = Harness::new(
        BridgeConfig::new().with_origin_check(OriginCheck::allow_list([DASHBOARD])),
    );
    harness
        .host
        .deliver("https://evil.example", json!({"event": "receivedToken", "payload": "x"}));

    assert_eq!(harness.ready_calls.get(), 0);
    assert_eq!(harness.core.borrow().state().token, None);

    harness.send("receivedToken", json!("real"));
    assert_eq!(harness.ready_calls.get(), 1);
}

#[test]
fn commands_reach_the_host_in_legacy_then_v2_order() {
    let harness = Harness::new(BridgeConfig::default());
    harness.send("receivedToken", json!("tok"));
    harness.host.take_posted();

    let actions = harness.core.borrow().actions();
    actions.set_dashboard_device("device-123");
    assert!(actions.set_dashboard_date_range(DateRange::new(2000, 1000)).is_err());
    actions.set_dashboard_layer("layer");

    assert_eq!(
        harness.host.posted(),
        vec![
            Envelope::new("setDashboardDevice", Some(json!("device-123"))),
            Envelope::new("v2:dashboard:devices:selected", Some(json!([{"id": "device-123"}]))),
            Envelope::new("setDashboardLayer", Some(json!("layer"))),
        ]
    );
    assert_eq!(
        actions
            .get_headers()
            .get("x-auth-token")
            .and_then(|v| v.to_str().ok()),
        Some("tok")
    );
}

#[test]
fn widget_event_round_trip() {
    let harness = Harness::new(BridgeConfig::new().with_widget_id("w1"));
    let events = harness.core.borrow().widget_events(None);
    let _listener = events.listen();

    let exact = Rc::new(RefCell::new(Vec::new()));
    let wildcard = Rc::new(RefCell::new(Vec::new()));
    let other = Rc::new(Cell::new(0));

    let sink = exact.clone();
    let _a = events.on("v2:widget:ready:w1", move |p| sink.borrow_mut().push(p.clone()));
    let sink = wildcard.clone();
    let _b = events.on(WILDCARD, move |p| sink.borrow_mut().push(p.clone()));
    let count = other.clone();
    let _c = events.on("v2:widget:clicked:w1", move |_| count.set(count.get() + 1));

    let payload = json!({"value": 42});
    events.emit("ready", Some(payload.clone())).unwrap();

    // The dashboard echoes widget events back to every widget on the page.
    let posted = harness.host.take_posted();
    assert_eq!(posted, vec![Envelope::new("v2:widget:ready:w1", Some(payload.clone()))]);
    for envelope in posted {
        harness
            .host
            .deliver(DASHBOARD, serde_json::to_value(envelope).unwrap());
    }

    assert_eq!(*exact.borrow(), vec![payload.clone()]);
    assert_eq!(*wildcard.borrow(), vec![payload]);
    assert_eq!(other.get(), 0);
    // Widget traffic never touches bridge state.
    assert_eq!(harness.core.borrow().state().token, None);
}

#[test]
fn widgets_sharing_a_page_see_each_other() {
    let host = MemoryHost::new();
    let chart = BridgeCore::new(BridgeConfig::new().with_widget_id("chart"), host.clone().into());
    let table = BridgeCore::new(BridgeConfig::new().with_widget_id("table"), host.clone().into());

    let chart_events = chart.widget_events(None);
    let table_events = table.widget_events(None);
    let _l1 = chart_events.listen();
    let _l2 = table_events.listen();

    let seen = Rc::new(RefCell::new(Vec::new()));
    let sink = seen.clone();
    let _monitor = table_events.on_any(move |name, _| {
        let parsed = parse_widget_event(name).unwrap();
        sink.borrow_mut().push((parsed.widget_id, parsed.event));
    });

    chart_events.emit("zoom:changed", Some(json!(2))).unwrap();
    for envelope in host.take_posted() {
        host.deliver(DASHBOARD, serde_json::to_value(envelope).unwrap());
    }

    assert_eq!(
        *seen.borrow(),
        vec![("chart".to_string(), "zoom:changed".to_string())]
    );
}

#[test]
fn ready_announcement_follows_bridge_readiness() {
    let harness = Harness::new(BridgeConfig::default());
    let events = harness.core.borrow().widget_events(None);

    harness.send("receivedToken", json!("tok"));
    harness.host.take_posted();
    assert!(!events.notify_ready(harness.core.borrow().is_ready()));

    harness.core.borrow_mut().set_widget_id(Some("late".into()));
    assert!(events.notify_ready(harness.core.borrow().is_ready()));
    assert!(!events.notify_ready(true));

    let posted = harness.host.posted();
    assert_eq!(posted.len(), 1);
    assert_eq!(posted[0].event, "v2:widget:ready:late");
    assert_eq!(posted[0].payload_or_null()["widgetId"], json!("late"));
}
