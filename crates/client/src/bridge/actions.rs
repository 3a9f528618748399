//! Outbound commands sent from the widget to the host dashboard.
//!
//! Commands with a V2 equivalent are dual-emitted: the V1 message first, then
//! the V2 message, as two separate posts in the same call.

use reqwest::header::{HeaderMap, HeaderName, HeaderValue, AUTHORIZATION, CONTENT_TYPE};
use serde::Serialize;
use serde_json::{json, Value};
use ubidots_widget_shared::{
    ActionError, DateRange, DrawerOptions, Envelope, FullScreenSetting, OutboundCommand,
};

use super::config::WidgetIdRegistry;
use super::host::HostHandle;

/// Header carrying a plain Ubidots API token.
pub const X_AUTH_TOKEN: &str = "x-auth-token";

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct DrawerRequest<'a> {
    drawer_info: &'a DrawerOptions,
    #[serde(skip_serializing_if = "Option::is_none")]
    id: Option<String>,
}

/// Command set handed to components.
#[derive(Clone, Debug)]
pub struct UbidotsActions {
    host: HostHandle,
    registry: WidgetIdRegistry,
    token: Option<String>,
    jwt_token: Option<String>,
}

impl UbidotsActions {
    pub fn new(
        host: HostHandle,
        registry: WidgetIdRegistry,
        token: Option<String>,
        jwt_token: Option<String>,
    ) -> Self {
        Self {
            host,
            registry,
            token,
            jwt_token,
        }
    }

    fn post(&self, event: &str, payload: Option<Value>) {
        let _ = self.host.post_logged(&Envelope::new(event, payload));
    }

    /// V1 then V2 (when the command has a V2 name).
    fn post_both(&self, command: OutboundCommand, v1: Option<Value>, v2: Option<Value>) {
        self.post(command.v1_name(), v1);
        if let Some(v2_name) = command.v2_name() {
            self.post(v2_name, v2);
        }
    }

    /// Select one device. V2 receives it as a one-element device list.
    pub fn set_dashboard_device(&self, device_id: &str) {
        self.post_both(
            OutboundCommand::SetDashboardDevice,
            Some(json!(device_id)),
            Some(json!([{ "id": device_id }])),
        );
    }

    /// Select several devices. V1 receives the raw ids, V2 `{id}` records.
    pub fn set_dashboard_multiple_devices<S: AsRef<str>>(&self, device_ids: &[S]) {
        let ids: Vec<&str> = device_ids.iter().map(|id| id.as_ref()).collect();
        let devices: Vec<Value> = ids.iter().map(|id| json!({ "id": id })).collect();
        self.post_both(
            OutboundCommand::SetDashboardMultipleDevices,
            Some(json!(ids)),
            Some(Value::Array(devices)),
        );
    }

    /// Change the dashboard time window.
    ///
    /// Nothing is sent unless `start_time < end_time`; the rejection is logged
    /// and returned.
    pub fn set_dashboard_date_range(&self, range: DateRange) -> Result<(), ActionError> {
        if let Err(e) = range.validate() {
            crate::log_warn!("setDashboardDateRange not sent: {}", e);
            return Err(e);
        }
        let payload = json!(range);
        self.post_both(
            OutboundCommand::SetDashboardDateRange,
            Some(payload.clone()),
            Some(payload),
        );
        Ok(())
    }

    /// Untyped variant of [`Self::set_dashboard_date_range`] for payloads built
    /// at runtime. Non-objects and non-numeric bounds are rejected too.
    pub fn set_dashboard_date_range_value(&self, payload: &Value) -> Result<(), ActionError> {
        match DateRange::from_value(payload) {
            Ok(range) => self.set_dashboard_date_range(range),
            Err(e) => {
                crate::log_warn!("setDashboardDateRange not sent: {}", e);
                Err(e)
            }
        }
    }

    /// Switch dashboard layer. Legacy only: the host has no V2 name for it.
    pub fn set_dashboard_layer(&self, layer_id: &str) {
        self.post_both(OutboundCommand::SetDashboardLayer, Some(json!(layer_id)), None);
    }

    pub fn set_real_time(&self, real_time: bool) {
        self.post_both(
            OutboundCommand::SetRealTime,
            Some(json!(real_time)),
            Some(json!(real_time)),
        );
    }

    pub fn refresh_dashboard(&self) {
        self.post_both(OutboundCommand::RefreshDashboard, None, None);
    }

    /// Open the dashboard side drawer.
    ///
    /// The widget id is read from the registry now, not when these actions
    /// were created.
    pub fn open_drawer(&self, options: DrawerOptions) {
        let request = DrawerRequest {
            drawer_info: &options,
            id: self.registry.get(),
        };
        let payload = serde_json::to_value(&request).ok();
        self.post_both(OutboundCommand::OpenDrawer, payload.clone(), payload);
    }

    pub fn set_full_screen(&self, setting: FullScreenSetting) {
        let payload = json!(setting);
        self.post_both(
            OutboundCommand::SetFullScreen,
            Some(payload.clone()),
            Some(payload),
        );
    }

    /// Request headers for the Ubidots REST API.
    pub fn get_headers(&self) -> HeaderMap {
        auth_headers(self.jwt_token.as_deref(), self.token.as_deref())
    }
}

/// Build API headers from the held credentials.
///
/// A JWT wins over a plain token. Empty credentials count as absent. The
/// content type is always set.
pub fn auth_headers(jwt_token: Option<&str>, token: Option<&str>) -> HeaderMap {
    let mut headers = HeaderMap::new();
    headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));

    if let Some(jwt) = jwt_token.filter(|t| !t.is_empty()) {
        match HeaderValue::from_str(&format!("Bearer {jwt}")) {
            Ok(value) => {
                headers.insert(AUTHORIZATION, value);
                return headers;
            }
            Err(_) => crate::log_warn!("JWT contains invalid header characters; ignoring it"),
        }
    }

    if let Some(token) = token.filter(|t| !t.is_empty()) {
        match HeaderValue::from_str(token) {
            Ok(value) => {
                headers.insert(HeaderName::from_static(X_AUTH_TOKEN), value);
            }
            Err(_) => crate::log_warn!("token contains invalid header characters; ignoring it"),
        }
    }

    headers
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bridge::host::MemoryHost;
    use pretty_assertions::assert_eq;

    fn actions() -> (UbidotsActions, MemoryHost, WidgetIdRegistry) {
        let host = MemoryHost::new();
        let registry = WidgetIdRegistry::new();
        let actions = UbidotsActions::new(
            host.clone().into(),
            registry.clone(),
            Some("token".into()),
            None,
        );
        (actions, host, registry)
    }

    fn header<'a>(headers: &'a HeaderMap, name: &str) -> Option<&'a str> {
        headers.get(name).and_then(|v| v.to_str().ok())
    }

    fn env(event: &str, payload: Value) -> Envelope {
        Envelope::new(event, Some(payload))
    }

    #[test]
    fn set_dashboard_device_bridges_to_device_list() {
        let (actions, host, _) = actions();
        actions.set_dashboard_device("device-123");
        assert_eq!(
            host.posted(),
            vec![
                env("setDashboardDevice", json!("device-123")),
                env("v2:dashboard:devices:selected", json!([{"id": "device-123"}])),
            ]
        );
    }

    #[test]
    fn set_dashboard_multiple_devices_wraps_each_id() {
        let (actions, host, _) = actions();
        actions.set_dashboard_multiple_devices(&["dev1", "dev2", "dev3"]);
        assert_eq!(
            host.posted(),
            vec![
                env("setDashboardMultipleDevices", json!(["dev1", "dev2", "dev3"])),
                env(
                    "v2:dashboard:devices:selected",
                    json!([{"id": "dev1"}, {"id": "dev2"}, {"id": "dev3"}])
                ),
            ]
        );
    }

    #[test]
    fn valid_date_range_is_sent_twice_with_identical_payload() {
        let (actions, host, _) = actions();
        assert!(actions.set_dashboard_date_range(DateRange::new(1000, 2000)).is_ok());
        let payload = json!({"startTime": 1000, "endTime": 2000});
        assert_eq!(
            host.posted(),
            vec![
                env("setDashboardDateRange", payload.clone()),
                env("v2:dashboard:settings:daterange", payload),
            ]
        );
    }

    #[test]
    fn inverted_date_range_sends_nothing() {
        let (actions, host, _) = actions();
        assert_eq!(
            actions.set_dashboard_date_range(DateRange::new(2000, 1000)),
            Err(ActionError::InvalidDateRange {
                start_time: 2000.into(),
                end_time: 1000.into()
            })
        );
        assert!(actions.set_dashboard_date_range_value(&Value::Null).is_err());
        assert!(actions
            .set_dashboard_date_range_value(&json!({"startTime": "a", "endTime": 2}))
            .is_err());
        assert!(host.posted().is_empty());
    }

    #[test]
    fn set_dashboard_layer_is_legacy_only() {
        let (actions, host, _) = actions();
        actions.set_dashboard_layer("layer-1");
        assert_eq!(host.posted(), vec![env("setDashboardLayer", json!("layer-1"))]);
    }

    #[test]
    fn refresh_has_no_payload() {
        let (actions, host, _) = actions();
        actions.refresh_dashboard();
        assert_eq!(
            host.posted(),
            vec![
                Envelope::new("refreshDashboard", None),
                Envelope::new("v2:dashboard:settings:refreshed", None),
            ]
        );
    }

    #[test]
    fn real_time_and_full_screen_are_dual_emitted() {
        let (actions, host, _) = actions();
        actions.set_real_time(false);
        actions.set_full_screen(FullScreenSetting::Toggle);
        assert_eq!(
            host.posted(),
            vec![
                env("setRealTime", json!(false)),
                env("v2:dashboard:settings:rt", json!(false)),
                env("setFullScreen", json!("toggle")),
                env("v2:dashboard:settings:fullscreen", json!("toggle")),
            ]
        );
    }

    #[test]
    fn open_drawer_reads_widget_id_at_call_time() {
        let (actions, host, registry) = actions();
        let options = DrawerOptions {
            url: "https://example.com".into(),
            width: 400,
        };

        actions.open_drawer(options.clone());
        registry.set(Some("custom-widget-id".into()));
        actions.open_drawer(options);

        let without_id = json!({"drawerInfo": {"url": "https://example.com", "width": 400}});
        let with_id = json!({
            "drawerInfo": {"url": "https://example.com", "width": 400},
            "id": "custom-widget-id"
        });
        assert_eq!(
            host.posted(),
            vec![
                env("openDrawer", without_id.clone()),
                env("v2:dashboard:drawer:open", without_id),
                env("openDrawer", with_id.clone()),
                env("v2:dashboard:drawer:open", with_id),
            ]
        );
    }

    #[test]
    fn headers_prefer_jwt_over_token() {
        let headers = auth_headers(Some("X"), Some("Y"));
        assert_eq!(header(&headers, "authorization"), Some("Bearer X"));
        assert_eq!(header(&headers, X_AUTH_TOKEN), None);
        assert_eq!(header(&headers, "content-type"), Some("application/json"));
    }

    #[test]
    fn headers_fall_back_to_plain_token() {
        let headers = auth_headers(None, Some("Y"));
        assert_eq!(header(&headers, X_AUTH_TOKEN), Some("Y"));
        assert_eq!(header(&headers, "authorization"), None);

        let headers = auth_headers(Some(""), Some("Y"));
        assert_eq!(header(&headers, X_AUTH_TOKEN), Some("Y"));
    }

    #[test]
    fn headers_without_credentials_only_set_content_type() {
        let headers = auth_headers(None, None);
        assert_eq!(headers.len(), 1);
        assert_eq!(header(&headers, "content-type"), Some("application/json"));
    }

    #[test]
    fn get_headers_uses_bound_credentials() {
        let (actions, _, _) = actions();
        assert_eq!(header(&actions.get_headers(), X_AUTH_TOKEN), Some("token"));
    }
}
