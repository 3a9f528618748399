use dioxus::prelude::*;

use super::use_ubidots;
use crate::api_client::ApiClient;

/// REST client authenticated with whatever credentials the dashboard sent.
pub fn use_ubidots_api() -> ApiClient {
    let state = use_ubidots().state();
    let client = use_memo(move || {
        let snapshot = state.read();
        ApiClient::from_credentials(snapshot.jwt_token.as_deref(), snapshot.token.as_deref())
    });
    client.cloned()
}
