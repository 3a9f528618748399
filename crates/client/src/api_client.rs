//! HTTP client for the Ubidots REST API, authenticated with the dashboard's
//! credentials.

use reqwest::header::HeaderMap;
use reqwest::Client;
use serde::de::DeserializeOwned;
use serde::Serialize;
use ubidots_widget_shared::ApiError;
use url::Url;

use crate::bridge::auth_headers;

/// Default Ubidots API endpoint.
pub const DEFAULT_API_BASE: &str = "https://industrial.api.ubidots.com";

/// HTTP client sending the widget's auth headers with every request.
#[derive(Debug, Clone)]
pub struct ApiClient {
    client: Client,
    base_url: String,
    headers: HeaderMap,
}

impl ApiClient {
    /// Create a client for [`DEFAULT_API_BASE`] with no credentials.
    pub fn new() -> Self {
        Self {
            client: Client::new(),
            base_url: DEFAULT_API_BASE.to_string(),
            headers: auth_headers(None, None),
        }
    }

    /// Client carrying the headers `get_headers` would produce.
    pub fn from_credentials(jwt_token: Option<&str>, token: Option<&str>) -> Self {
        Self::new().with_headers(auth_headers(jwt_token, token))
    }

    /// Point at another Ubidots deployment. Must be an absolute http(s) URL.
    pub fn with_base_url(mut self, base_url: impl AsRef<str>) -> Result<Self, ApiError> {
        let raw = base_url.as_ref();
        let parsed = Url::parse(raw).map_err(|e| ApiError::InvalidUrl(format!("{raw}: {e}")))?;
        if !matches!(parsed.scheme(), "http" | "https") {
            return Err(ApiError::InvalidUrl(format!("{raw}: unsupported scheme")));
        }
        self.base_url = raw.trim_end_matches('/').to_string();
        Ok(self)
    }

    pub fn with_headers(mut self, headers: HeaderMap) -> Self {
        self.headers = headers;
        self
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn headers(&self) -> &HeaderMap {
        &self.headers
    }

    /// Whether any credential header is present.
    pub fn is_authenticated(&self) -> bool {
        self.headers.contains_key(reqwest::header::AUTHORIZATION)
            || self.headers.contains_key(crate::bridge::X_AUTH_TOKEN)
    }

    /// Resolve `path` against the base URL. Absolute URLs pass through.
    pub fn url(&self, path: &str) -> String {
        if path.starts_with("http://") || path.starts_with("https://") {
            return path.to_string();
        }
        let path = path.trim_start_matches('/');
        format!("{}/{path}", self.base_url)
    }

    async fn read_json<TRes: DeserializeOwned>(resp: reqwest::Response) -> Result<TRes, ApiError> {
        let status = resp.status().as_u16();
        let is_success = resp.status().is_success();
        let text = resp
            .text()
            .await
            .map_err(|e| ApiError::Network(format!("failed to read body: {e}")))?;

        if !is_success {
            return Err(ApiError::Http { status, body: text });
        }

        let text = if text.is_empty() { "null" } else { text.as_str() };
        serde_json::from_str(text).map_err(|e| ApiError::Deserialize(e.to_string()))
    }

    /// GET and decode a JSON response.
    pub async fn get_json<TRes: DeserializeOwned>(&self, path: &str) -> Result<TRes, ApiError> {
        let resp = self
            .client
            .get(self.url(path))
            .headers(self.headers.clone())
            .send()
            .await
            .map_err(|e| ApiError::Network(e.to_string()))?;
        Self::read_json(resp).await
    }

    /// POST a JSON body and decode the JSON response.
    pub async fn post_json<TReq: Serialize, TRes: DeserializeOwned>(
        &self,
        path: &str,
        body: &TReq,
    ) -> Result<TRes, ApiError> {
        let body_bytes =
            serde_json::to_vec(body).map_err(|e| ApiError::Deserialize(e.to_string()))?;
        let resp = self
            .client
            .post(self.url(path))
            .headers(self.headers.clone())
            .body(body_bytes)
            .send()
            .await
            .map_err(|e| ApiError::Network(e.to_string()))?;
        Self::read_json(resp).await
    }

    pub async fn delete(&self, path: &str) -> Result<(), ApiError> {
        let resp = self
            .client
            .delete(self.url(path))
            .headers(self.headers.clone())
            .send()
            .await
            .map_err(|e| ApiError::Network(e.to_string()))?;

        let status = resp.status().as_u16();
        if !resp.status().is_success() {
            let body = resp.text().await.unwrap_or_default();
            return Err(ApiError::Http { status, body });
        }
        Ok(())
    }
}

impl Default for ApiClient {
    fn default() -> Self {
        Self::new()
    }
}

/// Two clients are equal when they would send the same requests.
impl PartialEq for ApiClient {
    fn eq(&self, other: &Self) -> bool {
        self.base_url == other.base_url && self.headers == other.headers
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn url_joins_paths_onto_the_base() {
        let client = ApiClient::new();
        assert_eq!(
            client.url("/api/v2.0/devices/"),
            "https://industrial.api.ubidots.com/api/v2.0/devices/"
        );
        assert_eq!(
            client.url("api/v1.6/variables"),
            "https://industrial.api.ubidots.com/api/v1.6/variables"
        );
        assert_eq!(client.url("https://other.host/x"), "https://other.host/x");
    }

    #[test]
    fn base_url_must_be_http() {
        let client = ApiClient::new().with_base_url("https://my.ubidots.example/").unwrap();
        assert_eq!(client.base_url(), "https://my.ubidots.example");
        assert!(matches!(
            ApiClient::new().with_base_url("not a url"),
            Err(ApiError::InvalidUrl(_))
        ));
        assert!(matches!(
            ApiClient::new().with_base_url("ftp://files.example"),
            Err(ApiError::InvalidUrl(_))
        ));
    }

    #[test]
    fn credentials_change_equality() {
        let anonymous = ApiClient::new();
        let with_token = ApiClient::from_credentials(None, Some("tok"));
        let with_jwt = ApiClient::from_credentials(Some("jwt"), Some("tok"));

        assert!(!anonymous.is_authenticated());
        assert!(with_token.is_authenticated());
        assert!(with_jwt.is_authenticated());
        assert_ne!(with_token, with_jwt);
        assert_eq!(with_token, ApiClient::from_credentials(Some(""), Some("tok")));
    }
}
