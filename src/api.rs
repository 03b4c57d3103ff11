// API client module: a small blocking HTTP client that talks to the hosted
// URL-shortening service. Every call is one round trip and never returns
// an error to the caller: failures become an `ErrorPayload` value so the
// command layer always has something to print.

use anyhow::{Context, Result};
use reqwest::blocking::{Client, RequestBuilder};
use reqwest::header::{HeaderMap, HeaderValue, ACCEPT, CONTENT_TYPE};
use reqwest::{Method, Url};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Production endpoint of the shortening service.
pub const DEFAULT_BASE_URL: &str = "https://api.manyapis.com/";

/// Header carrying the configured API key.
pub const HEADER_API_KEY: &str = "x-api-key";

/// Message returned for every transport, status or decoding failure.
pub const GENERIC_ERROR: &str = "An error has occurred";

const ROUTE_CREATE: &str = "v1-create-short-url";
const ROUTE_GET: &str = "v1-get-short-url";
const ROUTE_DELETE: &str = "v1-delete-short-url";
const ROUTE_UPDATE: &str = "v1-update-short-url";

/// Blocking client holding the reqwest client, the service base URL and
/// the API key attached to every request.
#[derive(Clone)]
pub struct ApiClient {
    client: Client,
    base_url: Url,
    api_key: Option<String>,
}

/// Payload used to create a short link.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct ShortenRequest {
    pub url: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub expiry: Option<String>,
}

/// Payload used to change the expiry of an existing short link.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct UpdateRequest {
    pub sid: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub expiry: Option<String>,
}

/// Link record returned by the create, get and update routes. Expiry
/// fields are null for links created with `never`. Fields this client does
/// not know about are kept in `extra` and printed back unchanged.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct ShortLink {
    pub url: String,
    pub short_url: String,
    pub sid: String,
    pub expiry: Option<String>,
    pub expire_at: Option<String>,
    pub created_at: Option<String>,
    pub updated_at: Option<String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct DeleteResponse {
    pub is_deleted: bool,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct ErrorPayload {
    pub message: String,
}

impl ErrorPayload {
    pub fn generic() -> Self {
        Self {
            message: GENERIC_ERROR.to_string(),
        }
    }
}

/// Outcome of an API call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ApiReply<T> {
    Data(T),
    Error(ErrorPayload),
    /// No API key is configured; nothing was sent.
    MissingCredential,
}

impl ApiClient {
    /// Create a client for `base_url`. A base without a trailing slash
    /// gets one so routes are joined under it rather than replacing its
    /// last segment.
    pub fn new(mut base_url: Url, api_key: Option<String>) -> Result<Self> {
        if !base_url.path().ends_with('/') {
            let path = format!("{}/", base_url.path());
            base_url.set_path(&path);
        }

        let mut headers = HeaderMap::new();
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
        headers.insert(ACCEPT, HeaderValue::from_static("application/json"));
        let client = Client::builder()
            .default_headers(headers)
            .build()
            .context("Failed to build HTTP client")?;

        Ok(ApiClient {
            client,
            base_url,
            api_key: api_key.filter(|key| !key.trim().is_empty()),
        })
    }

    /// Returns whether an API key is available for requests.
    pub fn has_api_key(&self) -> bool {
        self.api_key.is_some()
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    /// POST `v1-create-short-url` with the URL and optional expiry.
    pub fn shorten_url(&self, req: &ShortenRequest) -> ApiReply<ShortLink> {
        self.call(Method::POST, ROUTE_CREATE, |builder| builder.json(req))
    }

    /// GET `v1-get-short-url?sid=<sid>`.
    pub fn get_short_url(&self, sid: &str) -> ApiReply<ShortLink> {
        self.call(Method::GET, ROUTE_GET, |builder| builder.query(&[("sid", sid)]))
    }

    /// POST `v1-delete-short-url?sid=<sid>`.
    pub fn delete_url(&self, sid: &str) -> ApiReply<DeleteResponse> {
        self.call(Method::POST, ROUTE_DELETE, |builder| {
            builder.query(&[("sid", sid)])
        })
    }

    /// PUT `v1-update-short-url` with the sid and new expiry.
    pub fn update_url(&self, req: &UpdateRequest) -> ApiReply<ShortLink> {
        self.call(Method::PUT, ROUTE_UPDATE, |builder| builder.json(req))
    }

    fn call<T, F>(&self, method: Method, route: &str, build: F) -> ApiReply<T>
    where
        T: DeserializeOwned,
        F: FnOnce(RequestBuilder) -> RequestBuilder,
    {
        let Some(api_key) = self.api_key.as_deref() else {
            tracing::debug!(route, "no API key configured, request skipped");
            return ApiReply::MissingCredential;
        };

        match self.send(method, route, api_key, build) {
            Ok(data) => ApiReply::Data(data),
            Err(err) => {
                tracing::debug!(route, error = %format!("{err:#}"), "request failed");
                ApiReply::Error(ErrorPayload::generic())
            }
        }
    }

    fn send<T, F>(&self, method: Method, route: &str, api_key: &str, build: F) -> Result<T>
    where
        T: DeserializeOwned,
        F: FnOnce(RequestBuilder) -> RequestBuilder,
    {
        let url = self
            .base_url
            .join(route)
            .with_context(|| format!("Failed to build URL for {route}"))?;
        let key = HeaderValue::from_str(api_key).context("API key is not a valid header value")?;

        tracing::debug!(%method, %url, "sending request");
        let res = build(self.client.request(method, url))
            .header(HEADER_API_KEY, key)
            .send()
            .with_context(|| format!("Failed to send {route} request"))?;
        if !res.status().is_success() {
            let status = res.status();
            let txt = res.text().unwrap_or_else(|_| "".into());
            anyhow::bail!("{route} failed: {} - {}", status, txt);
        }
        res.json()
            .with_context(|| format!("Parsing {route} response json"))
    }
}
