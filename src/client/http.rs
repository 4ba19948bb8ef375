//! reqwest-backed [`JsonSource`] for the platform backend.

use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderName, HeaderValue, ACCEPT, CONTENT_TYPE};
use serde_json::Value;
use tracing::{debug, warn};

use crate::client::JsonSource;
use crate::config::ClientConfig;
use crate::error::{FetchError, Result};
use crate::models::{envelope_message, unwrap_envelope};

/// Header carrying the CSRF token issued by the backend.
pub const CSRF_HEADER: &str = "x-csrf-token";

// == API Client ==
/// HTTP JSON client for the platform backend.
///
/// Every request carries the JSON content headers and, when configured, the
/// CSRF token. A cookie store keeps the same-origin session cookies between
/// requests. Cloning is cheap and shares the connection pool.
#[derive(Debug, Clone)]
pub struct ApiClient {
    base_url: String,
    http: reqwest::Client,
}

impl ApiClient {
    // == Constructor ==
    /// Builds a client from configuration.
    ///
    /// Fails only if the CSRF token is not a valid header value or the TLS
    /// backend cannot be initialised.
    pub fn new(config: &ClientConfig) -> Result<Self> {
        let mut headers = HeaderMap::new();
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
        headers.insert(ACCEPT, HeaderValue::from_static("application/json"));

        if let Some(token) = &config.csrf_token {
            let value = HeaderValue::from_str(token).map_err(|_| {
                FetchError::Config("CSRF token contains invalid header characters".to_string())
            })?;
            headers.insert(HeaderName::from_static(CSRF_HEADER), value);
        }

        let http = reqwest::Client::builder()
            .default_headers(headers)
            .cookie_store(true)
            .timeout(config.request_timeout)
            .build()
            .map_err(|e| FetchError::Config(e.to_string()))?;

        Ok(Self {
            base_url: config.base_url.clone(),
            http,
        })
    }

    /// Backend origin this client talks to.
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    // == URL Building ==
    /// Build a full URL from a path. Absolute URLs are passed through.
    pub fn build_url(&self, path: &str) -> String {
        if path.starts_with("http://") || path.starts_with("https://") {
            return path.to_string();
        }
        let base = self.base_url.trim_end_matches('/');
        let path = path.trim_start_matches('/');
        format!("{}/{}", base, path)
    }
}

// == JSON Source ==
#[async_trait]
impl JsonSource for ApiClient {
    async fn get_json(&self, path: &str) -> Result<Value> {
        let url = self.build_url(path);
        debug!("GET {}", url);

        let response = self.http.get(&url).send().await.map_err(|e| {
            warn!("GET {} - transport error: {}", url, e);
            FetchError::from(e)
        })?;

        let status = response.status();
        if !status.is_success() {
            // Error bodies are best effort: plain text or HTML leaves message empty
            let message = response
                .json::<Value>()
                .await
                .ok()
                .and_then(|body| envelope_message(&body));
            warn!("GET {} - status {}", url, status);
            return Err(FetchError::Http {
                status: status.as_u16(),
                message,
            });
        }

        let body: Value = response.json().await.map_err(FetchError::from)?;
        debug!("GET {} - success (status: {})", url, status);

        unwrap_envelope(body)
    }
}
