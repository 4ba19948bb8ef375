//! Configuration Module
//!
//! Handles loading and managing client configuration from environment variables.

use std::env;
use std::str::FromStr;
use std::time::Duration;

use crate::search::SearchOptions;
use crate::tasks::PollOptions;

/// Settings for the HTTP client talking to the platform backend.
///
/// The CSRF token is injected here once at startup instead of being looked
/// up at every call site.
#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// Origin of the backend, e.g. `https://example.com`
    pub base_url: String,
    /// Token sent in the `X-CSRF-TOKEN` header, if any
    pub csrf_token: Option<String>,
    /// Per-request timeout
    pub request_timeout: Duration,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:8000".to_string(),
            csrf_token: None,
            request_timeout: Duration::from_secs(10),
        }
    }
}

/// Application configuration parameters.
///
/// All values can be configured via environment variables with sensible defaults.
#[derive(Debug, Clone)]
pub struct Config {
    /// HTTP client settings
    pub client: ClientConfig,
    /// Maximum number of entries each response cache can hold
    pub cache_max_entries: usize,
    /// Default TTL for cached responses
    pub cache_ttl: Duration,
    /// Interval between expired-entry sweeps
    pub cleanup_interval: Duration,
    /// Path of the trade-directory search endpoint
    pub search_endpoint: String,
    /// Quiet period before a search request fires
    pub search_debounce: Duration,
    /// Results per search page
    pub search_page_size: usize,
    /// Optional query the binary runs once at startup
    pub search_query: Option<String>,
    /// Endpoint polled for notification/message badge counts
    pub poll_url: String,
    /// Badge poll period
    pub poll_interval: Duration,
    /// Minimum age before the badge data is considered stale
    pub poll_stale_time: Duration,
}

impl Config {
    /// Creates a new Config by loading values from environment variables.
    ///
    /// # Environment Variables
    /// - `API_BASE_URL` - Backend origin (default: http://localhost:8000)
    /// - `CSRF_TOKEN` - CSRF token header value (default: unset)
    /// - `REQUEST_TIMEOUT_SECS` - Request timeout (default: 10)
    /// - `CACHE_MAX_ENTRIES` - Cache capacity (default: 100)
    /// - `CACHE_TTL_SECS` - Default TTL in seconds (default: 300)
    /// - `CLEANUP_INTERVAL_SECS` - Cleanup frequency in seconds (default: 60)
    /// - `SEARCH_ENDPOINT` - Search path (default: /api/search)
    /// - `SEARCH_DEBOUNCE_MS` - Debounce window in ms (default: 300)
    /// - `SEARCH_PAGE_SIZE` - Results per page (default: 12)
    /// - `SEARCH_QUERY` - Query to run at startup (default: unset)
    /// - `POLL_URL` - Badge endpoint (default: /api/notifications/unread-count)
    /// - `POLL_INTERVAL_SECS` - Poll period (default: 30)
    /// - `POLL_STALE_TIME_SECS` - Stale-time guard (default: 10)
    pub fn from_env() -> Self {
        let defaults = Self::default();

        Self {
            client: ClientConfig {
                base_url: env::var("API_BASE_URL").unwrap_or(defaults.client.base_url),
                csrf_token: non_empty_var("CSRF_TOKEN"),
                request_timeout: Duration::from_secs(parse_var("REQUEST_TIMEOUT_SECS", 10)),
            },
            cache_max_entries: parse_var("CACHE_MAX_ENTRIES", defaults.cache_max_entries),
            cache_ttl: Duration::from_secs(parse_var("CACHE_TTL_SECS", 300)),
            cleanup_interval: Duration::from_secs(parse_var("CLEANUP_INTERVAL_SECS", 60)),
            search_endpoint: env::var("SEARCH_ENDPOINT").unwrap_or(defaults.search_endpoint),
            search_debounce: Duration::from_millis(parse_var("SEARCH_DEBOUNCE_MS", 300)),
            search_page_size: parse_var("SEARCH_PAGE_SIZE", defaults.search_page_size),
            search_query: non_empty_var("SEARCH_QUERY"),
            poll_url: env::var("POLL_URL").unwrap_or(defaults.poll_url),
            poll_interval: Duration::from_secs(parse_var("POLL_INTERVAL_SECS", 30)),
            poll_stale_time: Duration::from_secs(parse_var("POLL_STALE_TIME_SECS", 10)),
        }
    }

    /// Options for a [`crate::search::DebouncedSearch`] built from this config.
    pub fn search_options(&self) -> SearchOptions {
        SearchOptions {
            endpoint: self.search_endpoint.clone(),
            debounce: self.search_debounce,
            page_size: self.search_page_size,
        }
    }

    /// Options for the badge poller.
    pub fn poll_options(&self) -> PollOptions {
        PollOptions {
            interval: Some(self.poll_interval),
            stale_time: self.poll_stale_time,
            refetch_on_focus: true,
            use_cache: false,
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            client: ClientConfig::default(),
            cache_max_entries: 100,
            cache_ttl: Duration::from_secs(300),
            cleanup_interval: Duration::from_secs(60),
            search_endpoint: "/api/search".to_string(),
            search_debounce: Duration::from_millis(300),
            search_page_size: 12,
            search_query: None,
            poll_url: "/api/notifications/unread-count".to_string(),
            poll_interval: Duration::from_secs(30),
            poll_stale_time: Duration::from_secs(10),
        }
    }
}

fn parse_var<T: FromStr>(name: &str, default: T) -> T {
    env::var(name)
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(default)
}

fn non_empty_var(name: &str) -> Option<String> {
    env::var(name).ok().filter(|v| !v.trim().is_empty())
}
