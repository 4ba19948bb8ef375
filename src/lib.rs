//! Moving Fetch - client-side data layer for the house-moving platform
//!
//! Provides a TTL response cache, a debounced trade-directory search and a
//! polling fetch for badge counters, all over a shared JSON HTTP client.

pub mod cache;
pub mod client;
pub mod config;
pub mod error;
pub mod models;
pub mod search;
pub mod tasks;

pub use cache::{SharedCache, TtlCache};
pub use client::{ApiClient, JsonSource};
pub use config::{ClientConfig, Config};
pub use error::{FetchError, Result};
pub use search::{DebouncedSearch, SearchParams};
pub use tasks::{spawn_cleanup_task, FetchContext, FetchState, PollOptions, PollingFetch};
