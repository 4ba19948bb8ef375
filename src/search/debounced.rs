//! Debounced, cached search against the trade-directory endpoint.

use std::sync::{Arc, LazyLock};
use std::time::Duration;

use parking_lot::Mutex;
use regex::Regex;
use serde::de::DeserializeOwned;
use serde::Serialize;
use tokio::sync::{oneshot, watch};
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

use crate::cache::SharedCache;
use crate::client::JsonSource;
use crate::error::{FetchError, Result};
use crate::models::{SearchPage, SearchResponse};
use crate::search::{NormalizedParams, SearchParams, CACHE_KEY_PREFIX};

/// Matches every key written by [`DebouncedSearch`].
static SEARCH_KEYS: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(&format!("^{}", regex::escape(CACHE_KEY_PREFIX)))
        .expect("escaped literal prefix is a valid pattern")
});

/// Default quiet period before a search request fires.
pub const DEFAULT_DEBOUNCE: Duration = Duration::from_millis(300);

// == Search Options ==
/// Tuning for a [`DebouncedSearch`].
#[derive(Debug, Clone)]
pub struct SearchOptions {
    /// Path of the search endpoint, without query string
    pub endpoint: String,
    /// Quiet period a burst of calls must end with before a request fires
    pub debounce: Duration,
    /// Results per page; one extra row is requested to detect more pages
    pub page_size: usize,
}

impl Default for SearchOptions {
    fn default() -> Self {
        Self {
            endpoint: "/api/search".to_string(),
            debounce: DEFAULT_DEBOUNCE,
            page_size: 12,
        }
    }
}

// == Search Status ==
/// Loading/error pair observed by whatever renders the results.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct SearchStatus {
    pub loading: bool,
    pub error: Option<String>,
}

/// The single pending (debouncing or fetching) call, if any.
#[derive(Debug, Default)]
struct Pending {
    generation: u64,
    task: Option<JoinHandle<()>>,
}

struct Shared<T> {
    source: Arc<dyn JsonSource>,
    cache: SharedCache<SearchPage<T>>,
    options: SearchOptions,
    pending: Mutex<Pending>,
    status: watch::Sender<SearchStatus>,
}

// == Debounced Search ==
/// Search front-end that collapses bursts of calls into one request.
///
/// A call whose key is cached (and not forced) is answered immediately. Any
/// other call arms a debounce timer; a newer call cancels it and re-arms, so
/// only the last call of a burst reaches the network. Superseded callers get
/// [`FetchError::Cancelled`].
pub struct DebouncedSearch<T> {
    shared: Arc<Shared<T>>,
}

impl<T> DebouncedSearch<T>
where
    T: DeserializeOwned + Clone + Send + Sync + 'static,
{
    // == Constructor ==
    pub fn new(
        source: Arc<dyn JsonSource>,
        cache: SharedCache<SearchPage<T>>,
        options: SearchOptions,
    ) -> Self {
        let (status, _) = watch::channel(SearchStatus::default());

        Self {
            shared: Arc::new(Shared {
                source,
                cache,
                options,
                pending: Mutex::new(Pending::default()),
                status,
            }),
        }
    }

    // == Search ==
    /// Runs a search for `params`.
    ///
    /// With `force == false` a live cache entry is returned without delay or
    /// request. Otherwise the request fires once `debounce` has passed with
    /// no newer call.
    pub async fn search(&self, params: &SearchParams, force: bool) -> Result<SearchPage<T>> {
        let normalized = params.normalize();
        let key = normalized.cache_key();

        if !force {
            let cached = self.shared.cache.write().await.get(&key);
            if let Some(page) = cached {
                debug!("Search cache hit for '{}'", key);
                self.supersede_pending(false);
                return Ok(page);
            }
        }

        let (tx, rx) = oneshot::channel();
        {
            let mut pending = self.shared.pending.lock();
            let generation = Self::supersede(&mut pending, &self.shared.status, true);

            let shared = Arc::clone(&self.shared);
            pending.task = Some(tokio::spawn(async move {
                tokio::time::sleep(shared.options.debounce).await;
                let result = shared.fetch_page(&normalized, key).await;
                shared.finish(generation, result, tx);
            }));
        }

        rx.await.map_err(|_| FetchError::Cancelled)?
    }

    // == Cancel ==
    /// Drops the pending call, if any. Its caller receives `Cancelled`.
    pub fn cancel(&self) {
        self.supersede_pending(false);
    }

    // == Invalidate All ==
    /// Drops every cached search page, e.g. after a listing was edited.
    pub async fn invalidate_all(&self) -> usize {
        self.shared.cache.write().await.invalidate_pattern(&SEARCH_KEYS)
    }

    /// Current loading/error status.
    pub fn status(&self) -> SearchStatus {
        self.shared.status.borrow().clone()
    }

    /// Receiver notified on every status change.
    pub fn subscribe(&self) -> watch::Receiver<SearchStatus> {
        self.shared.status.subscribe()
    }

    pub fn options(&self) -> &SearchOptions {
        &self.shared.options
    }

    // == Supersede ==
    fn supersede_pending(&self, loading: bool) {
        let mut pending = self.shared.pending.lock();
        Self::supersede(&mut pending, &self.shared.status, loading);
    }

    /// Aborts the pending task, bumps the generation, sets `loading` and
    /// clears any previous error.
    fn supersede(
        pending: &mut Pending,
        status: &watch::Sender<SearchStatus>,
        loading: bool,
    ) -> u64 {
        if let Some(task) = pending.task.take() {
            if !task.is_finished() {
                debug!("Superseding pending search");
            }
            task.abort();
        }
        pending.generation += 1;

        status.send_modify(|s| {
            s.loading = loading;
            s.error = None;
        });
        pending.generation
    }
}

impl<T> Shared<T>
where
    T: DeserializeOwned + Clone + Send + Sync + 'static,
{
    // == Fetch Page ==
    async fn fetch_page(&self, params: &NormalizedParams, key: String) -> Result<SearchPage<T>> {
        let limit = self.options.page_size.max(1);
        let path = format!(
            "{}?{}",
            self.options.endpoint,
            params.query_string(limit + 1)
        );
        info!("Searching {}", path);

        let body = self.source.get_json(&path).await?;
        let response: SearchResponse<T> =
            serde_json::from_value(body).map_err(|e| FetchError::Decode(e.to_string()))?;
        let page = SearchPage::from_response(response.into_checked()?, params.page, limit);

        // A page is valid for its key even if a newer call has since started
        self.cache.write().await.set(key, page.clone());
        Ok(page)
    }

    // == Finish ==
    /// Publishes the outcome if this call is still the current one.
    fn finish(
        &self,
        generation: u64,
        result: Result<SearchPage<T>>,
        tx: oneshot::Sender<Result<SearchPage<T>>>,
    ) {
        let mut pending = self.pending.lock();
        if pending.generation != generation {
            // Dropping tx resolves the caller with Cancelled
            return;
        }
        pending.task = None;

        self.status.send_modify(|s| {
            s.loading = false;
            s.error = match &result {
                Ok(_) => None,
                Err(e) => {
                    warn!("Search failed: {}", e);
                    Some(e.user_message())
                }
            };
        });
        drop(pending);

        let _ = tx.send(result);
    }
}

impl<T> Drop for DebouncedSearch<T> {
    fn drop(&mut self) {
        if let Some(task) = self.shared.pending.lock().task.take() {
            task.abort();
        }
    }
}
