//! Polling fetch
//!
//! Background task that keeps one endpoint's data fresh: an initial fetch on
//! start, a fetch every poll interval, and on-demand fetches on focus regain
//! or explicit refetch. Each fetch cancels the one before it.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use parking_lot::Mutex;
use serde::de::DeserializeOwned;
use serde_json::Value;
use tokio::sync::watch;
use tokio::time::{Instant, MissedTickBehavior};
use tokio_util::sync::{CancellationToken, DropGuard};
use tracing::{debug, info, warn};

use crate::cache::SharedCache;
use crate::client::JsonSource;
use crate::error::{FetchError, Result};
use crate::tasks::FetchState;

// == Fetch Context ==
/// Objects shared by every fetch instance under one application root.
///
/// Cloning is cheap; clones share the source, the response cache and the
/// record of when each URL was last fetched.
#[derive(Clone)]
pub struct FetchContext {
    source: Arc<dyn JsonSource>,
    cache: SharedCache<Value>,
    last_completed: Arc<Mutex<HashMap<String, Instant>>>,
}

impl FetchContext {
    pub fn new(source: Arc<dyn JsonSource>, cache: SharedCache<Value>) -> Self {
        Self {
            source,
            cache,
            last_completed: Arc::new(Mutex::new(HashMap::new())),
        }
    }

    pub fn cache(&self) -> &SharedCache<Value> {
        &self.cache
    }

    /// Whether a network fetch of `url` succeeded less than `stale_time` ago.
    ///
    /// Values served from the response cache do not count.
    pub fn is_fresh(&self, url: &str, stale_time: Duration) -> bool {
        self.last_completed
            .lock()
            .get(url)
            .map(|at| at.elapsed() < stale_time)
            .unwrap_or(false)
    }

    fn record_completed(&self, url: &str) {
        self.last_completed
            .lock()
            .insert(url.to_string(), Instant::now());
    }
}

// == Poll Options ==
/// Behaviour of a [`PollingFetch`].
#[derive(Debug, Clone, PartialEq)]
pub struct PollOptions {
    /// Poll period; `None` fetches once on start and then only on demand
    pub interval: Option<Duration>,
    /// Guarded fetches are skipped while the last fetch is younger than this
    pub stale_time: Duration,
    /// Whether [`PollingFetch::on_focus`] triggers a fetch
    pub refetch_on_focus: bool,
    /// Read and write the context's response cache
    pub use_cache: bool,
}

impl Default for PollOptions {
    fn default() -> Self {
        Self {
            interval: None,
            stale_time: Duration::ZERO,
            refetch_on_focus: true,
            use_cache: false,
        }
    }
}

/// Which shortcuts a fetch may take before going to the network.
#[derive(Debug, Clone, Copy)]
struct FetchPolicy {
    use_cache: bool,
    respect_stale_time: bool,
}

impl FetchPolicy {
    const GUARDED: Self = Self {
        use_cache: true,
        respect_stale_time: true,
    };
    const FOCUS: Self = Self {
        use_cache: false,
        respect_stale_time: true,
    };
    const NETWORK: Self = Self {
        use_cache: false,
        respect_stale_time: false,
    };
}

struct Inner<T> {
    ctx: FetchContext,
    url: String,
    options: PollOptions,
    state: watch::Sender<FetchState<T>>,
    /// Token of the most recently started fetch
    current: Mutex<CancellationToken>,
    root: CancellationToken,
}

// == Polling Fetch ==
/// Handle to a polling fetch of one URL.
///
/// Dropping the handle (or calling [`stop`](Self::stop)) ends the poll loop
/// and cancels any request in flight.
pub struct PollingFetch<T> {
    inner: Arc<Inner<T>>,
    _guard: DropGuard,
}

impl<T> PollingFetch<T>
where
    T: DeserializeOwned + Clone + Send + Sync + 'static,
{
    /// Starts polling `url`. Must be called within a Tokio runtime.
    pub fn start(ctx: FetchContext, url: impl Into<String>, options: PollOptions) -> Self {
        let root = CancellationToken::new();
        let (state, _) = watch::channel(FetchState::default());

        let inner = Arc::new(Inner {
            ctx,
            url: url.into(),
            options,
            state,
            current: Mutex::new(root.child_token()),
            root: root.clone(),
        });

        tokio::spawn(poll_loop(Arc::clone(&inner)));

        Self {
            inner,
            _guard: root.drop_guard(),
        }
    }

    pub fn url(&self) -> &str {
        &self.inner.url
    }

    /// Snapshot of the current state.
    pub fn state(&self) -> FetchState<T> {
        self.inner.state.borrow().clone()
    }

    /// Receiver notified on every state change.
    pub fn subscribe(&self) -> watch::Receiver<FetchState<T>> {
        self.inner.state.subscribe()
    }

    // == On-Demand Fetches ==
    /// Fresh network fetch, ignoring cache and stale time.
    pub async fn refetch(&self) -> Result<T> {
        self.inner.fetch_network().await
    }

    /// Fetch honouring cache and stale time. `Ok(None)` means it was skipped.
    pub async fn prefetch(&self) -> Result<Option<T>> {
        self.inner.fetch(FetchPolicy::GUARDED).await
    }

    /// To be called when the window regains focus.
    ///
    /// Fetches only if `refetch_on_focus` is set and the data is stale.
    pub async fn on_focus(&self) -> Result<Option<T>> {
        if !self.inner.options.refetch_on_focus {
            return Ok(None);
        }
        self.inner.fetch(FetchPolicy::FOCUS).await
    }

    pub fn is_active(&self) -> bool {
        !self.inner.root.is_cancelled()
    }

    /// Ends polling and cancels the in-flight request.
    pub fn stop(self) {
        debug!("Stopping poller for {}", self.inner.url);
    }
}

impl<T> Inner<T>
where
    T: DeserializeOwned + Clone + Send + Sync + 'static,
{
    // == Fetch ==
    async fn fetch(&self, policy: FetchPolicy) -> Result<Option<T>> {
        if policy.use_cache && self.options.use_cache {
            let cached = self.ctx.cache.write().await.get(&self.url);
            if let Some(value) = cached {
                debug!("Serving {} from cache", self.url);
                let token = self.supersede();
                let decoded = decode(value);
                return self.commit(&token, decoded).map(Some);
            }
        }

        if policy.respect_stale_time && self.ctx.is_fresh(&self.url, self.options.stale_time) {
            debug!("Skipping fetch of {}: data is still fresh", self.url);
            return Ok(None);
        }

        self.fetch_network().await.map(Some)
    }

    async fn fetch_network(&self) -> Result<T> {
        let token = self.supersede();
        self.state.send_modify(|s| s.begin());
        info!("Fetching {}", self.url);

        let outcome = tokio::select! {
            _ = token.cancelled() => return Err(FetchError::Cancelled),
            outcome = self.ctx.source.get_json(&self.url) => outcome,
        };

        if token.is_cancelled() {
            return Err(FetchError::Cancelled);
        }

        // Only bodies that decode are cached
        let decoded = match outcome {
            Ok(value) if self.options.use_cache => {
                let decoded = decode(value.clone());
                if decoded.is_ok() {
                    self.ctx.cache.write().await.set(self.url.clone(), value);
                }
                decoded
            }
            outcome => outcome.and_then(decode),
        };

        let result = self.commit(&token, decoded);
        if result.is_ok() {
            self.ctx.record_completed(&self.url);
        }
        result
    }

    // == Supersede ==
    /// Cancels the previous fetch and installs a fresh token for the next one.
    fn supersede(&self) -> CancellationToken {
        let mut current = self.current.lock();
        current.cancel();
        *current = self.root.child_token();
        current.clone()
    }

    // == Commit ==
    /// Writes `result` to state unless `token` was superseded meanwhile.
    ///
    /// The check and the write happen under the same lock `supersede` takes,
    /// so a newer fetch can never be overwritten by an older one.
    fn commit(&self, token: &CancellationToken, result: Result<T>) -> Result<T> {
        let _current = self.current.lock();
        if token.is_cancelled() {
            return Err(FetchError::Cancelled);
        }

        match &result {
            Ok(data) => {
                self.state.send_modify(|s| s.resolve(data.clone()));
            }
            Err(e) => {
                warn!("Fetch of {} failed: {}", self.url, e);
                let message = e.user_message();
                self.state.send_modify(|s| s.fail(message));
            }
        }
        result
    }
}

fn decode<T: DeserializeOwned>(value: Value) -> Result<T> {
    serde_json::from_value(value).map_err(|e| FetchError::Decode(e.to_string()))
}

// == Poll Loop ==
async fn poll_loop<T>(inner: Arc<Inner<T>>)
where
    T: DeserializeOwned + Clone + Send + Sync + 'static,
{
    let root = inner.root.clone();

    tokio::select! {
        _ = root.cancelled() => return,
        result = inner.fetch(FetchPolicy::GUARDED) => log_outcome(&inner.url, result),
    }

    let Some(period) = inner.options.interval else {
        return;
    };
    info!("Polling {} every {:?}", inner.url, period);

    let mut ticker = tokio::time::interval_at(Instant::now() + period, period);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

    loop {
        tokio::select! {
            _ = root.cancelled() => {
                debug!("Poll loop for {} shut down", inner.url);
                break;
            }
            _ = ticker.tick() => {
                let result = inner.fetch(FetchPolicy::NETWORK).await;
                log_outcome(&inner.url, result);
            }
        }
    }
}

fn log_outcome<T>(url: &str, result: Result<Option<T>>) {
    match result {
        Ok(Some(_)) => debug!("Poll of {} succeeded", url),
        Ok(None) => {}
        Err(FetchError::Cancelled) => debug!("Poll of {} cancelled", url),
        // Already recorded in state by commit
        Err(_) => {}
    }
}
