//! Moving Fetch - command-line driver
//!
//! Connects to the platform backend, polls the unread badge counters and
//! optionally runs one trade-directory search, logging every state change
//! until interrupted.

use std::sync::Arc;

use anyhow::Context;
use serde_json::Value;
use tokio::signal;
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use moving_fetch::models::{SearchPage, TradeListing, UnreadCounts};
use moving_fetch::search::SearchStatus;
use moving_fetch::{
    spawn_cleanup_task, ApiClient, Config, DebouncedSearch, FetchContext, JsonSource,
    PollingFetch, SearchParams, TtlCache,
};

/// Startup sequence:
/// 1. Initialize tracing subscriber for logging
/// 2. Load configuration from environment variables
/// 3. Build the HTTP client and the shared response caches
/// 4. Start the background TTL cleanup task
/// 5. Start polling the badge endpoint and run the optional search
/// 6. Log state changes until SIGINT/SIGTERM
#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Defaults to "info" for this crate, can be overridden with RUST_LOG
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "moving_fetch=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting Moving Fetch");

    let config = Config::from_env();
    info!(
        "Configuration loaded: base_url={}, cache_max_entries={}, cache_ttl={:?}, poll_url={}, poll_interval={:?}",
        config.client.base_url,
        config.cache_max_entries,
        config.cache_ttl,
        config.poll_url,
        config.poll_interval
    );

    let client = ApiClient::new(&config.client).context("failed to build HTTP client")?;
    let source: Arc<dyn JsonSource> = Arc::new(client);

    let responses = TtlCache::<Value>::new(config.cache_max_entries, config.cache_ttl).into_shared();
    let searches = TtlCache::<SearchPage<TradeListing>>::new(config.cache_max_entries, config.cache_ttl)
        .into_shared();

    let cleanup_handles = vec![
        spawn_cleanup_task(responses.clone(), config.cleanup_interval),
        spawn_cleanup_task(searches.clone(), config.cleanup_interval),
    ];
    info!("Background cleanup tasks started");

    let ctx = FetchContext::new(Arc::clone(&source), responses);
    let badges =
        PollingFetch::<UnreadCounts>::start(ctx, config.poll_url.clone(), config.poll_options());
    let mut badge_rx = badges.subscribe();

    let search = DebouncedSearch::<TradeListing>::new(source, searches, config.search_options());
    let mut search_rx = search.subscribe();

    let search_run = async {
        let Some(query) = config.search_query.as_deref() else {
            return std::future::pending::<()>().await;
        };
        match search.search(&SearchParams::new(query), false).await {
            Ok(page) => {
                info!(
                    "Search '{}' returned {} of {} results (page {}/{}, more: {})",
                    query,
                    page.results.len(),
                    page.total,
                    page.page,
                    page.total_pages,
                    page.has_more
                );
                for listing in &page.results {
                    info!("  #{} {}", listing.id, listing.name);
                }
            }
            Err(e) if e.is_cancelled() => {}
            Err(e) => warn!("Search '{}' failed: {}", query, e.user_message()),
        }
        std::future::pending::<()>().await
    };
    tokio::pin!(search_run);

    let shutdown = shutdown_signal();
    tokio::pin!(shutdown);

    loop {
        tokio::select! {
            _ = &mut shutdown => break,
            _ = &mut search_run => {}
            changed = badge_rx.changed() => {
                if changed.is_err() {
                    break;
                }
                let state = badge_rx.borrow_and_update().clone();
                match (&state.data, &state.error) {
                    (_, Some(error)) => warn!("Badge refresh failed: {}", error),
                    (Some(counts), None) if !state.loading => info!(
                        "Unread: {} notifications, {} messages",
                        counts.notifications, counts.messages
                    ),
                    _ => {}
                }
            }
            changed = search_rx.changed() => {
                if changed.is_err() {
                    break;
                }
                let SearchStatus { loading, error } = search_rx.borrow_and_update().clone();
                if let Some(error) = error {
                    warn!("Search error: {}", error);
                } else if loading {
                    info!("Searching...");
                }
            }
        }
    }

    badges.stop();
    search.cancel();
    for handle in cleanup_handles {
        handle.abort();
    }
    warn!("Background tasks aborted");

    info!("Shutdown complete");
    Ok(())
}

/// Waits for shutdown signal (Ctrl+C or SIGTERM).
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            warn!("Failed to install Ctrl+C handler: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(e) => {
                warn!("Failed to install SIGTERM handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            info!("Received Ctrl+C, initiating shutdown...");
        }
        _ = terminate => {
            info!("Received SIGTERM, initiating shutdown...");
        }
    }
}
