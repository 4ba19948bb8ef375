//! TTL Cleanup Task
//!
//! Background task that periodically sweeps expired entries out of a shared
//! response cache. Reads already purge lazily; the sweep keeps memory bounded
//! for keys that are never read again.

use std::time::Duration;

use tokio::task::JoinHandle;
use tracing::{debug, info};

use crate::cache::SharedCache;

/// Spawns a task that calls `cleanup_expired` on `cache` every `interval`.
///
/// The returned handle should be aborted on shutdown.
pub fn spawn_cleanup_task<V>(cache: SharedCache<V>, interval: Duration) -> JoinHandle<()>
where
    V: Clone + Send + Sync + 'static,
{
    tokio::spawn(async move {
        info!("Starting TTL cleanup task with interval of {:?}", interval);

        loop {
            tokio::time::sleep(interval).await;

            let removed = cache.write().await.cleanup_expired();

            if removed > 0 {
                info!("TTL cleanup: removed {} expired entries", removed);
            } else {
                debug!("TTL cleanup: no expired entries found");
            }
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cache::TtlCache;

    #[tokio::test(start_paused = true)]
    async fn test_cleanup_task_removes_expired_entries() {
        let cache = TtlCache::new(100, Duration::from_secs(300)).into_shared();
        cache
            .write()
            .await
            .set_with_ttl("expire_soon".to_string(), "value", Duration::from_secs(1));

        let handle = spawn_cleanup_task(cache.clone(), Duration::from_secs(1));

        tokio::time::sleep(Duration::from_millis(2500)).await;

        // Swept without any read touching the key
        let guard = cache.read().await;
        assert_eq!(guard.len(), 0);
        assert_eq!(guard.stats().expirations, 1);
        drop(guard);

        handle.abort();
    }

    #[tokio::test(start_paused = true)]
    async fn test_cleanup_task_preserves_valid_entries() {
        let cache = TtlCache::new(100, Duration::from_secs(300)).into_shared();
        cache
            .write()
            .await
            .set_with_ttl("long_lived".to_string(), "value", Duration::from_secs(3600));

        let handle = spawn_cleanup_task(cache.clone(), Duration::from_secs(1));
        tokio::time::sleep(Duration::from_millis(1500)).await;

        assert_eq!(cache.write().await.get("long_lived"), Some("value"));

        handle.abort();
    }

    #[tokio::test]
    async fn test_cleanup_task_can_be_aborted() {
        let cache = TtlCache::<String>::new(100, Duration::from_secs(300)).into_shared();

        let handle = spawn_cleanup_task(cache, Duration::from_secs(1));
        handle.abort();

        let result = handle.await;
        assert!(result.unwrap_err().is_cancelled());
    }
}
