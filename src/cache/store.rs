//! Cache Store Module
//!
//! Main cache engine combining HashMap storage with FIFO eviction and TTL expiration.

use std::collections::HashMap;
use std::sync::Arc;

use regex::Regex;
use tokio::sync::RwLock;
use tokio::time::{Duration, Instant};
use tracing::{debug, trace};

use crate::cache::{CacheEntry, CacheStats, InsertionOrder};

/// A cache shared between the components of one application root.
///
/// Reads need the write lock too: lookups purge expired entries and update
/// statistics.
pub type SharedCache<V> = Arc<RwLock<TtlCache<V>>>;

// == TTL Cache ==
/// Bounded in-memory cache with per-entry expiry.
///
/// Eviction is FIFO: when a new key would exceed `max_entries`, the key that
/// was inserted first is dropped, however recently it was read. None of the
/// operations fail; a missing key and an expired key look the same.
#[derive(Debug)]
pub struct TtlCache<V> {
    entries: HashMap<String, CacheEntry<V>>,
    order: InsertionOrder,
    stats: CacheStats,
    max_entries: usize,
    default_ttl: Duration,
}

impl<V: Clone> TtlCache<V> {
    // == Constructor ==
    /// Creates a new cache with the given capacity and default TTL.
    pub fn new(max_entries: usize, default_ttl: Duration) -> Self {
        Self {
            entries: HashMap::new(),
            order: InsertionOrder::new(),
            stats: CacheStats::new(),
            max_entries,
            default_ttl,
        }
    }

    /// Wraps the cache for sharing across tasks.
    pub fn into_shared(self) -> SharedCache<V> {
        Arc::new(RwLock::new(self))
    }

    // == Set ==
    /// Stores a value under `key` for the default TTL.
    pub fn set(&mut self, key: impl Into<String>, value: V) {
        let ttl = self.default_ttl;
        self.set_with_ttl(key, value, ttl);
    }

    /// Stores a value under `key` for `ttl`.
    ///
    /// Overwriting an existing key replaces its value and expiry but keeps
    /// its place in the eviction order. A new key arriving at capacity evicts
    /// the oldest inserted key first.
    pub fn set_with_ttl(&mut self, key: impl Into<String>, value: V, ttl: Duration) {
        let key = key.into();

        if self.max_entries == 0 {
            debug!("Cache has zero capacity, dropping key '{}'", key);
            return;
        }

        let is_overwrite = self.entries.contains_key(&key);

        if !is_overwrite && self.entries.len() >= self.max_entries {
            if let Some(evicted_key) = self.order.evict_oldest() {
                self.entries.remove(&evicted_key);
                self.stats.record_eviction();
                debug!("Evicted oldest cache key '{}'", evicted_key);
            }
        }

        self.entries.insert(key.clone(), CacheEntry::new(value, ttl));
        self.order.record(&key);
        self.stats.set_total_entries(self.entries.len());
    }

    // == Get ==
    /// Returns a clone of the value if present and not expired.
    ///
    /// Expired entries are removed as a side effect.
    pub fn get(&mut self, key: &str) -> Option<V> {
        if self.purge_if_expired(key) {
            self.stats.record_miss();
            return None;
        }

        match self.entries.get(key) {
            Some(entry) => {
                self.stats.record_hit();
                trace!("Cache hit for '{}'", key);
                Some(entry.value.clone())
            }
            None => {
                self.stats.record_miss();
                trace!("Cache miss for '{}'", key);
                None
            }
        }
    }

    // == Has ==
    /// Same expiry semantics as [`get`](Self::get) without cloning the value.
    pub fn has(&mut self, key: &str) -> bool {
        !self.purge_if_expired(key) && self.entries.contains_key(key)
    }

    /// When the live entry under `key` was stored.
    pub fn stored_at(&mut self, key: &str) -> Option<Instant> {
        if self.purge_if_expired(key) {
            return None;
        }
        self.entries.get(key).map(|entry| entry.stored_at)
    }

    // == Invalidate ==
    /// Unconditionally removes `key`.
    pub fn invalidate(&mut self, key: &str) {
        if self.entries.remove(key).is_some() {
            self.order.remove(key);
            self.stats.set_total_entries(self.entries.len());
        }
    }

    /// Removes every key matching `pattern`, returning how many were removed.
    ///
    /// Used to drop a whole family of keys (all `posts-page-*` pages, all
    /// search results) after a mutation.
    pub fn invalidate_pattern(&mut self, pattern: &Regex) -> usize {
        let before = self.entries.len();

        self.entries.retain(|key, _| !pattern.is_match(key));
        self.order.retain(|key| !pattern.is_match(key));
        self.stats.set_total_entries(self.entries.len());

        let removed = before - self.entries.len();
        if removed > 0 {
            debug!("Invalidated {} keys matching '{}'", removed, pattern);
        }
        removed
    }

    // == Clear ==
    /// Removes every entry. Statistics are kept.
    pub fn clear(&mut self) {
        self.entries.clear();
        self.order.clear();
        self.stats.set_total_entries(0);
    }

    // == Cleanup Expired ==
    /// Removes all expired entries from the cache.
    ///
    /// Returns the number of entries removed.
    pub fn cleanup_expired(&mut self) -> usize {
        let now = Instant::now();
        let before = self.entries.len();

        self.entries.retain(|_, entry| !entry.is_expired_at(now));
        let entries = &self.entries;
        self.order.retain(|key| entries.contains_key(key));

        let removed = before - self.entries.len();
        self.stats.record_expirations(removed);
        self.stats.set_total_entries(self.entries.len());
        removed
    }

    // == Stats ==
    /// Returns current cache statistics.
    pub fn stats(&self) -> CacheStats {
        let mut stats = self.stats.clone();
        stats.set_total_entries(self.entries.len());
        stats
    }

    /// Number of stored entries, including expired ones not yet purged.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn max_entries(&self) -> usize {
        self.max_entries
    }

    pub fn default_ttl(&self) -> Duration {
        self.default_ttl
    }

    /// Drops the entry under `key` if it has expired. Returns true if it did.
    fn purge_if_expired(&mut self, key: &str) -> bool {
        let expired = self
            .entries
            .get(key)
            .map(|entry| entry.is_expired())
            .unwrap_or(false);

        if expired {
            self.entries.remove(key);
            self.order.remove(key);
            self.stats.record_expirations(1);
            self.stats.set_total_entries(self.entries.len());
            debug!("Purged expired cache key '{}'", key);
        }
        expired
    }
}

// == Unit Tests ==
#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::{json, Value};

    fn cache(max_entries: usize) -> TtlCache<Value> {
        TtlCache::new(max_entries, Duration::from_millis(1000))
    }

    #[test]
    fn test_store_new() {
        let store = cache(10);
        assert!(store.is_empty());
        assert_eq!(store.max_entries(), 10);
        assert_eq!(store.default_ttl(), Duration::from_millis(1000));
    }

    #[test]
    fn test_set_and_get() {
        let mut store = cache(10);

        store.set("x", json!({"a": 1}));

        assert_eq!(store.get("x"), Some(json!({"a": 1})));
        assert!(store.has("x"));
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn test_get_nonexistent() {
        let mut store = cache(10);

        assert_eq!(store.get("missing"), None);
        assert!(!store.has("missing"));
    }

    #[tokio::test(start_paused = true)]
    async fn test_ttl_scenario() {
        let mut store = cache(10);
        store.set("x", json!({"a": 1}));

        tokio::time::advance(Duration::from_millis(500)).await;
        assert_eq!(store.get("x"), Some(json!({"a": 1})));

        tokio::time::advance(Duration::from_millis(1000)).await;
        assert_eq!(store.get("x"), None);
        assert!(!store.has("x"));
        assert!(store.is_empty(), "expired entry should be purged on access");
    }

    #[tokio::test(start_paused = true)]
    async fn test_has_purges_expired_entry() {
        let mut store = cache(10);
        store.set_with_ttl("short", json!(1), Duration::from_millis(10));

        tokio::time::advance(Duration::from_millis(11)).await;

        assert!(!store.has("short"));
        assert_eq!(store.len(), 0);
        assert_eq!(store.stats().expirations, 1);
    }

    #[test]
    fn test_overwrite_keeps_size() {
        let mut store = cache(10);

        store.set("key", json!("v1"));
        store.set("key", json!("v2"));

        assert_eq!(store.get("key"), Some(json!("v2")));
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn test_fifo_eviction() {
        let mut store = cache(3);

        store.set("key1", json!(1));
        store.set("key2", json!(2));
        store.set("key3", json!(3));
        store.set("key4", json!(4));

        assert_eq!(store.len(), 3);
        assert!(!store.has("key1"));
        assert!(store.has("key2"));
        assert!(store.has("key4"));
        assert_eq!(store.stats().evictions, 1);
    }

    #[test]
    fn test_reads_do_not_protect_from_eviction() {
        let mut store = cache(3);

        store.set("key1", json!(1));
        store.set("key2", json!(2));
        store.set("key3", json!(3));

        // Unlike LRU, reading key1 does not move it back in line
        store.get("key1");
        store.set("key4", json!(4));

        assert!(!store.has("key1"));
        assert!(store.has("key2"));
    }

    #[test]
    fn test_overwrite_at_capacity_does_not_evict() {
        let mut store = cache(2);

        store.set("a", json!(1));
        store.set("b", json!(2));
        store.set("a", json!(3));

        assert!(store.has("a"));
        assert!(store.has("b"));
        assert_eq!(store.stats().evictions, 0);
    }

    #[test]
    fn test_zero_capacity_stores_nothing() {
        let mut store = cache(0);

        store.set("a", json!(1));

        assert!(store.is_empty());
        assert_eq!(store.get("a"), None);
    }

    #[test]
    fn test_invalidate() {
        let mut store = cache(10);

        store.set("key1", json!(1));
        store.invalidate("key1");
        store.invalidate("never-set");

        assert!(store.is_empty());
        assert_eq!(store.get("key1"), None);
    }

    #[test]
    fn test_invalidate_pattern() {
        let mut store = cache(10);

        store.set("posts-page-1", json!([]));
        store.set("posts-page-2", json!([]));
        store.set("business-9", json!({}));

        let pattern = Regex::new(r"^posts-page-\d+$").unwrap();
        let removed = store.invalidate_pattern(&pattern);

        assert_eq!(removed, 2);
        assert_eq!(store.len(), 1);
        assert!(store.has("business-9"));

        // Eviction order no longer references the removed keys
        store.set("a", json!(1));
        assert_eq!(store.len(), 2);
    }

    #[test]
    fn test_clear() {
        let mut store = cache(10);

        store.set("key1", json!(1));
        store.set("key2", json!(2));
        store.clear();

        assert!(store.is_empty());
        assert_eq!(store.stats().total_entries, 0);
    }

    #[tokio::test(start_paused = true)]
    async fn test_cleanup_expired() {
        let mut store = cache(10);

        store.set_with_ttl("key1", json!(1), Duration::from_secs(1));
        store.set_with_ttl("key2", json!(2), Duration::from_secs(10));

        tokio::time::advance(Duration::from_millis(1100)).await;

        assert_eq!(store.cleanup_expired(), 1);
        assert_eq!(store.len(), 1);
        assert!(store.has("key2"));
    }

    #[tokio::test(start_paused = true)]
    async fn test_stored_at() {
        let mut store = cache(10);
        let before = Instant::now();

        store.set("key", json!(1));

        assert_eq!(store.stored_at("key"), Some(before));
        assert_eq!(store.stored_at("missing"), None);
    }

    #[test]
    fn test_stats() {
        let mut store = cache(10);

        store.set("key1", json!(1));
        store.get("key1");
        store.get("nonexistent");

        let stats = store.stats();
        assert_eq!(stats.hits, 1);
        assert_eq!(stats.misses, 1);
        assert_eq!(stats.total_entries, 1);
    }
}
