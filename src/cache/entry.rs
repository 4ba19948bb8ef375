//! Cache Entry Module
//!
//! Defines the structure for individual cache entries with TTL support.

use tokio::time::{Duration, Instant};

// == Cache Entry ==
/// A single cached value together with its storage and expiry instants.
///
/// Instants come from `tokio::time`, so tests running on a paused clock can
/// move an entry past its expiry without sleeping.
#[derive(Debug, Clone)]
pub struct CacheEntry<V> {
    /// The stored value
    pub value: V,
    /// When the entry was stored
    pub stored_at: Instant,
    /// Instant after which the entry is no longer served
    pub expires_at: Instant,
}

impl<V> CacheEntry<V> {
    // == Constructor ==
    /// Creates a new cache entry that lives for `ttl`.
    pub fn new(value: V, ttl: Duration) -> Self {
        let now = Instant::now();

        Self {
            value,
            stored_at: now,
            expires_at: now + ttl,
        }
    }

    // == Is Expired ==
    /// Checks if the entry has expired.
    ///
    /// An entry stays valid up to and including `expires_at`; it is expired
    /// only once the current time is strictly past it.
    pub fn is_expired(&self) -> bool {
        self.is_expired_at(Instant::now())
    }

    /// Same as [`is_expired`](Self::is_expired) against an explicit instant.
    pub fn is_expired_at(&self, now: Instant) -> bool {
        now > self.expires_at
    }

    // == Age ==
    /// Time elapsed since the entry was stored.
    pub fn age(&self) -> Duration {
        Instant::now().saturating_duration_since(self.stored_at)
    }

    // == Time To Live ==
    /// Remaining lifetime, `Duration::ZERO` once expired.
    pub fn ttl_remaining(&self) -> Duration {
        self.expires_at.saturating_duration_since(Instant::now())
    }
}

// == Unit Tests ==
#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test(start_paused = true)]
    async fn test_entry_creation() {
        let entry = CacheEntry::new("value", Duration::from_secs(60));

        assert_eq!(entry.value, "value");
        assert_eq!(entry.expires_at - entry.stored_at, Duration::from_secs(60));
        assert!(!entry.is_expired());
    }

    #[tokio::test(start_paused = true)]
    async fn test_entry_expiration() {
        let entry = CacheEntry::new("value", Duration::from_millis(1000));

        tokio::time::advance(Duration::from_millis(500)).await;
        assert!(!entry.is_expired());

        tokio::time::advance(Duration::from_millis(1000)).await;
        assert!(entry.is_expired());
    }

    #[tokio::test(start_paused = true)]
    async fn test_expiration_boundary_condition() {
        let entry = CacheEntry::new("value", Duration::from_millis(100));

        // Exactly at expires_at the entry is still served
        assert!(!entry.is_expired_at(entry.expires_at));
        assert!(entry.is_expired_at(entry.expires_at + Duration::from_millis(1)));
    }

    #[tokio::test(start_paused = true)]
    async fn test_age_and_ttl_remaining() {
        let entry = CacheEntry::new(1u8, Duration::from_secs(10));

        tokio::time::advance(Duration::from_secs(4)).await;
        assert_eq!(entry.age(), Duration::from_secs(4));
        assert_eq!(entry.ttl_remaining(), Duration::from_secs(6));

        tokio::time::advance(Duration::from_secs(20)).await;
        assert_eq!(entry.ttl_remaining(), Duration::ZERO);
    }
}
