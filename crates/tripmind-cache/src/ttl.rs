use moka::future::Cache;
use moka::Expiry;
use std::time::{Duration, Instant};
use tracing::trace;

/// Longest TTL an entry can get; larger requests are clamped to this.
pub const MAX_TTL: Duration = Duration::from_secs(365 * 24 * 60 * 60);

/// A cached value and the moment it stops being served.
#[derive(Debug, Clone)]
struct CacheEntry<V> {
    value: V,
    expires_at: Instant,
    ttl: Duration,
}

/// Tells moka to drop each entry after its own TTL, restarting the clock on overwrite.
struct PerEntryTtl;

impl<V> Expiry<String, CacheEntry<V>> for PerEntryTtl {
    fn expire_after_create(
        &self,
        _key: &String,
        entry: &CacheEntry<V>,
        _created_at: Instant,
    ) -> Option<Duration> {
        Some(entry.ttl)
    }

    fn expire_after_update(
        &self,
        _key: &String,
        entry: &CacheEntry<V>,
        _updated_at: Instant,
        _duration_until_expiry: Option<Duration>,
    ) -> Option<Duration> {
        Some(entry.ttl)
    }
}

/// In-memory key/value cache with a TTL per entry, backed by moka.
///
/// Reads check `expires_at` themselves, so an entry is a miss from the instant
/// it goes stale even if moka has not evicted it yet. Eviction of stale entries
/// happens in moka's own housekeeping.
///
/// Safe to share between tasks: readers racing a writer for the same key see
/// either the old or the new value, never a mix. Last writer wins.
pub struct TtlCache<V> {
    inner: Cache<String, CacheEntry<V>>,
}

impl<V> TtlCache<V>
where
    V: Clone + Send + Sync + 'static,
{
    pub fn new(max_capacity: u64) -> Self {
        Self {
            inner: Cache::builder()
                .max_capacity(max_capacity)
                .expire_after(PerEntryTtl)
                .build(),
        }
    }

    pub async fn get(&self, key: &str) -> Option<V> {
        let entry = self.inner.get(key).await?;
        if Instant::now() >= entry.expires_at {
            trace!(key, "stale cache entry");
            return None;
        }
        Some(entry.value)
    }

    /// Store `value` under `key`, replacing whatever was there. `ttl` is
    /// clamped to `MAX_TTL`.
    pub async fn set(&self, key: String, value: V, ttl: Duration) {
        let ttl = ttl.min(MAX_TTL);
        let entry = CacheEntry {
            value,
            expires_at: Instant::now() + ttl,
            ttl,
        };
        self.inner.insert(key, entry).await;
    }

    pub async fn invalidate(&self, key: &str) {
        self.inner.invalidate(key).await;
    }

    /// Run moka's pending housekeeping, dropping expired entries now.
    pub async fn sweep(&self) {
        self.inner.run_pending_tasks().await;
    }

    pub fn entry_count(&self) -> u64 {
        self.inner.entry_count()
    }
}
