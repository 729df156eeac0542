use lru::LruCache;
use sha2::{Digest, Sha256};
use std::collections::BTreeMap;
use std::num::NonZeroUsize;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;

/// Source of wall-clock milliseconds for expiry checks.
pub trait Clock: Send + Sync {
    fn now_ms(&self) -> i64;
}

#[derive(Debug, Default, Clone, Copy)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now_ms(&self) -> i64 {
        chrono::Utc::now().timestamp_millis()
    }
}

// Cache entry with absolute expiry
#[derive(Clone)]
struct CacheEntry<V> {
    value: V,
    expire_at: i64,
}

/// Bounded LRU store with lazy TTL expiry.
///
/// Both `get` hits and `set` promote a key to most recently used; inserting a
/// new key at capacity evicts the least recently used one first.
pub struct CacheStore<V> {
    inner: Mutex<LruCache<String, CacheEntry<V>>>,
    ttl: Duration,
    clock: Arc<dyn Clock>,
}

impl<V: Clone> CacheStore<V> {
    pub fn new(capacity: usize, ttl: Duration) -> Self {
        Self::with_clock(capacity, ttl, Arc::new(SystemClock))
    }

    pub fn with_clock(capacity: usize, ttl: Duration, clock: Arc<dyn Clock>) -> Self {
        let capacity = NonZeroUsize::new(capacity).unwrap_or(NonZeroUsize::MIN);
        Self {
            inner: Mutex::new(LruCache::new(capacity)),
            ttl,
            clock,
        }
    }

    fn lock(&self) -> MutexGuard<'_, LruCache<String, CacheEntry<V>>> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn get(&self, key: &str) -> Option<V> {
        let now = self.clock.now_ms();
        let mut cache = self.lock();
        let expired = now > cache.peek(key)?.expire_at;
        if expired {
            cache.pop(key);
            tracing::debug!(key, "cache entry expired");
            return None;
        }
        cache.get(key).map(|entry| entry.value.clone())
    }

    pub fn set(&self, key: impl Into<String>, value: V) {
        let ttl_ms = i64::try_from(self.ttl.as_millis()).unwrap_or(i64::MAX);
        let expire_at = self.clock.now_ms().saturating_add(ttl_ms);
        let mut cache = self.lock();
        if let Some((evicted, _)) = cache.push(key.into(), CacheEntry { value, expire_at }) {
            // push also hands back the replaced value for an existing key
            if !cache.contains(&evicted) {
                tracing::debug!(key = %evicted, "cache evicted least recently used entry");
            }
        }
    }

    pub fn len(&self) -> usize {
        self.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Build a deterministic cache key from named request fields.
///
/// Fields are sorted by name and joined with a unit separator before hashing,
/// so the caller's field order never changes the key.
pub fn make_cache_key<'a>(fields: impl IntoIterator<Item = (&'a str, String)>) -> String {
    let sorted: BTreeMap<&str, String> = fields.into_iter().collect();
    let mut hasher = Sha256::new();
    for (name, value) in &sorted {
        hasher.update(name.as_bytes());
        hasher.update(b"=");
        hasher.update(value.as_bytes());
        hasher.update(b"\x1f");
    }
    format!("{:x}", hasher.finalize())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicI64, Ordering};

    #[derive(Default)]
    struct ManualClock(AtomicI64);

    impl ManualClock {
        fn advance(&self, ms: i64) {
            self.0.fetch_add(ms, Ordering::SeqCst);
        }
    }

    impl Clock for ManualClock {
        fn now_ms(&self) -> i64 {
            self.0.load(Ordering::SeqCst)
        }
    }

    fn store(capacity: usize) -> (CacheStore<u32>, Arc<ManualClock>) {
        let clock = Arc::new(ManualClock::default());
        let store = CacheStore::with_clock(capacity, Duration::from_millis(600_000), clock.clone());
        (store, clock)
    }

    #[test]
    fn never_exceeds_capacity() {
        let (cache, _) = store(200);
        for i in 0..=200u32 {
            cache.set(format!("k{i}"), i);
            assert!(cache.len() <= 200);
        }
        assert_eq!(cache.len(), 200);
        assert_eq!(cache.get("k0"), None);
        assert_eq!(cache.get("k1"), Some(1));
        assert_eq!(cache.get("k200"), Some(200));
    }

    #[test]
    fn read_touch_protects_from_eviction() {
        let (cache, _) = store(2);
        cache.set("a", 1);
        cache.set("b", 2);
        assert_eq!(cache.get("a"), Some(1));
        cache.set("c", 3);
        assert_eq!(cache.get("b"), None);
        assert_eq!(cache.get("a"), Some(1));
        assert_eq!(cache.get("c"), Some(3));
    }

    #[test]
    fn rewrite_refreshes_recency_without_eviction() {
        let (cache, _) = store(2);
        cache.set("a", 1);
        cache.set("b", 2);
        cache.set("a", 10);
        assert_eq!(cache.len(), 2);
        cache.set("c", 3);
        assert_eq!(cache.get("a"), Some(10));
        assert_eq!(cache.get("b"), None);
    }

    #[test]
    fn expired_entry_is_absent_and_removed() {
        let (cache, clock) = store(10);
        cache.set("a", 1);
        clock.advance(600_000);
        assert_eq!(cache.get("a"), Some(1));
        clock.advance(1);
        assert_eq!(cache.get("a"), None);
        assert!(cache.is_empty());
    }

    #[test]
    fn rewrite_extends_expiry() {
        let (cache, clock) = store(10);
        cache.set("a", 1);
        clock.advance(500_000);
        cache.set("a", 2);
        clock.advance(500_000);
        assert_eq!(cache.get("a"), Some(2));
    }

    #[test]
    fn zero_capacity_is_clamped() {
        let (cache, _) = store(0);
        cache.set("a", 1);
        cache.set("b", 2);
        assert_eq!(cache.len(), 1);
        assert_eq!(cache.get("b"), Some(2));
    }

    #[test]
    fn huge_ttl_never_expires_on_write() {
        let clock = Arc::new(ManualClock::default());
        clock.advance(1_700_000_000_000);
        let cache = CacheStore::with_clock(4, Duration::from_secs(u64::MAX / 1000), clock.clone());
        cache.set("a", 1);
        assert_eq!(cache.get("a"), Some(1));
        clock.advance(365 * 24 * 3_600_000);
        assert_eq!(cache.get("a"), Some(1));
    }

    #[test]
    fn cache_key_ignores_field_order() {
        let first = make_cache_key([("a", "x".to_string()), ("language", "en".to_string())]);
        let second = make_cache_key([("language", "en".to_string()), ("a", "x".to_string())]);
        assert_eq!(first, second);
        assert_eq!(first.len(), 64);

        let other = make_cache_key([("a", "x".to_string()), ("language", "zh".to_string())]);
        assert_ne!(first, other);
    }
}
