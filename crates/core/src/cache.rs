//! Generic in-memory TTL cache.
//!
//! Injected as an explicit service instance (no hidden global) so tests and
//! multi-tenant setups can construct isolated caches. Caches negative
//! lookups as well as hits; evicts the oldest entry when full; supports
//! prefix invalidation and a periodic expired-entry sweep.

use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard};
use std::time::{Duration, Instant};

// ---------------------------------------------------------------------------
// Defaults
// ---------------------------------------------------------------------------

/// Default entry time-to-live: 5 minutes.
pub const DEFAULT_TTL: Duration = Duration::from_secs(300);

/// Default maximum number of entries.
pub const DEFAULT_MAX_ENTRIES: usize = 1000;

// ---------------------------------------------------------------------------
// Cache
// ---------------------------------------------------------------------------

struct Entry<V> {
    /// `None` is a cached negative result (lookup found nothing).
    value: Option<V>,
    inserted_at: Instant,
}

/// Thread-safe TTL cache keyed by operation+argument strings.
///
/// Designed to be wrapped in `Arc` and shared across request handlers and
/// the background sweep task.
pub struct TtlCache<V> {
    ttl: Duration,
    max_entries: usize,
    entries: Mutex<HashMap<String, Entry<V>>>,
}

impl<V: Clone> TtlCache<V> {
    /// Create a cache with explicit TTL and capacity.
    pub fn new(ttl: Duration, max_entries: usize) -> Self {
        Self {
            ttl,
            max_entries: max_entries.max(1),
            entries: Mutex::new(HashMap::new()),
        }
    }

    /// Create a cache with the default TTL and capacity.
    pub fn with_defaults() -> Self {
        Self::new(DEFAULT_TTL, DEFAULT_MAX_ENTRIES)
    }

    fn lock(&self) -> MutexGuard<'_, HashMap<String, Entry<V>>> {
        // A poisoned lock only means another thread panicked mid-operation;
        // the map itself is still structurally sound.
        self.entries.lock().unwrap_or_else(|e| e.into_inner())
    }

    /// Look up a key.
    ///
    /// Returns `None` on a miss (absent or expired), `Some(None)` for a
    /// cached negative result, and `Some(Some(v))` for a cached hit.
    pub fn get(&self, key: &str) -> Option<Option<V>> {
        let mut entries = self.lock();
        match entries.get(key) {
            Some(entry) if entry.inserted_at.elapsed() < self.ttl => Some(entry.value.clone()),
            Some(_) => {
                entries.remove(key);
                None
            }
            None => None,
        }
    }

    /// Store a result. `None` caches a negative lookup.
    ///
    /// When the cache is full and the key is new, the oldest entry is
    /// evicted first.
    pub fn insert(&self, key: impl Into<String>, value: Option<V>) {
        let key = key.into();
        let mut entries = self.lock();

        if entries.len() >= self.max_entries && !entries.contains_key(&key) {
            let oldest = entries
                .iter()
                .min_by_key(|(_, e)| e.inserted_at)
                .map(|(k, _)| k.clone());
            if let Some(oldest_key) = oldest {
                entries.remove(&oldest_key);
            }
        }

        entries.insert(
            key,
            Entry {
                value,
                inserted_at: Instant::now(),
            },
        );
    }

    /// Remove every entry whose key starts with `prefix`. Returns the
    /// number of entries removed.
    pub fn invalidate_prefix(&self, prefix: &str) -> usize {
        let mut entries = self.lock();
        let before = entries.len();
        entries.retain(|k, _| !k.starts_with(prefix));
        before - entries.len()
    }

    /// Drop all expired entries. Returns the number purged.
    pub fn purge_expired(&self) -> usize {
        let mut entries = self.lock();
        let before = entries.len();
        let ttl = self.ttl;
        entries.retain(|_, e| e.inserted_at.elapsed() < ttl);
        before - entries.len()
    }

    /// Remove all entries.
    pub fn clear(&self) {
        self.lock().clear();
    }

    /// Current number of entries, including expired ones not yet swept.
    pub fn len(&self) -> usize {
        self.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    fn tiny_cache(max: usize) -> TtlCache<i32> {
        TtlCache::new(Duration::from_secs(60), max)
    }

    // -- hit / miss / negative --

    #[test]
    fn miss_then_hit() {
        let cache = tiny_cache(10);
        assert_eq!(cache.get("a"), None);
        cache.insert("a", Some(1));
        assert_eq!(cache.get("a"), Some(Some(1)));
    }

    #[test]
    fn negative_results_are_cached() {
        let cache = tiny_cache(10);
        cache.insert("missing", None);
        assert_eq!(cache.get("missing"), Some(None));
    }

    #[test]
    fn expired_entries_read_as_misses() {
        let cache = TtlCache::new(Duration::from_millis(0), 10);
        cache.insert("a", Some(1));
        assert_eq!(cache.get("a"), None);
    }

    // -- eviction --

    #[test]
    fn oldest_entry_evicted_when_full() {
        let cache = tiny_cache(2);
        cache.insert("first", Some(1));
        std::thread::sleep(Duration::from_millis(5));
        cache.insert("second", Some(2));
        std::thread::sleep(Duration::from_millis(5));
        cache.insert("third", Some(3));

        assert_eq!(cache.len(), 2);
        assert_eq!(cache.get("first"), None);
        assert_eq!(cache.get("second"), Some(Some(2)));
        assert_eq!(cache.get("third"), Some(Some(3)));
    }

    #[test]
    fn overwriting_existing_key_does_not_evict() {
        let cache = tiny_cache(2);
        cache.insert("a", Some(1));
        cache.insert("b", Some(2));
        cache.insert("a", Some(10));

        assert_eq!(cache.len(), 2);
        assert_eq!(cache.get("a"), Some(Some(10)));
        assert_eq!(cache.get("b"), Some(Some(2)));
    }

    // -- read-through behavior --

    #[test]
    fn read_through_loads_once_within_ttl() {
        let cache = tiny_cache(10);
        let mut loads = 0;

        for _ in 0..3 {
            if cache.get("benchmark:1:mid").is_none() {
                loads += 1;
                cache.insert("benchmark:1:mid", Some(30));
            }
        }
        assert_eq!(loads, 1);

        // A write invalidates by prefix, so the next read loads again and
        // observes the new value.
        cache.invalidate_prefix("benchmark:");
        if cache.get("benchmark:1:mid").is_none() {
            loads += 1;
            cache.insert("benchmark:1:mid", Some(35));
        }
        assert_eq!(loads, 2);
        assert_eq!(cache.get("benchmark:1:mid"), Some(Some(35)));
    }

    // -- invalidation --

    #[test]
    fn prefix_invalidation() {
        let cache = tiny_cache(10);
        cache.insert("benchmark:1:mid", Some(1));
        cache.insert("benchmark:2:mid", Some(2));
        cache.insert("category:logo", Some(3));

        assert_eq!(cache.invalidate_prefix("benchmark:"), 2);
        assert_eq!(cache.get("benchmark:1:mid"), None);
        assert_eq!(cache.get("category:logo"), Some(Some(3)));
    }

    // -- sweep --

    #[test]
    fn purge_removes_only_expired() {
        let cache = TtlCache::new(Duration::from_millis(20), 10);
        cache.insert("old", Some(1));
        std::thread::sleep(Duration::from_millis(25));
        cache.insert("fresh", Some(2));

        assert_eq!(cache.purge_expired(), 1);
        assert_eq!(cache.len(), 1);
        assert_eq!(cache.get("fresh"), Some(Some(2)));
    }

    #[test]
    fn clear_empties_cache() {
        let cache = tiny_cache(10);
        cache.insert("a", Some(1));
        cache.clear();
        assert!(cache.is_empty());
    }
}
