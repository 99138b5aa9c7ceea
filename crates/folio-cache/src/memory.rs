//! In-memory cache implementation.
//!
//! [`MemoryCache`] keeps entries in a `HashMap` next to a queue of keys in
//! insertion order. Both live behind a single mutex so that the
//! check-then-insert sequence of `set` and eviction stay consistent.

use std::collections::{HashMap, VecDeque};
use std::sync::{Mutex, MutexGuard, PoisonError};

use crate::{Cache, CacheStats};

struct Inner<V> {
    entries: HashMap<String, V>,
    /// Keys in insertion order (front = oldest).
    order: VecDeque<String>,
    hits: u64,
    misses: u64,
}

/// Mutex-guarded map with optional capacity and FIFO eviction.
///
/// When the cache holds `capacity` entries and a new key is inserted, the
/// single oldest-inserted entry is evicted first. Overwriting an existing key
/// replaces its value without changing its position in the eviction queue.
pub struct MemoryCache<V> {
    inner: Mutex<Inner<V>>,
    capacity: Option<usize>,
}

impl<V> MemoryCache<V> {
    /// Create an unbounded cache.
    #[must_use]
    pub fn new() -> Self {
        Self::build(None)
    }

    /// Create a cache holding at most `capacity` entries.
    ///
    /// A capacity of zero stores nothing.
    #[must_use]
    pub fn with_capacity(capacity: usize) -> Self {
        Self::build(Some(capacity))
    }

    fn build(capacity: Option<usize>) -> Self {
        Self {
            inner: Mutex::new(Inner {
                entries: HashMap::new(),
                order: VecDeque::new(),
                hits: 0,
                misses: 0,
            }),
            capacity,
        }
    }

    /// Configured capacity (`None` when unbounded).
    #[must_use]
    pub fn capacity(&self) -> Option<usize> {
        self.capacity
    }

    // Poisoned locks are recovered; cache contents are advisory.
    fn lock(&self) -> MutexGuard<'_, Inner<V>> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl<V> Default for MemoryCache<V> {
    fn default() -> Self {
        Self::new()
    }
}

impl<V: Clone + Send> Cache<V> for MemoryCache<V> {
    fn get(&self, key: &str) -> Option<V> {
        let mut inner = self.lock();
        let value = inner.entries.get(key).cloned();
        match value {
            Some(value) => {
                inner.hits += 1;
                Some(value)
            }
            None => {
                inner.misses += 1;
                None
            }
        }
    }

    fn set(&self, key: &str, value: V) {
        if self.capacity == Some(0) {
            return;
        }

        let mut inner = self.lock();
        if let Some(existing) = inner.entries.get_mut(key) {
            *existing = value;
            return;
        }

        if let Some(capacity) = self.capacity {
            while inner.entries.len() >= capacity {
                let Some(oldest) = inner.order.pop_front() else {
                    break;
                };
                inner.entries.remove(&oldest);
                tracing::debug!(key = %oldest, "evicted oldest cache entry");
            }
        }

        inner.order.push_back(key.to_owned());
        inner.entries.insert(key.to_owned(), value);
    }

    fn clear(&self) {
        let mut inner = self.lock();
        inner.entries.clear();
        inner.order.clear();
    }

    fn stats(&self) -> CacheStats {
        let inner = self.lock();
        CacheStats {
            hits: inner.hits,
            misses: inner.misses,
            size: inner.entries.len(),
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;
    use std::thread;

    use super::*;

    #[test]
    fn test_set_and_get() {
        let cache = MemoryCache::new();
        cache.set("docs/guide.md:100", "parsed".to_owned());

        assert_eq!(cache.get("docs/guide.md:100"), Some("parsed".to_owned()));
        assert_eq!(cache.get("docs/guide.md:200"), None);

        let stats = cache.stats();
        assert_eq!(stats.hits, 1);
        assert_eq!(stats.misses, 1);
        assert_eq!(stats.size, 1);
    }

    #[test]
    fn test_evicts_oldest_inserted_first() {
        let cache = MemoryCache::with_capacity(2);
        cache.set("a", 1);
        cache.set("b", 2);
        cache.set("c", 3);

        assert_eq!(cache.get("a"), None);
        assert_eq!(cache.get("b"), Some(2));
        assert_eq!(cache.get("c"), Some(3));
    }

    #[test]
    fn test_reads_do_not_protect_from_eviction() {
        let cache = MemoryCache::with_capacity(2);
        cache.set("a", 1);
        cache.set("b", 2);

        // An LRU would now evict "b"; FIFO still evicts "a".
        assert_eq!(cache.get("a"), Some(1));
        cache.set("c", 3);

        assert_eq!(cache.get("a"), None);
        assert_eq!(cache.get("b"), Some(2));
    }

    #[test]
    fn test_overwrite_keeps_insertion_position() {
        let cache = MemoryCache::with_capacity(2);
        cache.set("a", 1);
        cache.set("b", 2);
        cache.set("a", 10);

        assert_eq!(cache.stats().size, 2);
        assert_eq!(cache.get("a"), Some(10));

        cache.set("c", 3);
        assert_eq!(cache.get("a"), None);
        assert_eq!(cache.get("b"), Some(2));
    }

    #[test]
    fn test_zero_capacity_stores_nothing() {
        let cache = MemoryCache::with_capacity(0);
        cache.set("a", 1);
        assert_eq!(cache.get("a"), None);
        assert_eq!(cache.stats().size, 0);
    }

    #[test]
    fn test_clear_keeps_counters() {
        let cache = MemoryCache::new();
        cache.set("a", 1);
        assert_eq!(cache.get("a"), Some(1));

        cache.clear();

        assert_eq!(cache.get("a"), None);
        let stats = cache.stats();
        assert_eq!(stats.size, 0);
        assert_eq!(stats.hits, 1);
        assert_eq!(stats.misses, 1);
    }

    #[test]
    fn test_insert_after_clear_respects_capacity() {
        let cache = MemoryCache::with_capacity(1);
        cache.set("a", 1);
        cache.clear();
        cache.set("b", 2);
        cache.set("c", 3);

        assert_eq!(cache.stats().size, 1);
        assert_eq!(cache.get("c"), Some(3));
    }

    #[test]
    fn test_concurrent_access() {
        let cache = Arc::new(MemoryCache::with_capacity(16));

        let handles: Vec<_> = (0..8)
            .map(|t| {
                let cache = Arc::clone(&cache);
                thread::spawn(move || {
                    for i in 0..100 {
                        let key = format!("{t}-{i}");
                        cache.set(&key, i);
                        let _ = cache.get(&key);
                    }
                })
            })
            .collect();
        for handle in handles {
            handle.join().unwrap();
        }

        let stats = cache.stats();
        assert_eq!(stats.size, 16);
        assert_eq!(stats.hits + stats.misses, 800);
    }
}
