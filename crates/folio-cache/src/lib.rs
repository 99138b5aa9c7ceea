//! Cache abstraction layer for Folio.
//!
//! This crate provides a generic [`Cache`] trait that decouples cache
//! consumers (the parser registry, template engines) from the storage
//! policy. Keys are opaque strings built by the caller, typically
//! `"{path}:{mtime}"`; the cache performs exact-match lookups only and never
//! checks freshness itself.
//!
//! # Implementations
//!
//! - [`NullCache`]: No-op implementation (always misses)
//! - [`MemoryCache`]: Mutex-guarded map with optional capacity and
//!   oldest-inserted-first eviction
//!
//! # Eviction policy
//!
//! [`MemoryCache`] evicts in **FIFO** order, not LRU. Reading an entry does
//! not refresh it, so a frequently re-read entry is evicted as soon as it
//! becomes the oldest insertion. Under re-access heavy workloads this gives
//! lower hit rates than LRU would.
//!
//! # Example
//!
//! ```
//! use folio_cache::{Cache, MemoryCache};
//!
//! let cache = MemoryCache::with_capacity(2);
//! cache.set("a", 1);
//! cache.set("b", 2);
//! cache.set("c", 3); // evicts "a"
//! assert_eq!(cache.get("a"), None);
//! assert_eq!(cache.get("c"), Some(3));
//! assert_eq!(cache.stats().size, 2);
//! ```

mod memory;
pub use memory::MemoryCache;

/// Hit/miss counters and current entry count.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct CacheStats {
    pub hits: u64,
    pub misses: u64,
    pub size: usize,
}

/// Keyed value store shared between concurrent readers and writers.
///
/// Values are returned by clone, so callers usually store `Arc`s.
pub trait Cache<V>: Send + Sync {
    /// Retrieve a cached value, counting a hit or a miss.
    fn get(&self, key: &str) -> Option<V>;

    /// Store a value, replacing any previous value for the same key.
    fn set(&self, key: &str, value: V);

    /// Remove every entry. Counters are kept.
    fn clear(&self);

    /// Current counters.
    fn stats(&self) -> CacheStats;
}

/// No-op [`Cache`] that never stores anything.
///
/// Every `get` is counted as a miss. Use when caching is disabled.
#[derive(Debug, Default)]
pub struct NullCache {
    misses: std::sync::atomic::AtomicU64,
}

impl<V> Cache<V> for NullCache {
    fn get(&self, _key: &str) -> Option<V> {
        self.misses
            .fetch_add(1, std::sync::atomic::Ordering::Relaxed);
        None
    }

    fn set(&self, _key: &str, _value: V) {}

    fn clear(&self) {}

    fn stats(&self) -> CacheStats {
        CacheStats {
            hits: 0,
            misses: self.misses.load(std::sync::atomic::Ordering::Relaxed),
            size: 0,
        }
    }
}
