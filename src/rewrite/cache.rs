//! Bounded memo of spliced paths.

use std::num::NonZeroUsize;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Mutex;

use lru::LruCache;

use crate::observability::metrics;

/// Default number of entries per strategy.
pub const DEFAULT_CAPACITY: usize = 100;

/// Identifies one path-splicing computation.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CacheKey {
    /// Encoded path of the replacement base URL.
    pub replacement_path: String,
    /// Encoded path of the request URL.
    pub original_path: String,
    /// Number of leading segments dropped, `None` for domain mode.
    pub path_size: Option<usize>,
}

impl CacheKey {
    pub fn new(replacement_path: &str, original_path: &str, path_size: Option<usize>) -> Self {
        Self {
            replacement_path: replacement_path.to_string(),
            original_path: original_path.to_string(),
            path_size,
        }
    }
}

/// Hit and miss counts for one cache.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CacheStats {
    pub hits: u64,
    pub misses: u64,
}

/// Least-recently-used cache from [`CacheKey`] to an encoded path.
#[derive(Debug)]
pub struct RewriteCache {
    name: &'static str,
    entries: Mutex<LruCache<CacheKey, String>>,
    hits: AtomicU64,
    misses: AtomicU64,
}

impl RewriteCache {
    /// Create a cache; a zero capacity is bumped to one.
    pub fn new(name: &'static str, capacity: usize) -> Self {
        let capacity = NonZeroUsize::new(capacity).unwrap_or(NonZeroUsize::MIN);
        Self {
            name,
            entries: Mutex::new(LruCache::new(capacity)),
            hits: AtomicU64::new(0),
            misses: AtomicU64::new(0),
        }
    }

    /// Look up a path, marking it most recently used.
    pub fn get(&self, key: &CacheKey) -> Option<String> {
        let found = self
            .entries
            .lock()
            .expect("rewrite cache mutex poisoned")
            .get(key)
            .cloned();

        if found.is_some() {
            self.hits.fetch_add(1, Ordering::Relaxed);
        } else {
            self.misses.fetch_add(1, Ordering::Relaxed);
        }
        metrics::record_cache_lookup(self.name, found.is_some());
        found
    }

    pub fn put(&self, key: CacheKey, path: String) {
        self.entries
            .lock()
            .expect("rewrite cache mutex poisoned")
            .put(key, path);
    }

    /// Return the cached path for `key`, computing and storing it on a miss.
    /// The computation runs outside the lock.
    pub fn get_or_try_insert<E>(
        &self,
        key: CacheKey,
        compute: impl FnOnce() -> Result<String, E>,
    ) -> Result<String, E> {
        if let Some(path) = self.get(&key) {
            return Ok(path);
        }
        let path = compute()?;
        self.put(key, path.clone());
        Ok(path)
    }

    pub fn len(&self) -> usize {
        self.entries.lock().expect("rewrite cache mutex poisoned").len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn capacity(&self) -> usize {
        self.entries.lock().expect("rewrite cache mutex poisoned").cap().get()
    }

    pub fn stats(&self) -> CacheStats {
        CacheStats {
            hits: self.hits.load(Ordering::Relaxed),
            misses: self.misses.load(Ordering::Relaxed),
        }
    }
}
