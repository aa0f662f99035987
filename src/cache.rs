//! Route resolution caching.
//!
//! This module provides [`RouteCache`], an LRU cache from normalized path to
//! [`MatchStack`]. Matching is deterministic for an immutable
//! [`RouteTable`], so a cached stack stays valid for the life of the table.
//! It is gated behind the `cache` feature flag and uses the [`lru`] crate
//! internally.
//!
//! [`CacheStats`] tracks hits, misses, and invalidations so you can monitor
//! cache effectiveness at runtime.
//!
//! # Examples
//!
//! ```
//! use workflow_navigator::cache::RouteCache;
//! use workflow_navigator::{Route, RouteTable};
//!
//! let table = RouteTable::new(vec![Route::new("/help").component("Help")]).unwrap();
//! let mut cache = RouteCache::new();
//!
//! cache.get_or_resolve(&table, "/help");
//! cache.get_or_resolve(&table, "/help/");
//!
//! assert_eq!(cache.stats().hits, 1);
//! assert_eq!(cache.stats().misses, 1);
//! ```

use crate::matching::normalize_path;
use crate::resolve::{resolve_match_stack, MatchStack};
use crate::table::RouteTable;
use crate::{debug_log, trace_log};
use lru::LruCache;
use std::num::NonZeroUsize;

/// Counters tracking cache hit/miss rates and invalidations.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CacheStats {
    /// Number of cache hits.
    pub hits: usize,
    /// Number of cache misses.
    pub misses: usize,
    /// Number of full cache invalidations (via [`RouteCache::clear`]).
    pub invalidations: usize,
}

impl CacheStats {
    /// Return the hit rate as a value in `0.0..=1.0`.
    ///
    /// Returns `0.0` if no lookups have been performed.
    pub fn hit_rate(&self) -> f64 {
        let total = self.hits + self.misses;
        if total == 0 {
            0.0
        } else {
            self.hits as f64 / total as f64
        }
    }
}

/// LRU cache for route resolution results.
#[derive(Debug)]
pub struct RouteCache {
    stacks: LruCache<String, MatchStack>,
    stats: CacheStats,
}

impl RouteCache {
    const DEFAULT_CAPACITY: usize = 256;

    /// Create a cache with the default capacity (256 entries).
    pub fn new() -> Self {
        Self::with_capacity(Self::DEFAULT_CAPACITY)
    }

    /// Create a cache with a custom capacity. Zero is raised to one.
    pub fn with_capacity(capacity: usize) -> Self {
        let cap = NonZeroUsize::new(capacity).unwrap_or(NonZeroUsize::MIN);
        Self {
            stacks: LruCache::new(cap),
            stats: CacheStats::default(),
        }
    }

    /// Look up the cached stack for an already-normalized `path`.
    ///
    /// Returns `None` on a cache miss. Updates hit/miss stats.
    pub fn get(&mut self, path: &str) -> Option<MatchStack> {
        if let Some(stack) = self.stacks.get(path) {
            self.stats.hits += 1;
            trace_log!("Match cache hit for path: '{}'", path);
            Some(stack.clone())
        } else {
            self.stats.misses += 1;
            trace_log!("Match cache miss for path: '{}'", path);
            None
        }
    }

    /// Store the stack for an already-normalized `path`.
    pub fn insert(&mut self, path: String, stack: MatchStack) {
        trace_log!("Caching {} levels for path '{}'", stack.len(), path);
        self.stacks.push(path, stack);
    }

    /// Return the cached stack for `path`, resolving and caching it on a miss.
    pub fn get_or_resolve(&mut self, table: &RouteTable, path: &str) -> MatchStack {
        let key = normalize_path(path);
        if let Some(stack) = self.get(&key) {
            return stack;
        }
        let stack = resolve_match_stack(table, &key);
        self.insert(key.into_owned(), stack.clone());
        stack
    }

    /// Drop every entry and increment the invalidation counter.
    pub fn clear(&mut self) {
        let len = self.stacks.len();
        self.stacks.clear();
        self.stats.invalidations += 1;
        debug_log!(
            "Match cache cleared: {} entries removed ({} total invalidations, hit rate: {:.1}%)",
            len,
            self.stats.invalidations,
            self.stats.hit_rate() * 100.0
        );
    }

    /// Return a reference to the current cache statistics.
    pub const fn stats(&self) -> &CacheStats {
        &self.stats
    }

    /// Change the capacity, evicting least recently used entries if the cache
    /// shrinks. Zero is raised to one.
    pub fn resize(&mut self, capacity: usize) {
        let cap = NonZeroUsize::new(capacity).unwrap_or(NonZeroUsize::MIN);
        if cap != self.stacks.cap() {
            trace_log!("Match cache resized: {} -> {}", self.stacks.cap(), cap);
            self.stacks.resize(cap);
        }
    }

    pub fn len(&self) -> usize {
        self.stacks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.stacks.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.stacks.cap().get()
    }
}

impl Default for RouteCache {
    fn default() -> Self {
        Self::new()
    }
}

impl Clone for RouteCache {
    fn clone(&self) -> Self {
        Self {
            stacks: LruCache::new(self.stacks.cap()),
            stats: self.stats.clone(),
        }
    }
}
