//! Bounded in-memory cache with a uniform TTL.
//!
//! Entries live for the lifetime of the process at most. An entry is stale
//! once `now - inserted_at >= ttl`; stale entries are never returned and are
//! dropped lazily on access, on insert pressure, or by [`TtlCache::purge_expired`].
//!
//! When the cache is full the least recently used entry is evicted.
//! Time is read from [`tokio::time::Instant`], so tests can pause and advance
//! the clock.

use std::collections::HashMap;
use std::time::Duration;

use serde::Serialize;
use tokio::sync::Mutex;
use tokio::time::Instant;

/// Default TTL applied to every entry (1 hour).
pub const DEFAULT_TTL: Duration = Duration::from_secs(60 * 60);

/// Default maximum number of entries.
pub const DEFAULT_CAPACITY: usize = 1024;

struct Entry<V> {
    value: V,
    inserted_at: Instant,
    last_used: u64,
}

struct Inner<V> {
    entries: HashMap<String, Entry<V>>,
    tick: u64,
    hits: u64,
    misses: u64,
    evictions: u64,
}

impl<V> Inner<V> {
    fn next_tick(&mut self) -> u64 {
        self.tick += 1;
        self.tick
    }

    fn evict_lru(&mut self) -> bool {
        let oldest = self
            .entries
            .iter()
            .min_by_key(|(_, entry)| entry.last_used)
            .map(|(key, _)| key.clone());

        match oldest {
            Some(key) => {
                self.entries.remove(&key);
                self.evictions += 1;
                tracing::trace!(key = %key, "evicted least recently used cache entry");
                true
            }
            None => false,
        }
    }
}

/// Counters describing cache behaviour since construction.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct CacheStats {
    pub entries: usize,
    pub capacity: usize,
    pub hits: u64,
    pub misses: u64,
    pub evictions: u64,
}

/// Time-boxed, capacity-bounded key/value cache.
pub struct TtlCache<V> {
    inner: Mutex<Inner<V>>,
    ttl: Duration,
    capacity: usize,
}

impl<V: Clone> TtlCache<V> {
    /// Create a cache. A zero capacity is treated as one.
    pub fn new(ttl: Duration, capacity: usize) -> Self {
        Self {
            inner: Mutex::new(Inner {
                entries: HashMap::new(),
                tick: 0,
                hits: 0,
                misses: 0,
                evictions: 0,
            }),
            ttl,
            capacity: capacity.max(1),
        }
    }

    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    fn is_expired(&self, inserted_at: Instant, now: Instant) -> bool {
        now.saturating_duration_since(inserted_at) >= self.ttl
    }

    /// Return a fresh value for `key`, refreshing its recency.
    pub async fn get(&self, key: &str) -> Option<V> {
        let now = Instant::now();
        let mut inner = self.inner.lock().await;

        match inner.entries.get(key).map(|entry| self.is_expired(entry.inserted_at, now)) {
            None => {
                inner.misses += 1;
                return None;
            }
            Some(true) => {
                inner.entries.remove(key);
                inner.misses += 1;
                return None;
            }
            Some(false) => {}
        }

        let tick = inner.next_tick();
        inner.hits += 1;
        inner.entries.get_mut(key).map(|entry| {
            entry.last_used = tick;
            entry.value.clone()
        })
    }

    /// Insert or replace the value for `key`, restarting its TTL.
    pub async fn insert(&self, key: impl Into<String>, value: V) {
        let key = key.into();
        let now = Instant::now();
        let mut inner = self.inner.lock().await;

        if !inner.entries.contains_key(&key) && inner.entries.len() >= self.capacity {
            let ttl = self.ttl;
            inner.entries.retain(|_, entry| now.saturating_duration_since(entry.inserted_at) < ttl);
            while inner.entries.len() >= self.capacity {
                if !inner.evict_lru() {
                    break;
                }
            }
        }

        let tick = inner.next_tick();
        inner.entries.insert(key, Entry { value, inserted_at: now, last_used: tick });
    }

    /// Whether a fresh entry exists for `key`. Does not touch recency or counters.
    pub async fn contains(&self, key: &str) -> bool {
        let now = Instant::now();
        let inner = self.inner.lock().await;
        inner
            .entries
            .get(key)
            .is_some_and(|entry| !self.is_expired(entry.inserted_at, now))
    }

    pub async fn invalidate(&self, key: &str) -> bool {
        self.inner.lock().await.entries.remove(key).is_some()
    }

    /// Drop every stale entry, returning how many were removed.
    pub async fn purge_expired(&self) -> usize {
        let now = Instant::now();
        let mut inner = self.inner.lock().await;
        let before = inner.entries.len();
        let ttl = self.ttl;
        inner.entries.retain(|_, entry| now.saturating_duration_since(entry.inserted_at) < ttl);
        before - inner.entries.len()
    }

    /// Drop every entry, returning how many were removed.
    pub async fn clear(&self) -> usize {
        let mut inner = self.inner.lock().await;
        let count = inner.entries.len();
        inner.entries.clear();
        count
    }

    /// Number of stored entries, including stale ones not yet purged.
    pub async fn len(&self) -> usize {
        self.inner.lock().await.entries.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }

    pub async fn stats(&self) -> CacheStats {
        let inner = self.inner.lock().await;
        CacheStats {
            entries: inner.entries.len(),
            capacity: self.capacity,
            hits: inner.hits,
            misses: inner.misses,
            evictions: inner.evictions,
        }
    }
}

impl<V: Clone> Default for TtlCache<V> {
    fn default() -> Self {
        Self::new(DEFAULT_TTL, DEFAULT_CAPACITY)
    }
}
