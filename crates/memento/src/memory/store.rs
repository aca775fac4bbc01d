//! In-memory store with FIFO eviction.
//!
//! Provides a thread-safe in-memory store with TTL support using tokio
//! synchronization primitives. Entries are kept in insertion order: reads
//! and in-place updates never reorder them, so the oldest inserted entry is
//! always the next one evicted.

use std::time::{Duration, Instant};

use async_trait::async_trait;
use lru::LruCache;
use tokio::sync::RwLock;

use memento_core::cache::{CacheValue, Result, Store};

/// Default capacity, large enough to be effectively unbounded.
pub const DEFAULT_MAX_ENTRIES: usize = (1 << 24) - 1;

/// A single stored value with optional expiration.
#[derive(Debug, Clone)]
struct StoredEntry {
    value: CacheValue,
    expires_at: Option<Instant>,
}

impl StoredEntry {
    /// Creates a new entry. A zero TTL means the entry never expires.
    fn new(value: CacheValue, ttl: Option<Duration>) -> Self {
        let expires_at = ttl.filter(|d| !d.is_zero()).map(|d| Instant::now() + d);
        Self { value, expires_at }
    }

    /// Returns true if this entry has expired.
    fn is_expired(&self) -> bool {
        self.expires_at.is_some_and(|exp| Instant::now() >= exp)
    }
}

/// Bounded in-memory store with lazy TTL expiry and FIFO eviction.
///
/// The entry map is an unbounded `LruCache` that is only ever touched
/// through non-promoting calls (`peek`, `peek_mut`, `push`, `pop`), so its
/// "least recently used" end is the oldest inserted entry. Capacity is
/// enforced here rather than by the map itself.
///
/// Expired entries are removed when a `get` finds them; there is no
/// background sweep.
#[derive(Debug)]
pub struct MemoryStore {
    entries: RwLock<LruCache<String, StoredEntry>>,
    max_entries: usize,
}

impl MemoryStore {
    /// Creates a store holding up to [`DEFAULT_MAX_ENTRIES`] entries.
    pub fn new() -> Self {
        Self::with_max_entries(DEFAULT_MAX_ENTRIES)
    }

    /// Creates a store that evicts its oldest entry beyond `max_entries`.
    ///
    /// A capacity of zero is treated as one.
    pub fn with_max_entries(max_entries: usize) -> Self {
        Self {
            entries: RwLock::new(LruCache::unbounded()),
            max_entries: max_entries.max(1),
        }
    }

    /// Maximum number of entries before eviction.
    pub fn max_entries(&self) -> usize {
        self.max_entries
    }

    /// Number of stored entries, including expired ones not yet collected.
    pub async fn len(&self) -> usize {
        self.entries.read().await.len()
    }

    /// Returns true if the store holds no entries.
    pub async fn is_empty(&self) -> bool {
        self.entries.read().await.is_empty()
    }
}

impl Default for MemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Store for MemoryStore {
    async fn get(&self, key: &str) -> Result<Option<CacheValue>> {
        let mut entries = self.entries.write().await;

        match entries.peek(key) {
            Some(entry) if entry.is_expired() => {
                entries.pop(key);
                tracing::trace!(key, "Expired entry removed");
                Ok(None)
            }
            Some(entry) => Ok(Some(entry.value.clone())),
            None => Ok(None),
        }
    }

    async fn set(&self, key: &str, value: CacheValue, ttl: Option<Duration>) -> Result<bool> {
        let mut entries = self.entries.write().await;
        let entry = StoredEntry::new(value, ttl);

        // Updating in place keeps the key's original insertion position
        if let Some(existing) = entries.peek_mut(key) {
            *existing = entry;
            return Ok(true);
        }

        if entries.len() >= self.max_entries {
            if let Some((evicted, _)) = entries.pop_lru() {
                tracing::trace!(key = %evicted, "Oldest entry evicted");
            }
        }
        entries.push(key.to_string(), entry);

        Ok(true)
    }

    async fn delete_many(&self, keys: &[String]) -> Result<bool> {
        let mut entries = self.entries.write().await;
        for key in keys {
            entries.pop(key);
        }
        Ok(true)
    }

    async fn get_many(&self, keys: &[String]) -> Result<Vec<Option<CacheValue>>> {
        let mut entries = self.entries.write().await;
        let mut values = Vec::with_capacity(keys.len());

        for key in keys {
            let value = match entries.peek(key) {
                Some(entry) if entry.is_expired() => {
                    entries.pop(key);
                    None
                }
                Some(entry) => Some(entry.value.clone()),
                None => None,
            };
            values.push(value);
        }

        Ok(values)
    }
}
