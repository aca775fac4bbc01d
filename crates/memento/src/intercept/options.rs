use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use memento_core::cache::{CacheValue, InvalidationKeys, KeyGenerator};

/// Predicate deciding from the call arguments whether to bypass the cache.
pub type SkipFn<R, A> = Arc<dyn Fn(&R, &A) -> bool + Send + Sync>;

/// Call-site cacheability predicate, checked after the registry's own.
pub type CallCacheableFn<R, A> = Arc<dyn Fn(&R, &CacheValue, &A) -> bool + Send + Sync>;

/// Per-operation caching options.
///
/// `R` is the receiver the operation is attached to and `A` its argument
/// list (usually a tuple). Which fields matter depends on the mode:
/// invalidating calls use `keys`, the other two use `key`, `ttl` and
/// `is_cacheable`.
pub struct CacheOptions<R, A> {
    pub(crate) store: Option<String>,
    pub(crate) skip: Option<SkipFn<R, A>>,
    pub(crate) key: KeyGenerator<R, A>,
    pub(crate) keys: Option<InvalidationKeys<R, A>>,
    pub(crate) ttl: Option<Duration>,
    pub(crate) is_cacheable: Option<CallCacheableFn<R, A>>,
}

impl<R, A> CacheOptions<R, A> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Uses the store registered under `name` instead of the default one.
    pub fn with_store(mut self, name: impl Into<String>) -> Self {
        self.store = Some(name.into());
        self
    }

    /// Bypasses the cache for calls where `skip` returns true.
    pub fn with_skip<F>(mut self, skip: F) -> Self
    where
        F: Fn(&R, &A) -> bool + Send + Sync + 'static,
    {
        self.skip = Some(Arc::new(skip));
        self
    }

    /// Sets the key generator. Strings select a fixed key.
    pub fn with_key(mut self, key: impl Into<KeyGenerator<R, A>>) -> Self {
        self.key = key.into();
        self
    }

    /// Sets the keys an invalidating call removes.
    pub fn with_keys(mut self, keys: impl Into<InvalidationKeys<R, A>>) -> Self {
        self.keys = Some(keys.into());
        self
    }

    /// Overrides the registry's default TTL.
    pub fn with_ttl(mut self, ttl: Duration) -> Self {
        self.ttl = Some(ttl);
        self
    }

    /// Adds a call-site cacheability check on the fresh value.
    pub fn with_cacheable<F>(mut self, predicate: F) -> Self
    where
        F: Fn(&R, &CacheValue, &A) -> bool + Send + Sync + 'static,
    {
        self.is_cacheable = Some(Arc::new(predicate));
        self
    }

    pub fn store(&self) -> Option<&str> {
        self.store.as_deref()
    }

    pub fn ttl(&self) -> Option<Duration> {
        self.ttl
    }
}

impl<R, A> Default for CacheOptions<R, A> {
    fn default() -> Self {
        Self {
            store: None,
            skip: None,
            key: KeyGenerator::Default,
            keys: None,
            ttl: None,
            is_cacheable: None,
        }
    }
}

impl<R, A> Clone for CacheOptions<R, A> {
    fn clone(&self) -> Self {
        Self {
            store: self.store.clone(),
            skip: self.skip.clone(),
            key: self.key.clone(),
            keys: self.keys.clone(),
            ttl: self.ttl,
            is_cacheable: self.is_cacheable.clone(),
        }
    }
}

impl<R, A> fmt::Debug for CacheOptions<R, A> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CacheOptions")
            .field("store", &self.store)
            .field("skip", &self.skip.as_ref().map(|_| ".."))
            .field("key", &self.key)
            .field("keys", &self.keys)
            .field("ttl", &self.ttl)
            .field("is_cacheable", &self.is_cacheable.as_ref().map(|_| ".."))
            .finish()
    }
}
