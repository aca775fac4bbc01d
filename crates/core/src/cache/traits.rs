use std::time::Duration;

use async_trait::async_trait;
use serde_json::Value;

use super::Result;

/// Opaque payload held by a cache store.
pub type CacheValue = Value;

/// A key/value pair to write with [`Store::set_many`].
#[derive(Debug, Clone, PartialEq)]
pub struct CacheEntry {
    pub key: String,
    pub value: CacheValue,
    pub ttl: Option<Duration>,
}

impl CacheEntry {
    /// Creates an entry without expiry.
    pub fn new(key: impl Into<String>, value: CacheValue) -> Self {
        Self {
            key: key.into(),
            value,
            ttl: None,
        }
    }

    /// Sets the time-to-live for this entry.
    pub fn with_ttl(mut self, ttl: Duration) -> Self {
        self.ttl = Some(ttl);
        self
    }
}

/// Capability set every pluggable cache backend must provide.
///
/// Only `get`, `set` and `delete_many` are required. The batch operations
/// default to per-key calls, in order, so backends with native batching can
/// override them.
#[async_trait]
pub trait Store: Send + Sync {
    /// Gets a value by key. Returns `None` when missing or expired.
    async fn get(&self, key: &str) -> Result<Option<CacheValue>>;

    /// Sets a value with an optional TTL, overwriting any existing entry.
    async fn set(&self, key: &str, value: CacheValue, ttl: Option<Duration>) -> Result<bool>;

    /// Deletes every key in `keys`. Missing keys are not an error.
    async fn delete_many(&self, keys: &[String]) -> Result<bool>;

    /// Gets several values. The result is aligned with `keys`.
    async fn get_many(&self, keys: &[String]) -> Result<Vec<Option<CacheValue>>> {
        let mut values = Vec::with_capacity(keys.len());
        for key in keys {
            values.push(self.get(key).await?);
        }
        Ok(values)
    }

    /// Sets several entries. The result is aligned with `entries`.
    async fn set_many(&self, entries: Vec<CacheEntry>) -> Result<Vec<bool>> {
        let mut results = Vec::with_capacity(entries.len());
        for entry in entries {
            results.push(self.set(&entry.key, entry.value, entry.ttl).await?);
        }
        Ok(results)
    }

    /// Deletes a single key.
    async fn delete(&self, key: &str) -> Result<bool> {
        self.delete_many(&[key.to_string()]).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use std::collections::HashMap;
    use std::sync::Mutex;

    /// Minimal store that only implements the required methods.
    struct MapStore {
        values: Mutex<HashMap<String, CacheValue>>,
    }

    impl MapStore {
        fn new() -> Self {
            Self {
                values: Mutex::new(HashMap::new()),
            }
        }
    }

    #[async_trait]
    impl Store for MapStore {
        async fn get(&self, key: &str) -> Result<Option<CacheValue>> {
            Ok(self.values.lock().unwrap().get(key).cloned())
        }

        async fn set(&self, key: &str, value: CacheValue, _ttl: Option<Duration>) -> Result<bool> {
            self.values.lock().unwrap().insert(key.to_string(), value);
            Ok(true)
        }

        async fn delete_many(&self, keys: &[String]) -> Result<bool> {
            let mut values = self.values.lock().unwrap();
            for key in keys {
                values.remove(key);
            }
            Ok(true)
        }
    }

    #[tokio::test]
    async fn test_default_get_many_is_aligned() {
        let store = MapStore::new();
        store.set("a", json!(1), None).await.unwrap();
        store.set("c", json!(3), None).await.unwrap();

        let keys = vec!["a".to_string(), "b".to_string(), "c".to_string()];
        let values = store.get_many(&keys).await.unwrap();

        assert_eq!(values, vec![Some(json!(1)), None, Some(json!(3))]);
    }

    #[tokio::test]
    async fn test_default_set_many_preserves_order() {
        let store = MapStore::new();
        let entries = vec![
            CacheEntry::new("key1", json!("value1")),
            CacheEntry::new("key2", json!(123)),
            CacheEntry::new("key3", json!({"a": 1})).with_ttl(Duration::from_secs(5)),
        ];

        let results = store.set_many(entries).await.unwrap();

        assert_eq!(results, vec![true, true, true]);
        assert_eq!(store.get("key3").await.unwrap(), Some(json!({"a": 1})));
    }

    #[tokio::test]
    async fn test_default_delete_single_key() {
        let store = MapStore::new();
        store.set("gone", json!(true), None).await.unwrap();

        assert!(store.delete("gone").await.unwrap());
        assert!(store.get("gone").await.unwrap().is_none());
        // Deleting again is not an error
        assert!(store.delete("gone").await.unwrap());
    }
}
