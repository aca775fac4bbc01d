use std::{env, sync::Arc, time::Duration};

use memento_core::cache::Result;
use memento_core::logger::LoggerConfig;

use crate::memory::{MemoryStore, DEFAULT_MAX_ENTRIES};
use crate::registry::{CacheRegistry, RegistryConfig, DEFAULT_STORE_NAME};

/// Cache configuration loaded from environment variables.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    /// Whether interceptors use the cache at all (default: true)
    pub enabled: bool,
    /// Default entry TTL in milliseconds (default: none, entries never expire)
    pub default_ttl_ms: Option<u64>,
    /// Capacity of the default memory store (default: 16,777,215)
    pub max_entries: usize,
    /// Emit cache events as JSON records (default: true)
    pub json_logging: bool,
}

impl Config {
    /// Load configuration from environment variables.
    ///
    /// Environment variables:
    /// - `MEMENTO_ENABLED` - `false` or `0` disables caching (default: true)
    /// - `MEMENTO_DEFAULT_TTL_MS` - Default TTL in milliseconds (default: unset)
    /// - `MEMENTO_MAX_ENTRIES` - Memory store capacity (default: 16,777,215)
    /// - `MEMENTO_LOG` - `off` or `json` (default: json)
    pub fn from_env() -> Self {
        Self::from_lookup(|name| env::var(name).ok())
    }

    /// Same as [`from_env`](Self::from_env), reading variables through `lookup`.
    ///
    /// Unparseable values fall back to their defaults.
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        Self {
            enabled: lookup("MEMENTO_ENABLED")
                .map(|v| !matches!(v.trim().to_ascii_lowercase().as_str(), "false" | "0" | "off"))
                .unwrap_or(true),
            default_ttl_ms: lookup("MEMENTO_DEFAULT_TTL_MS").and_then(|v| v.trim().parse().ok()),
            max_entries: lookup("MEMENTO_MAX_ENTRIES")
                .and_then(|v| v.trim().parse().ok())
                .unwrap_or(DEFAULT_MAX_ENTRIES),
            json_logging: lookup("MEMENTO_LOG")
                .map(|v| !v.trim().eq_ignore_ascii_case("off"))
                .unwrap_or(true),
        }
    }

    /// Get the default TTL as a Duration.
    pub fn default_ttl(&self) -> Option<Duration> {
        self.default_ttl_ms.map(Duration::from_millis)
    }

    pub fn registry_config(&self) -> RegistryConfig {
        let mut config = RegistryConfig::new().with_logger(LoggerConfig::from(self.json_logging));
        config.enabled = self.enabled;
        config.default_ttl = self.default_ttl();
        config
    }

    pub fn memory_store(&self) -> MemoryStore {
        MemoryStore::with_max_entries(self.max_entries)
    }

    /// Builds a registry with these settings and a memory store registered
    /// as the default store.
    pub fn build_registry(&self) -> Result<CacheRegistry> {
        let registry = CacheRegistry::new();
        registry.initialize(self.registry_config());
        registry.register(DEFAULT_STORE_NAME, Arc::new(self.memory_store()))?;

        tracing::info!(
            enabled = self.enabled,
            default_ttl_ms = ?self.default_ttl_ms,
            max_entries = self.max_entries,
            "Cache registry configured"
        );

        Ok(registry)
    }
}

impl Default for Config {
    fn default() -> Self {
        Self::from_env()
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    fn lookup(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |name| vars.get(name).cloned()
    }

    #[test]
    fn test_default_values() {
        let config = Config::from_lookup(lookup(&[]));

        assert!(config.enabled);
        assert_eq!(config.default_ttl_ms, None);
        assert_eq!(config.max_entries, DEFAULT_MAX_ENTRIES);
        assert!(config.json_logging);
    }

    #[test]
    fn test_values_from_variables() {
        let config = Config::from_lookup(lookup(&[
            ("MEMENTO_ENABLED", "false"),
            ("MEMENTO_DEFAULT_TTL_MS", "1500"),
            ("MEMENTO_MAX_ENTRIES", "100"),
            ("MEMENTO_LOG", "off"),
        ]));

        assert!(!config.enabled);
        assert_eq!(config.default_ttl(), Some(Duration::from_millis(1500)));
        assert_eq!(config.max_entries, 100);
        assert!(!config.json_logging);
    }

    #[test]
    fn test_invalid_numbers_fall_back() {
        let config = Config::from_lookup(lookup(&[
            ("MEMENTO_DEFAULT_TTL_MS", "soon"),
            ("MEMENTO_MAX_ENTRIES", "-3"),
        ]));

        assert_eq!(config.default_ttl_ms, None);
        assert_eq!(config.max_entries, DEFAULT_MAX_ENTRIES);
    }

    #[test]
    fn test_build_registry() {
        let config = Config::from_lookup(lookup(&[
            ("MEMENTO_DEFAULT_TTL_MS", "250"),
            ("MEMENTO_MAX_ENTRIES", "10"),
            ("MEMENTO_LOG", "off"),
        ]));

        let registry = config.build_registry().unwrap();

        assert!(registry.is_enabled());
        assert_eq!(registry.default_ttl(), Some(Duration::from_millis(250)));
        let names: Vec<String> = registry.stores().into_iter().map(|(n, _)| n).collect();
        assert_eq!(names, vec![DEFAULT_STORE_NAME]);
    }

    #[test]
    fn test_memory_store_capacity() {
        let config = Config::from_lookup(lookup(&[("MEMENTO_MAX_ENTRIES", "3")]));

        assert_eq!(config.memory_store().max_entries(), 3);
    }
}
