//! Cache registry.
//!
//! The registry owns the named store registrations and the settings every
//! interceptor consults on each call: the enable flag, the default TTL, the
//! cacheability predicate and the logger. A process-wide instance is
//! available through [`CacheRegistry::global`], and independent registries
//! can be created with [`CacheRegistry::new`] and injected where needed.
//!
//! Configuration changes are not coordinated with in-flight calls. Callers
//! should apply them before routing traffic through interceptors.

use std::fmt;
use std::sync::{Arc, OnceLock, PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};
use std::time::Duration;

use memento_core::cache::{is_cacheable, CacheError, CacheValue, Result, Store};
use memento_core::logger::{CacheLogger, DisabledLogger, LoggerConfig};

use crate::memory::MemoryStore;

/// Name under which the fallback in-memory store is registered.
pub const DEFAULT_STORE_NAME: &str = "default";

/// Predicate deciding whether a value may be stored.
pub type CacheablePredicate = Arc<dyn Fn(&CacheValue) -> bool + Send + Sync>;

/// Settings applied by [`CacheRegistry::initialize`].
///
/// Unset fields fall back to their defaults, never to the registry's
/// previous values. The logger is the exception: `None` keeps the current
/// logger.
#[derive(Clone)]
pub struct RegistryConfig {
    pub enabled: bool,
    pub default_ttl: Option<Duration>,
    pub is_cacheable: Option<CacheablePredicate>,
    pub logger: Option<LoggerConfig>,
}

impl RegistryConfig {
    pub fn new() -> Self {
        Self::default()
    }

    /// Starts with caching disabled.
    pub fn disabled(mut self) -> Self {
        self.enabled = false;
        self
    }

    pub fn with_default_ttl(mut self, ttl: Duration) -> Self {
        self.default_ttl = Some(ttl);
        self
    }

    pub fn with_cacheable<F>(mut self, predicate: F) -> Self
    where
        F: Fn(&CacheValue) -> bool + Send + Sync + 'static,
    {
        self.is_cacheable = Some(Arc::new(predicate));
        self
    }

    pub fn with_logger(mut self, logger: impl Into<LoggerConfig>) -> Self {
        self.logger = Some(logger.into());
        self
    }
}

impl Default for RegistryConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            default_ttl: None,
            is_cacheable: None,
            logger: None,
        }
    }
}

impl fmt::Debug for RegistryConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RegistryConfig")
            .field("enabled", &self.enabled)
            .field("default_ttl", &self.default_ttl)
            .field("is_cacheable", &self.is_cacheable.as_ref().map(|_| ".."))
            .field("logger", &self.logger)
            .finish()
    }
}

struct Settings {
    enabled: bool,
    default_ttl: Option<Duration>,
    is_cacheable: CacheablePredicate,
    logger: Arc<dyn CacheLogger>,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            enabled: true,
            default_ttl: None,
            is_cacheable: Arc::new(is_cacheable),
            logger: Arc::new(DisabledLogger),
        }
    }
}

/// Named stores plus the settings shared by every interceptor.
pub struct CacheRegistry {
    settings: RwLock<Settings>,
    /// Registrations in insertion order; the first one is the default store.
    stores: RwLock<Vec<(String, Arc<dyn Store>)>>,
}

static GLOBAL: OnceLock<Arc<CacheRegistry>> = OnceLock::new();

fn read<T>(lock: &RwLock<T>) -> RwLockReadGuard<'_, T> {
    lock.read().unwrap_or_else(PoisonError::into_inner)
}

fn write<T>(lock: &RwLock<T>) -> RwLockWriteGuard<'_, T> {
    lock.write().unwrap_or_else(PoisonError::into_inner)
}

impl CacheRegistry {
    /// Creates an enabled registry with no stores and a silent logger.
    pub fn new() -> Self {
        Self {
            settings: RwLock::new(Settings::default()),
            stores: RwLock::new(Vec::new()),
        }
    }

    /// Returns the process-wide registry, creating it on first use.
    pub fn global() -> Arc<CacheRegistry> {
        Arc::clone(GLOBAL.get_or_init(|| Arc::new(CacheRegistry::new())))
    }

    /// Replaces the enable flag, default TTL and cacheability predicate.
    ///
    /// The logger is only replaced when `config.logger` is set.
    pub fn initialize(&self, config: RegistryConfig) {
        let mut settings = write(&self.settings);
        settings.enabled = config.enabled;
        settings.default_ttl = config.default_ttl;
        settings.is_cacheable = config
            .is_cacheable
            .unwrap_or_else(|| Arc::new(is_cacheable));
        if let Some(logger) = config.logger {
            settings.logger = logger.into_logger();
        }
    }

    /// Registers `store` under `name`.
    ///
    /// Fails without modifying the registry when the name is empty or
    /// already taken.
    pub fn register(&self, name: impl Into<String>, store: Arc<dyn Store>) -> Result<()> {
        let name = name.into();
        if name.is_empty() {
            return Err(CacheError::Validation(
                "store name cannot be empty".to_string(),
            ));
        }

        let mut stores = write(&self.stores);
        if stores.iter().any(|(existing, _)| *existing == name) {
            return Err(CacheError::DuplicateRegistration(name));
        }

        tracing::debug!(store = %name, "Cache store registered");
        stores.push((name, store));
        Ok(())
    }

    /// Returns the store registered under `name`.
    pub fn get_store(&self, name: &str) -> Option<Arc<dyn Store>> {
        read(&self.stores)
            .iter()
            .find(|(existing, _)| existing == name)
            .map(|(_, store)| Arc::clone(store))
    }

    /// Like [`get_store`](Self::get_store), failing with
    /// [`CacheError::StoreNotFound`] when the name is unknown.
    pub fn require_store(&self, name: &str) -> Result<Arc<dyn Store>> {
        self.get_store(name)
            .ok_or_else(|| CacheError::StoreNotFound(name.to_string()))
    }

    /// Returns the first registered store.
    ///
    /// When nothing is registered, a [`MemoryStore`] is registered under
    /// [`DEFAULT_STORE_NAME`] first.
    pub fn get_default_store(&self) -> Arc<dyn Store> {
        if let Some((_, store)) = read(&self.stores).first() {
            return Arc::clone(store);
        }

        let mut stores = write(&self.stores);
        // Another caller may have registered a store between the two locks
        if let Some((_, store)) = stores.first() {
            return Arc::clone(store);
        }

        let store: Arc<dyn Store> = Arc::new(MemoryStore::new());
        stores.push((DEFAULT_STORE_NAME.to_string(), Arc::clone(&store)));
        tracing::debug!(store = DEFAULT_STORE_NAME, "Default memory store registered");
        store
    }

    /// Snapshot of all registrations, in insertion order.
    pub fn stores(&self) -> Vec<(String, Arc<dyn Store>)> {
        read(&self.stores)
            .iter()
            .map(|(name, store)| (name.clone(), Arc::clone(store)))
            .collect()
    }

    /// Removes every store registration.
    pub fn remove_all(&self) {
        write(&self.stores).clear();
    }

    pub fn enable(&self) {
        write(&self.settings).enabled = true;
    }

    pub fn disable(&self) {
        write(&self.settings).enabled = false;
    }

    pub fn is_enabled(&self) -> bool {
        read(&self.settings).enabled
    }

    /// Applies the configured cacheability predicate.
    pub fn is_cacheable(&self, value: &CacheValue) -> bool {
        let predicate = Arc::clone(&read(&self.settings).is_cacheable);
        predicate(value)
    }

    pub fn default_ttl(&self) -> Option<Duration> {
        read(&self.settings).default_ttl
    }

    pub fn logger(&self) -> Arc<dyn CacheLogger> {
        Arc::clone(&read(&self.settings).logger)
    }

    /// Restores the state of a freshly created registry.
    pub fn reset(&self) {
        *write(&self.settings) = Settings::default();
        self.remove_all();
    }
}

impl Default for CacheRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for CacheRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let names: Vec<String> = read(&self.stores)
            .iter()
            .map(|(name, _)| name.clone())
            .collect();
        f.debug_struct("CacheRegistry")
            .field("enabled", &self.is_enabled())
            .field("default_ttl", &self.default_ttl())
            .field("stores", &names)
            .finish()
    }
}
