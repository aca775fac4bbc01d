//! Method-level caching for async operations.
//!
//! Operations are wrapped with one of three modes (read-through,
//! write-through or invalidate) and share a [`CacheRegistry`] holding the
//! named stores, the enable flag, the default TTL and the logger.
//!
//! ```ignore
//! use std::sync::Arc;
//! use futures_util::FutureExt;
//! use memento::{wrap, CacheMode, CacheOptions, Config};
//!
//! let registry = Arc::new(Config::from_env().build_registry()?);
//! let find_user = wrap(
//!     registry,
//!     CacheMode::ReadThrough,
//!     "find_user",
//!     CacheOptions::new().with_ttl(Duration::from_secs(60)),
//!     |repo: &UserRepository, (id,): (u64,)| repo.find(id).boxed(),
//! );
//! ```

pub mod config;
pub mod intercept;
pub mod memory;
pub mod registry;
pub mod telemetry;

pub use config::Config;
pub use intercept::{
    wrap, wrap_invalidate, CacheMode, CacheOptions, CallCacheableFn, InvalidatingOperation,
    Interceptor, OperationFn, SkipFn, WrappedOperation,
};
pub use memory::{MemoryStore, DEFAULT_MAX_ENTRIES};
pub use registry::{CacheRegistry, CacheablePredicate, RegistryConfig, DEFAULT_STORE_NAME};

pub use memento_core::cache::{
    CacheEntry, CacheError, CacheValue, InvalidationKeys, KeyGenerator, Result, Store,
};
pub use memento_core::logger::{CacheLogger, LoggerConfig};
