//! Interception protocol.
//!
//! An [`Interceptor`] wraps calls to an async operation with one of three
//! caching modes:
//!
//! - **Read-through**: return the stored value on a hit; on a miss run the
//!   operation and store its result
//! - **Write-through**: always run the operation and overwrite the stored
//!   value with its result
//! - **Invalidate**: run the operation, then delete the configured keys
//!
//! Every mode first checks whether the cache applies to the call at all. A
//! disabled registry, a skip predicate returning true, or a named store
//! that is not registered make the call go straight to the operation.
//!
//! Store failures are returned to the caller through `E: From<CacheError>`;
//! the operation's own errors are returned untouched and never cached.
//!
//! # Example
//!
//! ```ignore
//! use std::sync::Arc;
//! use memento::{CacheMode, CacheOptions, CacheRegistry, Interceptor};
//!
//! let registry = Arc::new(CacheRegistry::new());
//! let find_user = Interceptor::new(
//!     registry,
//!     CacheMode::ReadThrough,
//!     "find_user",
//!     CacheOptions::new().with_ttl(Duration::from_secs(300)),
//! );
//!
//! let user = find_user
//!     .call(&service, &(user_id,), || service.load_user(user_id))
//!     .await?;
//! ```

mod invalidate;
mod options;
mod read_through;
mod wrap;
mod write_through;

pub use options::{CacheOptions, CallCacheableFn, SkipFn};
pub use wrap::{wrap, wrap_invalidate, InvalidatingOperation, OperationFn, WrappedOperation};

use std::fmt;
use std::future::Future;
use std::sync::Arc;

use serde::{de::DeserializeOwned, Serialize};
use serde_json::Value;

use memento_core::cache::{short_type_name, CacheError, Store};
use memento_core::logger::CacheLogger;

use crate::registry::CacheRegistry;

/// Caching behavior applied around an operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CacheMode {
    ReadThrough,
    WriteThrough,
    Invalidate,
}

impl fmt::Display for CacheMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::ReadThrough => "read-through",
            Self::WriteThrough => "write-through",
            Self::Invalidate => "invalidate",
        };
        f.write_str(name)
    }
}

/// Applies a [`CacheMode`] to calls of one named operation.
pub struct Interceptor<R, A> {
    registry: Arc<CacheRegistry>,
    mode: CacheMode,
    operation: String,
    options: CacheOptions<R, A>,
}

impl<R, A> Interceptor<R, A> {
    pub fn new(
        registry: Arc<CacheRegistry>,
        mode: CacheMode,
        operation: impl Into<String>,
        options: CacheOptions<R, A>,
    ) -> Self {
        Self {
            registry,
            mode,
            operation: operation.into(),
            options,
        }
    }

    /// Creates an interceptor bound to the process-wide registry.
    pub fn global(mode: CacheMode, operation: impl Into<String>, options: CacheOptions<R, A>) -> Self {
        Self::new(CacheRegistry::global(), mode, operation, options)
    }

    pub fn mode(&self) -> CacheMode {
        self.mode
    }

    pub fn operation(&self) -> &str {
        &self.operation
    }

    pub fn registry(&self) -> &Arc<CacheRegistry> {
        &self.registry
    }
}

impl<R, A> Interceptor<R, A>
where
    A: Serialize,
{
    /// Runs `operation` for the call of this operation on `receiver` with
    /// `args`, applying the interceptor's caching mode.
    pub async fn call<T, E, F, Fut>(&self, receiver: &R, args: &A, operation: F) -> Result<T, E>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<T, E>>,
        T: Serialize + DeserializeOwned,
        E: From<CacheError>,
    {
        let Some(ctx) = self.context(receiver, args) else {
            return operation().await;
        };

        match self.mode {
            CacheMode::ReadThrough => read_through::run(ctx, operation).await,
            CacheMode::WriteThrough => write_through::run(ctx, operation).await,
            CacheMode::Invalidate => invalidate::run(ctx, operation).await,
        }
    }

    /// Runs `operation` as an invalidating call, whatever the interceptor's
    /// mode.
    ///
    /// Invalidation never stores the operation's output, so unlike
    /// [`call`](Self::call) it places no serde bounds on `T`.
    pub async fn call_invalidate<T, E, F, Fut>(
        &self,
        receiver: &R,
        args: &A,
        operation: F,
    ) -> Result<T, E>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<T, E>>,
        E: From<CacheError>,
    {
        let Some(ctx) = self.context(receiver, args) else {
            return operation().await;
        };

        invalidate::run(ctx, operation).await
    }

    /// Builds the per-call context, or `None` when the call bypasses the
    /// cache.
    fn context<'a>(&'a self, receiver: &'a R, args: &'a A) -> Option<CallContext<'a, R, A>> {
        let label = format!("[{}:{}]", short_type_name::<R>(), self.operation);
        let logger = self.registry.logger();
        let store = self.resolve_store(receiver, args, &label, logger.as_ref())?;

        Some(CallContext {
            registry: &self.registry,
            options: &self.options,
            store,
            logger,
            receiver,
            args,
            operation: &self.operation,
            label,
        })
    }

    /// Returns the store for this call, or `None` when the call must bypass
    /// the cache.
    fn resolve_store(
        &self,
        receiver: &R,
        args: &A,
        label: &str,
        logger: &dyn CacheLogger,
    ) -> Option<Arc<dyn Store>> {
        if !self.registry.is_enabled() {
            logger.info(
                &format!(
                    "{label} Cache skipped. Cache registry is disabled. Call CacheRegistry::enable() to enable cache."
                ),
                &[],
            );
            return None;
        }

        if let Some(skip) = &self.options.skip {
            if skip(receiver, args) {
                let args_json = serde_json::to_value(args).unwrap_or(Value::Null);
                logger.info(
                    &format!("{label} Cache skipped. Skip predicate returned true"),
                    &[args_json],
                );
                return None;
            }
        }

        match &self.options.store {
            Some(name) => {
                let store = self.registry.get_store(name);
                if store.is_none() {
                    logger.warn(
                        &format!(
                            "{label} Cache skipped. Cache store '{name}' is not registered in CacheRegistry."
                        ),
                        &[],
                    );
                }
                store
            }
            None => Some(self.registry.get_default_store()),
        }
    }
}

impl<R, A> fmt::Debug for Interceptor<R, A> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Interceptor")
            .field("mode", &self.mode)
            .field("operation", &self.operation)
            .field("options", &self.options)
            .finish()
    }
}

/// Everything a caching mode needs for one call.
pub(crate) struct CallContext<'a, R, A> {
    registry: &'a CacheRegistry,
    options: &'a CacheOptions<R, A>,
    store: Arc<dyn Store>,
    logger: Arc<dyn CacheLogger>,
    receiver: &'a R,
    args: &'a A,
    operation: &'a str,
    label: String,
}

impl<R, A> CallContext<'_, R, A>
where
    A: Serialize,
{
    fn cache_key(&self) -> Result<String, CacheError> {
        self.options
            .key
            .generate(self.receiver, self.operation, self.args)
    }

    /// Serializes `value` and stores it under `key` when both the registry
    /// and the call-site predicates accept it. Returns whether it was stored.
    ///
    /// A value that cannot be serialized is not cacheable; only store
    /// failures are returned as errors.
    async fn store_if_cacheable<T>(&self, key: Option<&str>, value: &T) -> Result<bool, CacheError>
    where
        T: Serialize,
    {
        let payload = match serde_json::to_value(value) {
            Ok(payload) => payload,
            Err(err) => {
                self.logger.warn(
                    &format!("{} Cache not saved. Value is not cacheable", self.label),
                    &[Value::from(err.to_string())],
                );
                return Ok(false);
            }
        };

        let call_site_ok = self
            .options
            .is_cacheable
            .as_ref()
            .is_none_or(|predicate| predicate(self.receiver, &payload, self.args));
        if !(self.registry.is_cacheable(&payload) && call_site_ok) {
            self.logger.warn(
                &format!("{} Cache not saved. Value is not cacheable", self.label),
                &[],
            );
            return Ok(false);
        }

        let key = match key {
            Some(key) => key.to_string(),
            None => self.cache_key()?,
        };
        let ttl = self.options.ttl.or_else(|| self.registry.default_ttl());

        self.store.set(&key, payload, ttl).await?;
        Ok(true)
    }
}
