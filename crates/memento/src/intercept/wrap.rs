use std::fmt;
use std::sync::Arc;

use futures_util::future::BoxFuture;
use serde::{de::DeserializeOwned, Serialize};

use memento_core::cache::CacheError;

use super::{CacheMode, CacheOptions, Interceptor};
use crate::registry::CacheRegistry;

/// Async operation taking a borrowed receiver and owned arguments.
pub type OperationFn<R, A, T, E> =
    Arc<dyn for<'r> Fn(&'r R, A) -> BoxFuture<'r, Result<T, E>> + Send + Sync>;

/// An operation bound to its caching behavior.
///
/// Created by [`wrap`]. [`invoke`](Self::invoke) has the same inputs and
/// outputs as the wrapped operation.
pub struct WrappedOperation<R, A, T, E> {
    interceptor: Interceptor<R, A>,
    operation: OperationFn<R, A, T, E>,
}

/// Wraps `operation` so every invocation goes through `mode`.
///
/// # Example
///
/// ```ignore
/// use futures_util::FutureExt;
///
/// let find_user = memento::wrap(
///     registry,
///     CacheMode::ReadThrough,
///     "find_user",
///     CacheOptions::new(),
///     |svc: &UserService, (id,): (u64,)| svc.find_user(id).boxed(),
/// );
///
/// let user = find_user.invoke(&service, (42,)).await?;
/// ```
pub fn wrap<R, A, T, E, F>(
    registry: Arc<CacheRegistry>,
    mode: CacheMode,
    name: impl Into<String>,
    options: CacheOptions<R, A>,
    operation: F,
) -> WrappedOperation<R, A, T, E>
where
    F: for<'r> Fn(&'r R, A) -> BoxFuture<'r, Result<T, E>> + Send + Sync + 'static,
{
    WrappedOperation {
        interceptor: Interceptor::new(registry, mode, name, options),
        operation: Arc::new(operation),
    }
}

impl<R, A, T, E> WrappedOperation<R, A, T, E> {
    pub fn interceptor(&self) -> &Interceptor<R, A> {
        &self.interceptor
    }
}

impl<R, A, T, E> WrappedOperation<R, A, T, E>
where
    A: Serialize + Clone,
    T: Serialize + DeserializeOwned,
    E: From<CacheError>,
{
    /// Calls the operation on `receiver` with `args` through the cache.
    pub async fn invoke(&self, receiver: &R, args: A) -> Result<T, E> {
        let operation = &self.operation;
        self.interceptor
            .call(receiver, &args, || operation(receiver, args.clone()))
            .await
    }
}

impl<R, A, T, E> fmt::Debug for WrappedOperation<R, A, T, E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("WrappedOperation")
            .field("interceptor", &self.interceptor)
            .finish_non_exhaustive()
    }
}

/// An operation that invalidates cache entries after it runs.
///
/// Created by [`wrap_invalidate`]. The output is never stored, so it needs
/// no serde bounds.
pub struct InvalidatingOperation<R, A, T, E> {
    interceptor: Interceptor<R, A>,
    operation: OperationFn<R, A, T, E>,
}

/// Wraps `operation` in invalidate mode.
///
/// Same as `wrap(.., CacheMode::Invalidate, ..)` for operations whose
/// output does not implement `Serialize`, such as a database write receipt.
pub fn wrap_invalidate<R, A, T, E, F>(
    registry: Arc<CacheRegistry>,
    name: impl Into<String>,
    options: CacheOptions<R, A>,
    operation: F,
) -> InvalidatingOperation<R, A, T, E>
where
    F: for<'r> Fn(&'r R, A) -> BoxFuture<'r, Result<T, E>> + Send + Sync + 'static,
{
    InvalidatingOperation {
        interceptor: Interceptor::new(registry, CacheMode::Invalidate, name, options),
        operation: Arc::new(operation),
    }
}

impl<R, A, T, E> InvalidatingOperation<R, A, T, E> {
    pub fn interceptor(&self) -> &Interceptor<R, A> {
        &self.interceptor
    }
}

impl<R, A, T, E> InvalidatingOperation<R, A, T, E>
where
    A: Serialize + Clone,
    E: From<CacheError>,
{
    /// Calls the operation, then deletes the configured keys.
    pub async fn invoke(&self, receiver: &R, args: A) -> Result<T, E> {
        let operation = &self.operation;
        self.interceptor
            .call_invalidate(receiver, &args, || operation(receiver, args.clone()))
            .await
    }
}

impl<R, A, T, E> fmt::Debug for InvalidatingOperation<R, A, T, E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("InvalidatingOperation")
            .field("interceptor", &self.interceptor)
            .finish_non_exhaustive()
    }
}
