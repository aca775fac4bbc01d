//! Read-through: serve from the store, compute and store on a miss.

use std::future::Future;

use serde::{de::DeserializeOwned, Serialize};

use memento_core::cache::CacheError;

use super::CallContext;

pub(super) async fn run<R, A, T, E, F, Fut>(ctx: CallContext<'_, R, A>, operation: F) -> Result<T, E>
where
    A: Serialize,
    F: FnOnce() -> Fut,
    Fut: Future<Output = Result<T, E>>,
    T: Serialize + DeserializeOwned,
    E: From<CacheError>,
{
    let key = ctx.cache_key()?;

    // Any stored value counts as a hit, including `false`, `0` or `""`
    if let Some(cached) = ctx.store.get(&key).await? {
        ctx.logger
            .info(&format!("{} Cache Hit: {}", ctx.label, key), &[]);
        let value = serde_json::from_value(cached).map_err(CacheError::from)?;
        return Ok(value);
    }

    ctx.logger
        .info(&format!("{} Cache Miss: {}", ctx.label, key), &[]);

    let value = operation().await?;
    ctx.store_if_cacheable(Some(key.as_str()), &value).await?;

    Ok(value)
}
