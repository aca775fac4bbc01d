//! Invalidate: run the operation, then delete the configured keys.

use std::future::Future;

use serde_json::Value;

use memento_core::cache::CacheError;

use super::CallContext;

pub(super) async fn run<R, A, T, E, F, Fut>(ctx: CallContext<'_, R, A>, operation: F) -> Result<T, E>
where
    F: FnOnce() -> Fut,
    Fut: Future<Output = Result<T, E>>,
    E: From<CacheError>,
{
    let result = operation().await?;

    let Some(keys) = &ctx.options.keys else {
        ctx.logger.warn(
            &format!("{} Keys must be supplied to invalidate cache entries.", ctx.label),
            &[],
        );
        return Ok(result);
    };

    let keys = keys.resolve(ctx.receiver, ctx.args);
    ctx.store.delete_many(&keys).await?;
    ctx.logger.info(
        &format!("{} Cache evicted", ctx.label),
        &[Value::from(keys)],
    );

    Ok(result)
}
