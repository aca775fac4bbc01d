//! Write-through: always run the operation and overwrite the stored value.

use std::future::Future;

use serde::Serialize;

use memento_core::cache::CacheError;

use super::CallContext;

pub(super) async fn run<R, A, T, E, F, Fut>(ctx: CallContext<'_, R, A>, operation: F) -> Result<T, E>
where
    A: Serialize,
    F: FnOnce() -> Fut,
    Fut: Future<Output = Result<T, E>>,
    T: Serialize,
    E: From<CacheError>,
{
    let value = operation().await?;

    // No read first: the fresh value replaces whatever is stored
    if ctx.store_if_cacheable(None, &value).await? {
        ctx.logger.info(&format!("{} Cache updated", ctx.label), &[]);
    }

    Ok(value)
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;
    use std::sync::atomic::Ordering;
    use std::sync::Arc;
    use std::time::Duration;

    use serde_json::json;

    use memento_core::cache::{KeyGenerator, Store};
    use memento_core::logger::LoggerConfig;

    use crate::intercept::test_support::*;
    use crate::intercept::{CacheMode, CacheOptions, Interceptor};
    use crate::registry::{CacheRegistry, RegistryConfig};

    fn setup() -> (Arc<CacheRegistry>, Arc<SpyStore>, Arc<RecordingLogger>) {
        let registry = Arc::new(CacheRegistry::new());
        let store = Arc::new(SpyStore::default());
        let logger = Arc::new(RecordingLogger::default());
        registry.register("spy", store.clone()).unwrap();
        registry.initialize(RegistryConfig::new().with_logger(LoggerConfig::Custom(logger.clone())));
        (registry, store, logger)
    }

    fn user_key() -> KeyGenerator<UserService, (u64,)> {
        KeyGenerator::derived(|_: &UserService, (id,): &(u64,)| format!("users:{id}"))
    }

    fn update_user(
        registry: Arc<CacheRegistry>,
        options: CacheOptions<UserService, (u64,)>,
    ) -> Interceptor<UserService, (u64,)> {
        Interceptor::new(registry, CacheMode::WriteThrough, "update_user", options)
    }

    #[tokio::test]
    async fn test_runs_operation_every_call_and_overwrites() {
        let (registry, store, logger) = setup();
        let service = UserService::default();
        let interceptor = update_user(registry, CacheOptions::new().with_key(user_key()));

        interceptor.call(&service, &(1,), || service.find_user(1)).await.unwrap();
        let second = interceptor.call(&service, &(1,), || service.find_user(1)).await.unwrap();

        assert_eq!(service.calls(), 2);
        assert_eq!(store.gets.load(Ordering::SeqCst), 0);
        assert_eq!(store.set_count(), 2);
        assert_eq!(store.value("users:1"), Some(json!({"id": 1, "name": "user-1-v2"})));
        assert_eq!(second.name, "user-1-v2");
        assert!(logger.contains("info", "[UserService:update_user] Cache updated"));
    }

    #[tokio::test]
    async fn test_overwrites_existing_entry_without_reading() {
        let (registry, store, _) = setup();
        store.set("users:7", json!({"id": 7, "name": "stale"}), None).await.unwrap();
        let service = UserService::default();
        let interceptor = update_user(registry, CacheOptions::new().with_key(user_key()));

        let user = interceptor.call(&service, &(7,), || service.find_user(7)).await.unwrap();

        assert_eq!(user.name, "user-7-v1");
        assert_eq!(store.value("users:7"), Some(json!({"id": 7, "name": "user-7-v1"})));
        assert_eq!(store.gets.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_feeds_read_through() {
        let (registry, _, _) = setup();
        let service = UserService::default();
        let writer = update_user(registry.clone(), CacheOptions::new().with_key(user_key()));
        let reader = Interceptor::new(
            registry,
            CacheMode::ReadThrough,
            "find_user",
            CacheOptions::new().with_key(user_key()),
        );

        writer.call(&service, &(3,), || service.find_user(3)).await.unwrap();
        let read = reader.call(&service, &(3,), || service.find_user(3)).await.unwrap();

        assert_eq!(service.calls(), 1);
        assert_eq!(read.name, "user-3-v1");
    }

    #[tokio::test]
    async fn test_uncacheable_value_is_not_written() {
        let (registry, store, logger) = setup();
        let service = UserService::default();
        let interceptor: Interceptor<UserService, ()> = Interceptor::new(
            registry,
            CacheMode::WriteThrough,
            "list_users",
            CacheOptions::new(),
        );

        let users = interceptor.call(&service, &(), || service.list_users()).await.unwrap();

        assert!(users.is_empty());
        assert_eq!(store.set_count(), 0);
        assert!(logger.contains("warn", "Cache not saved"));
    }

    #[tokio::test]
    async fn test_unserializable_value_is_returned_but_not_stored() {
        let (registry, store, logger) = setup();
        let service = UserService::default();
        let interceptor: Interceptor<UserService, ()> = Interceptor::new(
            registry,
            CacheMode::WriteThrough,
            "seat_map",
            CacheOptions::new(),
        );

        // Tuple map keys have no JSON representation
        let seats = interceptor
            .call(&service, &(), || async {
                service.calls.fetch_add(1, Ordering::SeqCst);
                Ok::<_, ServiceError>(HashMap::from([((1u8, 2u8), 3u8)]))
            })
            .await
            .unwrap();

        assert_eq!(seats, HashMap::from([((1, 2), 3)]));
        assert_eq!(service.calls(), 1);
        assert_eq!(store.set_count(), 0);
        assert!(logger.contains("warn", "[UserService:seat_map] Cache not saved. Value is not cacheable"));
    }

    #[tokio::test]
    async fn test_uses_default_ttl() {
        let (registry, store, _) = setup();
        registry.initialize(RegistryConfig::new().with_default_ttl(Duration::from_secs(30)));
        let service = UserService::default();
        let interceptor = update_user(registry, CacheOptions::new().with_key(user_key()));

        interceptor.call(&service, &(1,), || service.find_user(1)).await.unwrap();

        assert_eq!(
            *store.sets.lock().unwrap(),
            vec![("users:1".to_string(), Some(Duration::from_secs(30)))]
        );
    }

    #[tokio::test]
    async fn test_operation_error_skips_write() {
        let (registry, store, _) = setup();
        let service = UserService::default();
        let interceptor = update_user(registry, CacheOptions::new());

        let result = interceptor.call(&service, &(0,), || service.find_user(0)).await;

        assert!(matches!(result, Err(ServiceError::NotFound(0))));
        assert_eq!(store.set_count(), 0);
    }

    #[tokio::test]
    async fn test_store_failure_propagates_after_operation() {
        let registry = Arc::new(CacheRegistry::new());
        registry.register("broken", Arc::new(SpyStore::failing())).unwrap();
        let service = UserService::default();
        let interceptor = update_user(registry, CacheOptions::new());

        let result = interceptor.call(&service, &(1,), || service.find_user(1)).await;

        assert!(matches!(result, Err(ServiceError::Cache(_))));
        assert_eq!(service.calls(), 1);
    }
}
