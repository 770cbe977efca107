//! Redis-backed slot store
//!
//! Counters are plain integer keys (`<prefix>:<offering_id>`), so operators
//! can inspect them with `GET`. `DECR`/`INCR` run inside small Lua scripts
//! that check the key exists first; a bare `DECR` on a missing key would
//! silently create it at -1 instead of reporting an unknown offering.

use async_trait::async_trait;
use redis::aio::ConnectionManager;
use redis::{AsyncCommands, Client, Script};
use tracing::info;

use crate::domain::{DomainError, DomainResult, SlotStore};
use crate::shared::errors::InfraError;

const DECR_IF_EXISTS: &str = r#"
    if redis.call('EXISTS', KEYS[1]) == 1 then
        return redis.call('DECR', KEYS[1])
    end
    return false
"#;

const INCR_IF_EXISTS: &str = r#"
    if redis.call('EXISTS', KEYS[1]) == 1 then
        return redis.call('INCR', KEYS[1])
    end
    return false
"#;

#[derive(Clone)]
pub struct RedisSlotStore {
    conn_manager: ConnectionManager,
    key_prefix: String,
    decr: Script,
    incr: Script,
}

impl RedisSlotStore {
    /// Connect to `redis_url`; the connection manager reconnects on its own
    /// after transient failures.
    pub async fn connect(redis_url: &str, key_prefix: impl Into<String>) -> DomainResult<Self> {
        let client = Client::open(redis_url).map_err(InfraError::from)?;
        let conn_manager = ConnectionManager::new(client)
            .await
            .map_err(InfraError::from)?;
        info!(redis_url, "Connected to Redis slot store");

        Ok(Self {
            conn_manager,
            key_prefix: key_prefix.into(),
            decr: Script::new(DECR_IF_EXISTS),
            incr: Script::new(INCR_IF_EXISTS),
        })
    }

    fn counter_key(&self, offering_id: &str) -> String {
        counter_key(&self.key_prefix, offering_id)
    }
}

fn counter_key(prefix: &str, offering_id: &str) -> String {
    format!("{prefix}:{offering_id}")
}

#[async_trait]
impl SlotStore for RedisSlotStore {
    async fn try_decrement(&self, offering_id: &str) -> DomainResult<i64> {
        let mut conn = self.conn_manager.clone();
        let value: Option<i64> = self
            .decr
            .key(self.counter_key(offering_id))
            .invoke_async(&mut conn)
            .await
            .map_err(InfraError::from)?;
        value.ok_or_else(|| DomainError::offering_not_found(offering_id))
    }

    async fn increment(&self, offering_id: &str) -> DomainResult<i64> {
        let mut conn = self.conn_manager.clone();
        let value: Option<i64> = self
            .incr
            .key(self.counter_key(offering_id))
            .invoke_async(&mut conn)
            .await
            .map_err(InfraError::from)?;
        value.ok_or_else(|| DomainError::offering_not_found(offering_id))
    }

    async fn get(&self, offering_id: &str) -> DomainResult<i64> {
        let mut conn = self.conn_manager.clone();
        let value: Option<i64> = conn
            .get(self.counter_key(offering_id))
            .await
            .map_err(InfraError::from)?;
        value.ok_or_else(|| DomainError::offering_not_found(offering_id))
    }

    async fn set_baseline(&self, offering_id: &str, value: i64) -> DomainResult<()> {
        let mut conn = self.conn_manager.clone();
        let _: () = conn
            .set(self.counter_key(offering_id), value)
            .await
            .map_err(InfraError::from)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn counter_key_uses_prefix() {
        assert_eq!(counter_key("course", "1"), "course:1");
        assert_eq!(counter_key("flash", "rust-101"), "flash:rust-101");
    }

    // Note: These tests require a running Redis instance
    // Run with: docker run -d -p 6379:6379 redis:7-alpine
    const REDIS_URL: &str = "redis://127.0.0.1:6379";

    async fn test_store() -> RedisSlotStore {
        let prefix = format!("test:slots:{}", uuid::Uuid::new_v4());
        RedisSlotStore::connect(REDIS_URL, prefix).await.unwrap()
    }

    async fn cleanup(store: &RedisSlotStore, offering_id: &str) {
        let mut conn = store.conn_manager.clone();
        let _: () = conn.del(store.counter_key(offering_id)).await.unwrap();
    }

    #[tokio::test]
    #[ignore] // Requires Redis running
    async fn missing_counter_is_not_found_and_not_created() {
        let store = test_store().await;

        let err = store.try_decrement("ghost").await.unwrap_err();
        assert!(matches!(err, DomainError::NotFound { .. }));
        let err = store.increment("ghost").await.unwrap_err();
        assert!(matches!(err, DomainError::NotFound { .. }));

        let mut conn = store.conn_manager.clone();
        let exists: bool = conn.exists(store.counter_key("ghost")).await.unwrap();
        assert!(!exists);
        assert!(matches!(
            store.get("ghost").await.unwrap_err(),
            DomainError::NotFound { .. }
        ));
    }

    #[tokio::test]
    #[ignore] // Requires Redis running
    async fn decrement_goes_below_zero() {
        let store = test_store().await;
        store.set_baseline("1", 1).await.unwrap();

        assert_eq!(store.try_decrement("1").await.unwrap(), 0);
        assert_eq!(store.try_decrement("1").await.unwrap(), -1);
        assert_eq!(store.get("1").await.unwrap(), -1);

        cleanup(&store, "1").await;
    }

    #[tokio::test]
    #[ignore] // Requires Redis running
    async fn increment_returns_new_value() {
        let store = test_store().await;
        store.set_baseline("1", -1).await.unwrap();

        assert_eq!(store.increment("1").await.unwrap(), 0);
        assert_eq!(store.increment("1").await.unwrap(), 1);

        cleanup(&store, "1").await;
    }

    #[tokio::test]
    #[ignore] // Requires Redis running
    async fn set_baseline_overwrites_counter() {
        let store = test_store().await;
        store.set_baseline("1", 10).await.unwrap();
        store.try_decrement("1").await.unwrap();
        store.try_decrement("1").await.unwrap();

        store.set_baseline("1", 3).await.unwrap();
        assert_eq!(store.get("1").await.unwrap(), 3);

        let mut conn = store.conn_manager.clone();
        let raw: String = conn.get(store.counter_key("1")).await.unwrap();
        assert_eq!(raw, "3");

        cleanup(&store, "1").await;
    }
}
