//! Redis-backed store.

use redis::{AsyncCommands, Client, aio::ConnectionManager};
use std::time::Duration;
use tracing::{debug, instrument};

use crate::store::{CacheError, ExpiringStore, StoreFuture};

/// Redis client with a shared, self-reconnecting connection.
#[derive(Clone)]
pub struct RedisCache {
    conn: ConnectionManager,
}

impl std::fmt::Debug for RedisCache {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RedisCache").finish_non_exhaustive()
    }
}

impl RedisCache {
    pub async fn new(redis_url: &str) -> Result<Self, CacheError> {
        let client = Client::open(redis_url)?;
        let conn = ConnectionManager::new(client).await?;

        Ok(Self { conn })
    }

    #[instrument(skip(self, value), fields(cache.operation = "SETEX"))]
    async fn set_with_ttl(&self, key: &str, value: String, ttl: Duration) -> Result<(), CacheError> {
        let mut conn = self.conn.clone();
        // SETEX rejects a zero TTL.
        let secs = ttl.as_secs().max(1);

        conn.set_ex::<_, _, ()>(key, value, secs).await?;

        debug!(cache.key = %key, cache.ttl_secs = secs, "Cache set");

        Ok(())
    }

    #[instrument(skip(self), fields(cache.operation = "GET"))]
    async fn fetch(&self, key: &str) -> Result<Option<String>, CacheError> {
        let mut conn = self.conn.clone();
        let value = conn.get::<_, Option<String>>(key).await?;

        debug!(cache.key = %key, cache.hit = value.is_some(), "Cache get");

        Ok(value)
    }

    #[instrument(skip(self), fields(cache.operation = "DEL"))]
    async fn invalidate(&self, key: &str) -> Result<(), CacheError> {
        let mut conn = self.conn.clone();

        conn.del::<_, ()>(key).await?;

        debug!(cache.key = %key, "Cache invalidated");

        Ok(())
    }
}

impl ExpiringStore for RedisCache {
    fn put<'a>(&'a self, key: &'a str, value: String, ttl: Duration) -> StoreFuture<'a, ()> {
        Box::pin(self.set_with_ttl(key, value, ttl))
    }

    fn get<'a>(&'a self, key: &'a str) -> StoreFuture<'a, Option<String>> {
        Box::pin(self.fetch(key))
    }

    fn remove<'a>(&'a self, key: &'a str) -> StoreFuture<'a, ()> {
        Box::pin(self.invalidate(key))
    }
}
