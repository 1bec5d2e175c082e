//! The expiring key-value seam.

use std::fmt;
use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;
use std::time::Duration;

#[derive(Debug, thiserror::Error)]
pub enum CacheError {
    #[error("Redis connection error: {0}")]
    Connection(#[from] ::redis::RedisError),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

pub type StoreFuture<'a, T> = Pin<Box<dyn Future<Output = Result<T, CacheError>> + Send + 'a>>;

/// String values under string keys, each with its own time-to-live.
///
/// Implementations must treat an expired key exactly like a missing one.
pub trait ExpiringStore: Send + Sync + fmt::Debug {
    /// Stores `value`, replacing any previous value and TTL.
    fn put<'a>(&'a self, key: &'a str, value: String, ttl: Duration) -> StoreFuture<'a, ()>;

    fn get<'a>(&'a self, key: &'a str) -> StoreFuture<'a, Option<String>>;

    /// Removing a missing key is not an error.
    fn remove<'a>(&'a self, key: &'a str) -> StoreFuture<'a, ()>;
}

pub type SharedStore = Arc<dyn ExpiringStore>;

/// Typed helpers over any store.
pub async fn put_json<T: serde::Serialize>(
    store: &dyn ExpiringStore,
    key: &str,
    value: &T,
    ttl: Duration,
) -> Result<(), CacheError> {
    let json = serde_json::to_string(value)?;
    store.put(key, json, ttl).await
}

pub async fn get_json<T: serde::de::DeserializeOwned>(
    store: &dyn ExpiringStore,
    key: &str,
) -> Result<Option<T>, CacheError> {
    match store.get(key).await? {
        Some(raw) => Ok(Some(serde_json::from_str(&raw)?)),
        None => Ok(None),
    }
}
