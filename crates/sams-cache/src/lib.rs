//! # SAMS Cache
//!
//! Keyed, expiring storage for short-lived secrets: password-reset codes and
//! the pending-reset marker held in a browser session.
//!
//! - [`store`]: the [`ExpiringStore`] seam the web layer depends on
//! - [`redis`]: Redis-backed store for deployments
//! - [`memory`]: in-process store for tests and single-node runs
//! - [`keys`]: key layout
//! - [`config`]: backend selection from the environment
//!
//! Expiry belongs to the store. Callers never compare timestamps; a key
//! that has outlived its TTL simply reads back as absent.
//!
//! # Example
//!
//! ```ignore
//! use sams_cache::{CacheConfig, connect};
//!
//! let store = connect(&CacheConfig::from_env()).await?;
//! store.put("otp:abc", "123456".into(), Duration::from_secs(300)).await?;
//! assert_eq!(store.get("otp:abc").await?, Some("123456".into()));
//! ```

pub mod config;
pub mod keys;
pub mod memory;
pub mod redis;
pub mod store;

use std::sync::Arc;

pub use config::{CacheBackend, CacheConfig};
pub use memory::MemoryStore;
pub use redis::RedisCache;
pub use store::{CacheError, ExpiringStore, SharedStore};

/// Builds the store named by `config.backend`.
pub async fn connect(config: &CacheConfig) -> Result<SharedStore, CacheError> {
    let store: SharedStore = match config.backend {
        CacheBackend::Redis => Arc::new(RedisCache::new(&config.redis_url).await?),
        CacheBackend::Memory => Arc::new(MemoryStore::new()),
    };

    tracing::info!(backend = ?config.backend, "Expiring store ready");

    Ok(store)
}
