//! In-process store.
//!
//! Expiry uses `tokio::time::Instant`, so tests can run under a paused clock
//! and step past a TTL with `tokio::time::advance`.

use std::collections::HashMap;
use std::sync::Mutex;
use std::time::Duration;

use tokio::time::Instant;
use tracing::debug;

use crate::store::{ExpiringStore, StoreFuture};

#[derive(Debug, Default)]
pub struct MemoryStore {
    entries: Mutex<HashMap<String, (String, Instant)>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, HashMap<String, (String, Instant)>> {
        // A panic while holding the lock cannot leave an entry half-written.
        self.entries
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// Live entries only.
    pub fn len(&self) -> usize {
        let now = Instant::now();
        self.lock()
            .values()
            .filter(|(_, expires_at)| *expires_at > now)
            .count()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Entries held in memory, expired or not.
    #[cfg(test)]
    fn held(&self) -> usize {
        self.lock().len()
    }
}

impl ExpiringStore for MemoryStore {
    fn put<'a>(&'a self, key: &'a str, value: String, ttl: Duration) -> StoreFuture<'a, ()> {
        Box::pin(async move {
            let now = Instant::now();
            let mut entries = self.lock();
            let before = entries.len();
            entries.retain(|_, (_, expires_at)| *expires_at > now);
            let purged = before - entries.len();
            entries.insert(key.to_string(), (value, now + ttl));
            debug!(
                store.key = %key,
                store.ttl_secs = ttl.as_secs(),
                store.purged = purged,
                "Stored entry"
            );
            Ok(())
        })
    }

    fn get<'a>(&'a self, key: &'a str) -> StoreFuture<'a, Option<String>> {
        Box::pin(async move {
            let mut entries = self.lock();
            match entries.get(key) {
                Some((value, expires_at)) if *expires_at > Instant::now() => Ok(Some(value.clone())),
                Some(_) => {
                    entries.remove(key);
                    debug!(store.key = %key, "Entry expired");
                    Ok(None)
                }
                None => Ok(None),
            }
        })
    }

    fn remove<'a>(&'a self, key: &'a str) -> StoreFuture<'a, ()> {
        Box::pin(async move {
            self.lock().remove(key);
            Ok(())
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test(start_paused = true)]
    async fn test_entry_readable_until_ttl() {
        let store = MemoryStore::new();
        store
            .put("otp:a", "123456".to_string(), Duration::from_secs(300))
            .await
            .unwrap();

        tokio::time::advance(Duration::from_secs(299)).await;
        assert_eq!(store.get("otp:a").await.unwrap().as_deref(), Some("123456"));

        tokio::time::advance(Duration::from_secs(2)).await;
        assert_eq!(store.get("otp:a").await.unwrap(), None);
        assert!(store.is_empty());
    }

    #[tokio::test]
    async fn test_put_replaces_value() {
        let store = MemoryStore::new();
        store
            .put("k", "one".to_string(), Duration::from_secs(60))
            .await
            .unwrap();
        store
            .put("k", "two".to_string(), Duration::from_secs(60))
            .await
            .unwrap();
        assert_eq!(store.get("k").await.unwrap().as_deref(), Some("two"));
        assert_eq!(store.len(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_put_drops_expired_entries_never_read_again() {
        let store = MemoryStore::new();
        for session in ["reset:a", "reset:b"] {
            store
                .put(session, "{}".to_string(), Duration::from_secs(1800))
                .await
                .unwrap();
        }
        store
            .put("otp:c", "654321".to_string(), Duration::from_secs(3600))
            .await
            .unwrap();

        tokio::time::advance(Duration::from_secs(1801)).await;
        assert_eq!(store.held(), 3);

        store
            .put("otp:d", "123456".to_string(), Duration::from_secs(300))
            .await
            .unwrap();
        assert_eq!(store.held(), 2);
        assert_eq!(store.get("otp:c").await.unwrap().as_deref(), Some("654321"));
    }

    #[tokio::test]
    async fn test_remove_missing_key_is_ok() {
        let store = MemoryStore::new();
        assert!(store.remove("nothing").await.is_ok());
    }
}
