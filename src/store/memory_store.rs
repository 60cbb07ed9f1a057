use std::collections::HashMap;
use std::sync::Arc;
use std::time::{Duration, Instant};

use async_trait::async_trait;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use tokio::sync::RwLock;
use tracing::debug;

use super::{SessionStore, StoreError};

const MAX_LIFETIME: Duration = Duration::from_secs(100 * 365 * 24 * 3600);

fn default_purge_interval_in_s() -> u64 {
    60
}

/// The config struct for the in-process store.
#[derive(Deserialize, Serialize, JsonSchema, Debug, Clone)]
pub struct MemoryStoreConfig {
    /// How often expired entries are swept, in seconds.
    #[serde(default = "default_purge_interval_in_s")]
    pub purge_interval_in_s: u64,
}

impl MemoryStoreConfig {
    pub fn purge_interval(&self) -> Duration {
        Duration::from_secs(self.purge_interval_in_s.max(1))
    }
}

impl Default for MemoryStoreConfig {
    fn default() -> Self {
        Self {
            purge_interval_in_s: default_purge_interval_in_s(),
        }
    }
}

struct Entry {
    value: Vec<u8>,
    expires_at: Instant,
}

impl Entry {
    fn new(value: &[u8], expires_in: Duration) -> Self {
        let now = Instant::now();
        Entry {
            value: value.to_vec(),
            // Saturate absurd lifetimes instead of overflowing.
            expires_at: now
                .checked_add(expires_in)
                .unwrap_or_else(|| now + MAX_LIFETIME),
        }
    }

    fn is_expired(&self, now: Instant) -> bool {
        now >= self.expires_at
    }
}

/// A `SessionStore` that keeps sessions in process memory.
///
/// Expired entries are invisible to reads immediately and are reclaimed by
/// [`MemoryStore::purge_expired`]. Concurrent writes to the same key are last-write-wins.
#[derive(Default)]
pub struct MemoryStore {
    entries: RwLock<HashMap<String, Entry>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Drops every expired entry, returning how many were removed.
    pub async fn purge_expired(&self) -> usize {
        let now = Instant::now();
        let mut entries = self.entries.write().await;
        let before = entries.len();
        entries.retain(|_, entry| !entry.is_expired(now));
        before - entries.len()
    }

    /// Number of entries currently held, expired or not.
    pub async fn len(&self) -> usize {
        self.entries.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.entries.read().await.is_empty()
    }

    /// Periodically purges expired entries. The task ends once the store is dropped.
    pub fn spawn_purge_task(self: &Arc<Self>, every: Duration) {
        let store = Arc::downgrade(self);
        tokio::spawn(async move {
            let mut ticker = tokio::time::interval(every);
            // The first tick completes immediately.
            ticker.tick().await;
            loop {
                ticker.tick().await;
                let Some(store) = store.upgrade() else {
                    break;
                };
                let purged = store.purge_expired().await;
                if purged > 0 {
                    debug!("Purged {} expired sessions from memory store", purged);
                }
            }
        });
    }
}

#[async_trait]
impl SessionStore for MemoryStore {
    async fn save(&self, key: &str, value: &[u8], expires_in: Duration) -> Result<(), StoreError> {
        self.entries
            .write()
            .await
            .insert(key.to_string(), Entry::new(value, expires_in));
        Ok(())
    }

    async fn update(
        &self,
        key: &str,
        value: &[u8],
        expires_in: Duration,
    ) -> Result<bool, StoreError> {
        let mut entries = self.entries.write().await;
        let now = Instant::now();
        let live = entries
            .get(key)
            .is_some_and(|entry| !entry.is_expired(now));
        if !live {
            entries.remove(key);
            return Ok(false);
        }
        entries.insert(key.to_string(), Entry::new(value, expires_in));
        Ok(true)
    }

    async fn load(&self, key: &str) -> Result<Option<Vec<u8>>, StoreError> {
        let entries = self.entries.read().await;
        let now = Instant::now();
        Ok(entries
            .get(key)
            .filter(|entry| !entry.is_expired(now))
            .map(|entry| entry.value.clone()))
    }

    async fn delete(&self, key: &str) -> Result<(), StoreError> {
        self.entries.write().await.remove(key);
        Ok(())
    }

    fn get_name(&self) -> &str {
        "memory"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const EXPIRY: Duration = Duration::from_secs(60);

    #[tokio::test]
    async fn test_save_then_load() {
        let store = MemoryStore::new();
        store.save("a", b"one", EXPIRY).await.unwrap();
        assert_eq!(store.load("a").await.unwrap(), Some(b"one".to_vec()));
        assert_eq!(store.load("b").await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_save_overwrites_existing_entry() {
        let store = MemoryStore::new();
        store.save("a", b"one", EXPIRY).await.unwrap();
        store.save("a", b"two", EXPIRY).await.unwrap();
        assert_eq!(store.load("a").await.unwrap(), Some(b"two".to_vec()));
        assert_eq!(store.len().await, 1);
    }

    #[tokio::test]
    async fn test_update_requires_existing_entry() {
        let store = MemoryStore::new();
        assert!(!store.update("a", b"one", EXPIRY).await.unwrap());
        assert!(store.is_empty().await, "update must not create entries");

        store.save("a", b"one", EXPIRY).await.unwrap();
        assert!(store.update("a", b"two", EXPIRY).await.unwrap());
        assert_eq!(store.load("a").await.unwrap(), Some(b"two".to_vec()));
    }

    #[tokio::test]
    async fn test_expired_entries_are_invisible() {
        let store = MemoryStore::new();
        store.save("a", b"one", Duration::ZERO).await.unwrap();
        assert_eq!(store.load("a").await.unwrap(), None);
        assert!(!store.update("a", b"two", EXPIRY).await.unwrap());
        assert_eq!(store.load("a").await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_delete_missing_key_is_ok() {
        let store = MemoryStore::new();
        store.delete("missing").await.unwrap();

        store.save("a", b"one", EXPIRY).await.unwrap();
        store.delete("a").await.unwrap();
        assert_eq!(store.load("a").await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_purge_expired_only_drops_expired() {
        let store = MemoryStore::new();
        store.save("old", b"x", Duration::ZERO).await.unwrap();
        store.save("fresh", b"y", EXPIRY).await.unwrap();

        assert_eq!(store.purge_expired().await, 1);
        assert_eq!(store.len().await, 1);
        assert_eq!(store.load("fresh").await.unwrap(), Some(b"y".to_vec()));
    }

    #[tokio::test]
    async fn test_purge_task_reclaims_entries() {
        let store = Arc::new(MemoryStore::new());
        store.save("old", b"x", Duration::ZERO).await.unwrap();
        store.spawn_purge_task(Duration::from_millis(10));

        tokio::time::sleep(Duration::from_millis(50)).await;
        assert!(store.is_empty().await);
    }

    #[test]
    fn test_purge_interval_never_zero() {
        let config = MemoryStoreConfig {
            purge_interval_in_s: 0,
        };
        assert_eq!(config.purge_interval(), Duration::from_secs(1));
    }
}
