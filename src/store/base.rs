use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use thiserror::Error;
use tracing::{error, info};

use super::{memory_store::MemoryStore, mongodb_store::MongoDBStore, no_store::NoStore};
use crate::config::{StoreBackend, StoreConfig};

/// Failures reported by a session store. The session layer passes these
/// through untouched.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("Session store is disabled")]
    Disabled,

    #[error("Session store backend error: {0}")]
    Backend(String),
}

/// The SessionStore trait abstracts key/value session storage with per-entry expiry.
///
/// Values are opaque serialized payloads; keys are session identifiers.
#[async_trait]
pub trait SessionStore: Send + Sync {
    /// Writes `value` under `key`, replacing any existing entry.
    async fn save(&self, key: &str, value: &[u8], expires_in: Duration) -> Result<(), StoreError>;

    /// Replaces the value of an existing, unexpired entry.
    /// Returns `false` without writing anything when there is no such entry.
    async fn update(&self, key: &str, value: &[u8], expires_in: Duration)
        -> Result<bool, StoreError>;

    async fn load(&self, key: &str) -> Result<Option<Vec<u8>>, StoreError>;

    /// Removes the entry if present. Deleting a missing key is not an error.
    async fn delete(&self, key: &str) -> Result<(), StoreError>;

    /// A short label for logs and metrics.
    fn get_name(&self) -> &str;

    fn is_enabled(&self) -> bool {
        // Only NoStore reports false, so we can write better debug messages
        true
    }
}

/// Creates a concrete store implementation based on the StoreConfig.
/// If `store.enabled = false`, returns NoStore. Otherwise, picks the specified backend.
pub async fn create_store(config: &StoreConfig) -> Result<Arc<dyn SessionStore>, StoreError> {
    if !config.enabled {
        info!("Session store is disabled. Using NoStore.");
        return Ok(Arc::new(NoStore::new()));
    }

    match &config.backend {
        Some(StoreBackend::Memory(memory_config)) => {
            let store = Arc::new(MemoryStore::new());
            store.spawn_purge_task(memory_config.purge_interval());
            info!("Successfully created in-memory session store.");
            Ok(store)
        }
        Some(StoreBackend::MongoDB(mongo_config)) => {
            let store = MongoDBStore::new(mongo_config).await.map_err(|e| {
                error!("Failed to create MongoDB store: {}", e);
                e
            })?;
            info!("Successfully created MongoDB session store.");
            Ok(Arc::new(store))
        }
        None => {
            error!("Store is enabled, but no backend config is provided!");
            Err(StoreError::Backend(
                "store is enabled but no backend is configured".to_string(),
            ))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::MemoryStoreConfig;

    #[tokio::test]
    async fn test_disabled_store_config_yields_no_store() {
        let config = StoreConfig {
            enabled: false,
            backend: None,
        };
        let store = create_store(&config).await.unwrap();
        assert!(!store.is_enabled());
        assert_eq!(store.get_name(), "no-store");
    }

    #[tokio::test]
    async fn test_enabled_store_without_backend_is_rejected() {
        let config = StoreConfig {
            enabled: true,
            backend: None,
        };
        assert!(create_store(&config).await.is_err());
    }

    #[tokio::test]
    async fn test_memory_backend() {
        let config = StoreConfig {
            enabled: true,
            backend: Some(StoreBackend::Memory(MemoryStoreConfig::default())),
        };
        let store = create_store(&config).await.unwrap();
        assert!(store.is_enabled());
        assert_eq!(store.get_name(), "memory");

        store
            .save("key", b"payload", Duration::from_secs(60))
            .await
            .unwrap();
        assert_eq!(store.load("key").await.unwrap(), Some(b"payload".to_vec()));
    }
}
