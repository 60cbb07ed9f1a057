use std::time::Duration;

use super::{SessionStore, StoreError};
use async_trait::async_trait;

/// A no-op store that always returns an error if called,
/// indicating the store is disabled.
pub struct NoStore;

impl NoStore {
    pub fn new() -> Self {
        NoStore
    }
}

impl Default for NoStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl SessionStore for NoStore {
    async fn save(
        &self,
        _key: &str,
        _value: &[u8],
        _expires_in: Duration,
    ) -> Result<(), StoreError> {
        Err(StoreError::Disabled)
    }

    async fn update(
        &self,
        _key: &str,
        _value: &[u8],
        _expires_in: Duration,
    ) -> Result<bool, StoreError> {
        Err(StoreError::Disabled)
    }

    async fn load(&self, _key: &str) -> Result<Option<Vec<u8>>, StoreError> {
        Err(StoreError::Disabled)
    }

    async fn delete(&self, _key: &str) -> Result<(), StoreError> {
        Err(StoreError::Disabled)
    }

    fn get_name(&self) -> &str {
        "no-store"
    }

    fn is_enabled(&self) -> bool {
        false
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const EXPIRY: Duration = Duration::from_secs(60);

    /// Test that saving with NoStore returns an error.
    #[tokio::test]
    async fn test_no_store_save() {
        let res = NoStore::new().save("key", b"{}", EXPIRY).await;
        assert!(matches!(res, Err(StoreError::Disabled)));
    }

    /// Test that updating with NoStore returns an error rather than `false`.
    #[tokio::test]
    async fn test_no_store_update() {
        let res = NoStore::new().update("key", b"{}", EXPIRY).await;
        assert!(matches!(res, Err(StoreError::Disabled)));
    }

    /// Test that loading with NoStore returns an error.
    #[tokio::test]
    async fn test_no_store_load() {
        let res = NoStore::new().load("key").await;
        assert!(matches!(res, Err(StoreError::Disabled)));
    }

    /// Test that deleting with NoStore returns an error.
    #[tokio::test]
    async fn test_no_store_delete() {
        let res = NoStore::new().delete("key").await;
        assert!(matches!(res, Err(StoreError::Disabled)));
    }
}
