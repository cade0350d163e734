//! Client storage backends: SQLite for the running app, memory for tests
//! and embedders that do not want anything written to disk.

use async_trait::async_trait;
use std::collections::HashMap;
use tokio::sync::RwLock;

use super::{ClientStorage, ServiceResult};
use farmease_store::StorageRepository;

#[async_trait]
impl ClientStorage for StorageRepository {
    async fn get(&self, key: &str) -> ServiceResult<Option<String>> {
        Ok(StorageRepository::get(self, key).await?)
    }

    async fn set(&self, key: &str, value: &str) -> ServiceResult<()> {
        Ok(StorageRepository::set(self, key, value).await?)
    }

    async fn remove(&self, key: &str) -> ServiceResult<()> {
        StorageRepository::remove(self, key).await?;
        Ok(())
    }
}

/// Process-local storage. Nothing survives a restart.
#[derive(Debug, Default)]
pub struct MemoryStorage {
    entries: RwLock<HashMap<String, String>>,
}

impl MemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }

    /// Storage pre-filled with one entry.
    pub fn with_entry(key: impl Into<String>, value: impl Into<String>) -> Self {
        MemoryStorage {
            entries: RwLock::new(HashMap::from([(key.into(), value.into())])),
        }
    }
}

#[async_trait]
impl ClientStorage for MemoryStorage {
    async fn get(&self, key: &str) -> ServiceResult<Option<String>> {
        Ok(self.entries.read().await.get(key).cloned())
    }

    async fn set(&self, key: &str, value: &str) -> ServiceResult<()> {
        self.entries
            .write()
            .await
            .insert(key.to_string(), value.to_string());
        Ok(())
    }

    async fn remove(&self, key: &str) -> ServiceResult<()> {
        self.entries.write().await.remove(key);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use farmease_store::{Database, DbConfig};

    #[tokio::test]
    async fn test_memory_storage() {
        let storage = MemoryStorage::with_entry("cart", "[]");
        assert_eq!(storage.get("cart").await.unwrap().as_deref(), Some("[]"));
        storage.set("cart", "[1]").await.unwrap();
        storage.remove("session").await.unwrap();
        assert_eq!(storage.get("cart").await.unwrap().as_deref(), Some("[1]"));
        storage.remove("cart").await.unwrap();
        assert!(storage.get("cart").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_sqlite_storage_through_trait() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let storage: Box<dyn ClientStorage> = Box::new(db.storage());

        storage.set("cart", "[]").await.unwrap();
        assert_eq!(storage.get("cart").await.unwrap().as_deref(), Some("[]"));
        storage.remove("cart").await.unwrap();
        assert!(storage.get("cart").await.unwrap().is_none());
    }
}
