//! Key-value document store.
//!
//! Documents are small JSON values kept under a fixed key each
//! (`contacts`, `education`, `portfolio`). Writes replace the whole value.

use async_trait::async_trait;
use serde::{de::DeserializeOwned, Serialize};
use std::sync::Arc;
use tracing::{info, warn};

use crate::config::{KvConfig, KvProvider};
use crate::types::AppResult;

pub mod memory;
pub mod redis_store;

pub use memory::MemoryStore;
pub use redis_store::RedisStore;

#[async_trait]
pub trait DocumentStore: Send + Sync {
    async fn get(&self, key: &str) -> AppResult<Option<String>>;

    async fn put(&self, key: &str, value: String) -> AppResult<()>;

    /// Removing a missing key succeeds.
    async fn delete(&self, key: &str) -> AppResult<()>;

    async fn ping(&self) -> AppResult<()>;

    fn backend_name(&self) -> &'static str;
}

/// Reads and decodes the document at `key`.
pub async fn load<T: DeserializeOwned>(store: &dyn DocumentStore, key: &str) -> AppResult<Option<T>> {
    match store.get(key).await? {
        Some(raw) => Ok(Some(serde_json::from_str(&raw)?)),
        None => Ok(None),
    }
}

/// Reads the document at `key`, or `T::default()` when it is missing or the
/// store cannot be read. Used by the public read paths.
pub async fn load_or_default<T: DeserializeOwned + Default>(store: &dyn DocumentStore, key: &str) -> T {
    match load(store, key).await {
        Ok(Some(value)) => value,
        Ok(None) => T::default(),
        Err(e) => {
            warn!(key, error = %e, "Falling back to default content");
            T::default()
        }
    }
}

pub async fn save<T: Serialize>(store: &dyn DocumentStore, key: &str, value: &T) -> AppResult<()> {
    let raw = serde_json::to_string(value)?;
    store.put(key, raw).await
}

/// Builds the store selected by `KV_PROVIDER`.
pub async fn connect(config: &KvConfig) -> anyhow::Result<Arc<dyn DocumentStore>> {
    match config.provider {
        KvProvider::Redis => {
            let store = RedisStore::connect(&config.redis_url, &config.key_prefix).await?;
            info!("Using Redis document store");
            Ok(Arc::new(store))
        }
        KvProvider::Memory => {
            warn!("Using in-memory document store; content is lost on restart");
            Ok(Arc::new(MemoryStore::new()))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::content::{ContactInfo, PortfolioCollection, CONTACTS_KEY, PORTFOLIO_KEY};

    #[tokio::test]
    async fn test_save_then_load_returns_same_document() {
        let store = MemoryStore::new();
        let mut contacts = ContactInfo::default();
        contacts.email = "studio@example.com".to_string();

        save(&store, CONTACTS_KEY, &contacts).await.unwrap();
        let loaded: Option<ContactInfo> = load(&store, CONTACTS_KEY).await.unwrap();
        assert_eq!(loaded, Some(contacts));
    }

    #[tokio::test]
    async fn test_missing_key_falls_back_to_default() {
        let store = MemoryStore::new();
        let portfolio: PortfolioCollection = load_or_default(&store, PORTFOLIO_KEY).await;
        assert_eq!(portfolio, PortfolioCollection::default());
    }

    #[tokio::test]
    async fn test_corrupt_document_falls_back_to_default() {
        let store = MemoryStore::new();
        store.put(CONTACTS_KEY, "{not json".to_string()).await.unwrap();

        assert!(load::<ContactInfo>(&store, CONTACTS_KEY).await.is_err());
        let contacts: ContactInfo = load_or_default(&store, CONTACTS_KEY).await;
        assert_eq!(contacts, ContactInfo::default());
    }
}
