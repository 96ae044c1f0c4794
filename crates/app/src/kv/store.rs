//! Key-value store port.

use std::time::Duration;

use async_trait::async_trait;
use mockall::automock;
use serde::{Serialize, de::DeserializeOwned};

use crate::kv::KvStoreError;

#[automock]
#[async_trait]
pub trait KvStore: Send + Sync {
    /// Read a raw value.
    async fn get(&self, key: &str) -> Result<Option<String>, KvStoreError>;

    /// Write a raw value, expiring after `ttl` when given.
    async fn put(&self, key: &str, value: String, ttl: Option<Duration>)
    -> Result<(), KvStoreError>;

    /// List keys starting with `prefix`.
    async fn list(&self, prefix: &str) -> Result<Vec<String>, KvStoreError>;
}

/// Read a JSON value.
pub async fn get_json<T>(store: &dyn KvStore, key: &str) -> Result<Option<T>, KvStoreError>
where
    T: DeserializeOwned,
{
    store
        .get(key)
        .await?
        .map(|raw| serde_json::from_str(&raw))
        .transpose()
        .map_err(KvStoreError::from)
}

/// Write a JSON value.
pub async fn put_json<T>(
    store: &dyn KvStore,
    key: &str,
    value: &T,
    ttl: Option<Duration>,
) -> Result<(), KvStoreError>
where
    T: Serialize + Sync,
{
    let raw = serde_json::to_string(value)?;

    store.put(key, raw, ttl).await
}
