//! Redis-backed key-value store.

use std::time::Duration;

use async_trait::async_trait;
use redis::{AsyncCommands, Client, aio::ConnectionManager};
use tracing::{debug, info};

use crate::kv::{KvStore, KvStoreError};

/// Redis implementation of [`KvStore`].
///
/// Every key is namespaced as `{namespace}:{key}` so the cache can share a
/// Redis instance; listed keys are returned without the namespace.
#[derive(Clone)]
pub struct RedisKvStore {
    conn: ConnectionManager,
    namespace: String,
}

impl std::fmt::Debug for RedisKvStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RedisKvStore")
            .field("namespace", &self.namespace)
            .finish_non_exhaustive()
    }
}

impl RedisKvStore {
    /// Connect to Redis.
    ///
    /// # Errors
    ///
    /// Returns an error if the URL is invalid or the connection fails.
    pub async fn connect(url: &str, namespace: &str) -> Result<Self, KvStoreError> {
        let client = Client::open(url)?;
        let conn = ConnectionManager::new(client).await?;

        info!(namespace, "connected to redis key-value store");

        Ok(Self {
            conn,
            namespace: namespace.to_string(),
        })
    }

    fn namespaced(&self, key: &str) -> String {
        format!("{}:{key}", self.namespace)
    }
}

#[async_trait]
impl KvStore for RedisKvStore {
    async fn get(&self, key: &str) -> Result<Option<String>, KvStoreError> {
        let mut conn = self.conn.clone();

        let value: Option<String> = conn.get(self.namespaced(key)).await?;

        Ok(value)
    }

    async fn put(
        &self,
        key: &str,
        value: String,
        ttl: Option<Duration>,
    ) -> Result<(), KvStoreError> {
        let mut conn = self.conn.clone();
        let key = self.namespaced(key);

        match ttl {
            Some(ttl) => {
                let () = conn.set_ex(&key, value, ttl.as_secs().max(1)).await?;
            }
            None => {
                let () = conn.set(&key, value).await?;
            }
        }

        debug!(key = %key, ?ttl, "stored key-value entry");

        Ok(())
    }

    async fn list(&self, prefix: &str) -> Result<Vec<String>, KvStoreError> {
        let mut conn = self.conn.clone();
        let pattern = format!("{}*", self.namespaced(prefix));
        let strip = format!("{}:", self.namespace);

        let mut keys = Vec::new();
        let mut iter = conn.scan_match::<_, String>(pattern).await?;

        while let Some(key) = iter.next_item().await {
            if let Some(stripped) = key.strip_prefix(&strip) {
                keys.push(stripped.to_string());
            }
        }

        Ok(keys)
    }
}
