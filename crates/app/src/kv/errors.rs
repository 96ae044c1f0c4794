//! Key-value store errors.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum KvStoreError {
    #[error("key-value backend error")]
    Backend(#[from] redis::RedisError),

    #[error("could not encode cached value")]
    Encoding(#[from] serde_json::Error),
}
