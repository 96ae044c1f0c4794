//! Key-value cache for fast, TTL-bounded lookups.

mod errors;
pub mod keys;
mod redis_store;
mod store;

pub use errors::KvStoreError;
pub use redis_store::RedisKvStore;
pub use store::*;
