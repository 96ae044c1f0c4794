//! Cache Config

use clap::Args;

/// Key-value cache settings.
#[derive(Debug, Args)]
pub struct CacheConfig {
    /// Redis connection string
    #[arg(long, env = "REDIS_URL", default_value = "redis://localhost:6379")]
    pub redis_url: String,

    /// Prefix applied to every cache key.
    #[arg(long, env = "CACHE_NAMESPACE", default_value = "jerrycan")]
    pub cache_namespace: String,
}
