//! Server configuration module

use clap::Parser;

use crate::config::{
    cache::CacheConfig,
    commerce::CommerceConfig,
    db::DatabaseConfig,
    observability::{LoggingConfig, ObservabilityConfig},
    rate_limit::RateLimitConfig,
    server::ServerRuntimeConfig,
    site::SiteConfig,
};

pub(crate) mod cache;
pub(crate) mod commerce;
pub(crate) mod db;
pub(crate) mod observability;
pub(crate) mod rate_limit;
pub(crate) mod server;
pub(crate) mod site;

/// Jerry Can JSON API Server configuration
#[derive(Debug, Parser)]
#[command(name = "jerrycan-json", about = "Jerry Can JSON API Server", long_about = None)]
pub struct ServerConfig {
    /// Server network settings.
    #[command(flatten)]
    pub server: ServerRuntimeConfig,

    /// Logging output settings.
    #[command(flatten)]
    pub logging: LoggingConfig,

    /// Observability (traces/metrics) settings.
    #[command(flatten)]
    pub observability: ObservabilityConfig,

    /// Application database settings.
    #[command(flatten)]
    pub database: DatabaseConfig,

    /// Key-value cache settings.
    #[command(flatten)]
    pub cache: CacheConfig,

    /// Commerce platform admin settings.
    #[command(flatten)]
    pub commerce: CommerceConfig,

    /// Public site settings.
    #[command(flatten)]
    pub site: SiteConfig,

    /// Referral endpoint rate limiting.
    #[command(flatten)]
    pub rate_limit: RateLimitConfig,
}

impl ServerConfig {
    /// Load configuration from environment and CLI arguments
    ///
    /// # Errors
    ///
    /// Returns an error if configuration cannot be parsed
    pub fn load() -> Result<Self, clap::Error> {
        // Load .env file if present (ignore if missing)
        _ = dotenvy::dotenv();

        Self::try_parse()
    }

    /// Get the socket address for binding
    #[must_use]
    pub fn socket_addr(&self) -> String {
        self.server.socket_addr()
    }
}
