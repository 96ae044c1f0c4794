//! Rate Limit Config

use std::time::Duration;

use clap::Args;

/// Referral generation rate limiting.
#[derive(Debug, Args)]
pub struct RateLimitConfig {
    /// Window length in seconds.
    #[arg(long, env = "RATE_LIMIT_WINDOW_SECONDS", default_value_t = 60_u64)]
    pub rate_limit_window_seconds: u64,

    /// Requests allowed per address per window.
    #[arg(long, env = "RATE_LIMIT_MAX_REQUESTS", default_value_t = 5_usize)]
    pub rate_limit_max_requests: usize,
}

impl RateLimitConfig {
    #[must_use]
    pub fn window(&self) -> Duration {
        Duration::from_secs(self.rate_limit_window_seconds)
    }
}
