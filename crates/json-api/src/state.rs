//! State

use std::sync::Arc;

use jerrycan_app::{context::AppContext, secret::Secret};

use crate::rate_limit::RateLimiter;

/// Webhook body limit used unless configured otherwise.
pub(crate) const DEFAULT_WEBHOOK_BODY_LIMIT: usize = 4 * 1024 * 1024;

#[derive(Clone)]
pub(crate) struct State {
    pub(crate) app: AppContext,

    /// Shared secret for webhook signatures; deliveries fail with 500 without it.
    pub(crate) webhook_secret: Option<Secret>,

    pub(crate) webhook_body_limit: usize,

    pub(crate) referral_limiter: Arc<RateLimiter>,
}

impl State {
    #[must_use]
    pub(crate) fn new(
        app: AppContext,
        webhook_secret: Option<Secret>,
        referral_limiter: RateLimiter,
    ) -> Self {
        Self {
            app,
            webhook_secret,
            webhook_body_limit: DEFAULT_WEBHOOK_BODY_LIMIT,
            referral_limiter: Arc::new(referral_limiter),
        }
    }

    #[must_use]
    pub(crate) fn with_webhook_body_limit(mut self, limit: usize) -> Self {
        self.webhook_body_limit = limit;
        self
    }
}
