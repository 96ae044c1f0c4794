//! Cache key scheme and retention.

use std::time::Duration;

const DAY: Duration = Duration::from_secs(24 * 60 * 60);

/// Cached referral pointers back the landing page.
pub const REFERRAL_TTL: Duration = Duration::from_secs(90 * 24 * 60 * 60);

/// Webhook receipts are only kept for short-term debugging.
pub const WEBHOOK_LOG_TTL: Duration = Duration::from_secs(7 * 24 * 60 * 60);

/// Recent orders feed the social-proof ticker.
pub const RECENT_ORDER_TTL: Duration = DAY;

pub const FULFILLMENT_TTL: Duration = Duration::from_secs(7 * 24 * 60 * 60);

pub const REFERRAL_REWARD_TTL: Duration = Duration::from_secs(90 * 24 * 60 * 60);

pub const PRODUCT_SNAPSHOT_TTL: Duration = Duration::from_secs(90 * 24 * 60 * 60);

pub const RECENT_ORDER_PREFIX: &str = "recent_order:";

#[must_use]
pub fn referral(code: &str) -> String {
    format!("referral:{code}")
}

#[must_use]
pub fn webhook_log(topic: &str, received_at_ms: i64) -> String {
    format!("webhook_log:{topic}:{received_at_ms}")
}

#[must_use]
pub fn recent_order(order_id: &str) -> String {
    format!("{RECENT_ORDER_PREFIX}{order_id}")
}

#[must_use]
pub fn fulfillment(order_id: &str) -> String {
    format!("fulfillment:{order_id}")
}

#[must_use]
pub fn referral_reward(referrer_code: &str, order_id: &str) -> String {
    format!("referral_reward:{referrer_code}:{order_id}")
}

#[must_use]
pub fn product(product_id: &str) -> String {
    format!("product:{product_id}")
}
