//! Key-value records written by the webhook pipeline.

use jiff::Timestamp;
use serde::{Deserialize, Serialize};

/// Receipt of a webhook delivery, written before the body is parsed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WebhookLogEntry {
    pub topic: String,
    pub received_at: Timestamp,
}

/// Anonymised order for the social-proof feed. Carries no buyer details.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecentOrder {
    pub items: Vec<RecentOrderItem>,
    pub bottle_count: u32,
    pub country: String,
    pub created_at: Timestamp,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecentOrderItem {
    pub title: String,
    pub quantity: u32,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FulfillmentRecord {
    pub order_id: String,
    pub status: Option<String>,
    pub fulfilled_at: Timestamp,
}

/// Notification that a referrer earned a reward.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReferralRewardRecord {
    pub referrer_email: String,
    pub referrer_code: String,
    pub reward_code: String,
    pub order_id: String,
    pub referee_email: Option<String>,
    pub created_at: Timestamp,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProductSnapshot {
    pub id: u64,
    pub title: Option<String>,
    pub status: Option<String>,
    pub updated_at: Option<String>,
    pub received_at: Timestamp,
}
