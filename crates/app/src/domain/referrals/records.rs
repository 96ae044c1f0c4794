//! Referral Records

use std::{fmt, str::FromStr};

use jiff::Timestamp;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::uuids::TypedUuid;

/// Referral UUID
pub type ReferralUuid = TypedUuid<ReferralRecord>;

/// Conversion UUID
pub type ConversionUuid = TypedUuid<ConversionRecord>;

/// One shareable code per referrer email.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReferralRecord {
    pub uuid: ReferralUuid,
    pub referrer_email: String,
    pub referrer_code: String,
    pub total_referrals: u32,
    pub total_rewards_earned: u32,
    pub created_at: Timestamp,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ConversionStatus {
    Completed,
}

impl ConversionStatus {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Completed => "completed",
        }
    }
}

impl fmt::Display for ConversionStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown conversion status {0:?}")]
pub struct UnknownConversionStatus(pub String);

impl FromStr for ConversionStatus {
    type Err = UnknownConversionStatus;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value {
            "completed" => Ok(Self::Completed),
            other => Err(UnknownConversionStatus(other.to_string())),
        }
    }
}

/// An order that redeemed a referral code and earned the referrer a reward.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConversionRecord {
    pub uuid: ConversionUuid,
    pub referral_uuid: ReferralUuid,
    pub referee_email: Option<String>,
    pub order_id: String,
    pub reward_code: String,
    pub status: ConversionStatus,
    pub created_at: Timestamp,
}

/// Cached pointer used by the landing page, stored under `referral:{code}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CachedReferral {
    pub email: String,
    pub code: String,
    pub created_at: Timestamp,
}

impl From<&ReferralRecord> for CachedReferral {
    fn from(record: &ReferralRecord) -> Self {
        Self {
            email: record.referrer_email.clone(),
            code: record.referrer_code.clone(),
            created_at: record.created_at,
        }
    }
}

/// Outcome of an issuance request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct IssuedReferral {
    pub code: String,
    pub share_url: String,

    /// `true` when the email already had a code.
    pub existing: bool,
}

/// Shareable landing URL for a referral code.
#[must_use]
pub fn share_url(site_url: &str, code: &str) -> String {
    format!("{}/refer/{code}/", site_url.trim_end_matches('/'))
}
