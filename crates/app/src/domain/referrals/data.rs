//! Referral Data

use crate::domain::referrals::records::{ConversionUuid, ReferralUuid};

/// New Referral Data
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewReferral {
    pub uuid: ReferralUuid,
    pub referrer_email: String,
    pub referrer_code: String,
}

/// New Conversion Data
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewConversion {
    pub uuid: ConversionUuid,
    pub referee_email: Option<String>,
    pub order_id: String,
    pub reward_code: String,
}
