//! Webhook pipeline errors.

use thiserror::Error;

use crate::{
    commerce::CommerceAdminError, domain::referrals::ReferralsServiceError, kv::KvStoreError,
};

#[derive(Debug, Error)]
pub enum WebhooksServiceError {
    #[error("malformed webhook payload")]
    Payload(#[from] serde_json::Error),

    #[error("key-value store error")]
    Kv(#[from] KvStoreError),

    #[error("referral attribution failed")]
    Referrals(#[from] ReferralsServiceError),

    #[error("commerce admin request failed")]
    Commerce(#[from] CommerceAdminError),
}
