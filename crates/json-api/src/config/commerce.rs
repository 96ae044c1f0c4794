//! Commerce Config

use clap::Args;
use jerrycan_app::{commerce::ShopifyAdminConfig, secret::Secret};
use rust_decimal::Decimal;

/// Commerce platform admin settings.
#[derive(Debug, Args)]
pub struct CommerceConfig {
    /// Store domain, e.g. `jerry-can-spirits.myshopify.com`
    #[arg(long, env = "SHOPIFY_STORE_DOMAIN", default_value = "")]
    pub store_domain: String,

    /// Admin API version
    #[arg(long, env = "SHOPIFY_API_VERSION", default_value = "2024-10")]
    pub api_version: String,

    /// Admin API access token; referral issuance is disabled without it.
    #[arg(long, env = "SHOPIFY_ADMIN_ACCESS_TOKEN", hide_env_values = true)]
    pub admin_access_token: Option<String>,

    /// Shared secret for webhook signatures.
    #[arg(long, env = "SHOPIFY_WEBHOOK_SECRET", hide_env_values = true)]
    pub webhook_secret: Option<String>,

    /// Fixed amount off a referee's first order.
    #[arg(long, env = "REFERRAL_DISCOUNT_AMOUNT", default_value = "5.00")]
    pub referee_discount: Decimal,

    /// Fixed amount of the reward minted for a referrer.
    #[arg(long, env = "REFERRAL_REWARD_AMOUNT", default_value = "10.00")]
    pub reward_amount: Decimal,

    /// Largest webhook body accepted, in bytes.
    #[arg(long, env = "WEBHOOK_MAX_BODY_BYTES", default_value_t = 4 * 1024 * 1024)]
    pub webhook_max_body_bytes: usize,
}

impl CommerceConfig {
    /// Admin client settings, when a token and store are configured.
    #[must_use]
    pub fn admin(&self) -> Option<ShopifyAdminConfig> {
        if self.store_domain.trim().is_empty() {
            return None;
        }

        Secret::non_empty(self.admin_access_token.clone()).map(|access_token| {
            ShopifyAdminConfig {
                store_domain: self.store_domain.clone(),
                api_version: self.api_version.clone(),
                access_token,
            }
        })
    }

    #[must_use]
    pub fn webhook_secret(&self) -> Option<Secret> {
        Secret::non_empty(self.webhook_secret.clone())
    }
}
