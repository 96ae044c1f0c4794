//! Site Config

use clap::Args;

/// Public site settings.
#[derive(Debug, Args)]
pub struct SiteConfig {
    /// Public origin used in share links, e.g. `https://jerrycanspirits.co.uk`
    #[arg(long, env = "SITE_URL")]
    pub site_url: String,

    /// Title substring identifying this brand's products in orders.
    #[arg(long, env = "BRAND_PRODUCT_MATCH", default_value = "Jerry Can")]
    pub brand_match: String,
}
