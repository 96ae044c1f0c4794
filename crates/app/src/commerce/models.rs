//! Commerce admin payloads.

use serde::{Deserialize, Serialize};

/// A redeemable discount: a price rule with one literal code attached.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DiscountCode {
    pub price_rule_id: u64,
    pub discount_code_id: u64,
    pub code: String,
}

#[derive(Debug, Deserialize)]
pub(crate) struct PriceRuleEnvelope {
    pub(crate) price_rule: PriceRuleCreated,
}

#[derive(Debug, Deserialize)]
pub(crate) struct PriceRuleCreated {
    pub(crate) id: u64,
}

#[derive(Debug, Deserialize)]
pub(crate) struct DiscountCodeEnvelope {
    pub(crate) discount_code: DiscountCodeCreated,
}

#[derive(Debug, Deserialize)]
pub(crate) struct DiscountCodeCreated {
    pub(crate) id: u64,
    pub(crate) code: String,
}

#[derive(Debug, Deserialize)]
pub(crate) struct MetafieldsEnvelope {
    pub(crate) metafields: Vec<Metafield>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct Metafield {
    pub(crate) id: u64,
    pub(crate) value: serde_json::Value,
}
