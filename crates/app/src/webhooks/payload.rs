//! Inbound webhook payloads.
//!
//! Only the fields the pipeline reads are modelled; everything else in the
//! platform's payload is ignored.

use serde::Deserialize;

/// Note attribute the storefront sets when a visitor arrives via `/refer/{code}`.
pub const REFERRAL_ATTRIBUTE: &str = "_referral_code";

const UNKNOWN_COUNTRY: &str = "unknown";

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct OrderPayload {
    pub id: u64,

    #[serde(default)]
    pub email: Option<String>,

    #[serde(default)]
    pub customer: Option<Customer>,

    #[serde(default)]
    pub created_at: Option<String>,

    #[serde(default)]
    pub line_items: Vec<LineItem>,

    #[serde(default)]
    pub note_attributes: Vec<NoteAttribute>,

    #[serde(default)]
    pub discount_codes: Vec<AppliedDiscount>,

    #[serde(default)]
    pub shipping_address: Option<Address>,

    #[serde(default)]
    pub billing_address: Option<Address>,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct Customer {
    #[serde(default)]
    pub email: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct LineItem {
    #[serde(default)]
    pub product_id: Option<u64>,

    pub title: String,

    pub quantity: u32,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct NoteAttribute {
    pub name: String,

    #[serde(default)]
    pub value: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct AppliedDiscount {
    pub code: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Deserialize)]
pub struct Address {
    #[serde(default)]
    pub country: Option<String>,

    #[serde(default)]
    pub country_code: Option<String>,
}

impl OrderPayload {
    #[must_use]
    pub fn order_id(&self) -> String {
        self.id.to_string()
    }

    /// Line items whose title contains `brand`, ignoring case.
    #[must_use]
    pub fn brand_line_items(&self, brand: &str) -> Vec<&LineItem> {
        let brand = brand.to_lowercase();

        self.line_items
            .iter()
            .filter(|item| item.title.to_lowercase().contains(&brand))
            .collect()
    }

    /// Shipping country, falling back to billing, then `"unknown"`.
    #[must_use]
    pub fn country(&self) -> String {
        let shipping = self.shipping_address.as_ref();
        let billing = self.billing_address.as_ref();

        [
            shipping.and_then(|a| a.country_code.as_deref()),
            shipping.and_then(|a| a.country.as_deref()),
            billing.and_then(|a| a.country_code.as_deref()),
            billing.and_then(|a| a.country.as_deref()),
        ]
        .into_iter()
        .flatten()
        .map(str::trim)
        .find(|value| !value.is_empty())
        .unwrap_or(UNKNOWN_COUNTRY)
        .to_string()
    }

    /// The buyer's email, from the order or its customer.
    #[must_use]
    pub fn buyer_email(&self) -> Option<&str> {
        let present = |email: &&str| !email.trim().is_empty();

        self.email
            .as_deref()
            .filter(present)
            .or_else(|| self.customer.as_ref()?.email.as_deref().filter(present))
    }

    /// Candidate referral codes, the note attribute first, then redeemed discounts.
    #[must_use]
    pub fn referral_code_candidates(&self) -> Vec<&str> {
        let attribute = self
            .note_attributes
            .iter()
            .filter(|attribute| attribute.name == REFERRAL_ATTRIBUTE)
            .filter_map(|attribute| attribute.value.as_deref());

        let discounts = self.discount_codes.iter().map(|discount| discount.code.as_str());

        let mut candidates: Vec<&str> = Vec::new();

        for code in attribute.chain(discounts).map(str::trim) {
            if !code.is_empty() && !candidates.contains(&code) {
                candidates.push(code);
            }
        }

        candidates
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct FulfillmentPayload {
    pub id: u64,

    #[serde(default)]
    pub fulfillment_status: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct ProductPayload {
    pub id: u64,

    #[serde(default)]
    pub title: Option<String>,

    #[serde(default)]
    pub status: Option<String>,

    #[serde(default)]
    pub updated_at: Option<String>,
}
