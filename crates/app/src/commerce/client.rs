//! Shopify Admin REST client for discount codes and product metafields.

use async_trait::async_trait;
use jiff::Timestamp;
use mockall::automock;
use reqwest::{Client, RequestBuilder, Response};
use rust_decimal::Decimal;
use serde::de::DeserializeOwned;
use serde_json::{Value, json};
use tracing::{debug, info};

use crate::{
    commerce::{
        CommerceAdminError,
        models::{DiscountCode, DiscountCodeEnvelope, MetafieldsEnvelope, PriceRuleEnvelope},
    },
    secret::Secret,
};

const ACCESS_TOKEN_HEADER: &str = "X-Shopify-Access-Token";

/// Metafield holding the running pre-order tally on each product.
pub const PREORDER_NAMESPACE: &str = "custom";
pub const PREORDER_KEY: &str = "preorder_sold";

/// Connection settings for the admin API.
#[derive(Debug, Clone)]
pub struct ShopifyAdminConfig {
    /// Store domain, e.g. `"jerry-can-spirits.myshopify.com"`.
    pub store_domain: String,

    /// Admin API version, e.g. `"2024-10"`.
    pub api_version: String,

    /// Admin API access token.
    pub access_token: Secret,
}

impl ShopifyAdminConfig {
    fn base_url(&self) -> String {
        let domain = self.store_domain.trim_end_matches('/');

        if domain.starts_with("http://") || domain.starts_with("https://") {
            format!("{domain}/admin/api/{}", self.api_version)
        } else {
            format!("https://{domain}/admin/api/{}", self.api_version)
        }
    }
}

#[automock]
#[async_trait]
pub trait CommerceAdmin: Send + Sync {
    /// Create a fixed-amount, single-use discount redeemable with `code`.
    async fn create_discount_code(
        &self,
        code: &str,
        amount: Decimal,
    ) -> Result<DiscountCode, CommerceAdminError>;

    /// Add `quantity` to the product's pre-order counter.
    async fn increment_preorder_sold(
        &self,
        product_id: u64,
        quantity: u32,
    ) -> Result<u64, CommerceAdminError>;
}

/// HTTP client for the Shopify Admin REST API.
#[derive(Debug, Clone)]
pub struct ShopifyAdminClient {
    config: ShopifyAdminConfig,
    base_url: String,
    http: Client,
}

impl ShopifyAdminClient {
    #[must_use]
    pub fn new(config: ShopifyAdminConfig) -> Self {
        Self {
            base_url: config.base_url(),
            config,
            http: Client::new(),
        }
    }

    fn authorized(&self, request: RequestBuilder) -> RequestBuilder {
        request.header(ACCESS_TOKEN_HEADER, self.config.access_token.expose())
    }

    async fn send<T>(
        &self,
        operation: &'static str,
        request: RequestBuilder,
    ) -> Result<T, CommerceAdminError>
    where
        T: DeserializeOwned,
    {
        let response = self.authorized(request).send().await?;

        Ok(ensure_success(operation, response).await?.json().await?)
    }
}

async fn ensure_success(
    operation: &'static str,
    response: Response,
) -> Result<Response, CommerceAdminError> {
    if response.status().is_success() {
        return Ok(response);
    }

    let status = response.status().as_u16();
    let body = response.text().await.unwrap_or_default();

    Err(CommerceAdminError::UnexpectedResponse {
        operation,
        status,
        body,
    })
}

#[async_trait]
impl CommerceAdmin for ShopifyAdminClient {
    async fn create_discount_code(
        &self,
        code: &str,
        amount: Decimal,
    ) -> Result<DiscountCode, CommerceAdminError> {
        let price_rule: PriceRuleEnvelope = self
            .send(
                "create price rule",
                self.http
                    .post(format!("{}/price_rules.json", self.base_url))
                    .json(&price_rule_body(code, amount, Timestamp::now())),
            )
            .await?;

        let price_rule_id = price_rule.price_rule.id;

        debug!(code, price_rule_id, "created price rule");

        let discount: DiscountCodeEnvelope = self
            .send(
                "create discount code",
                self.http
                    .post(format!(
                        "{}/price_rules/{price_rule_id}/discount_codes.json",
                        self.base_url
                    ))
                    .json(&discount_code_body(code)),
            )
            .await?;

        info!(code, price_rule_id, "created discount code");

        Ok(DiscountCode {
            price_rule_id,
            discount_code_id: discount.discount_code.id,
            code: discount.discount_code.code,
        })
    }

    async fn increment_preorder_sold(
        &self,
        product_id: u64,
        quantity: u32,
    ) -> Result<u64, CommerceAdminError> {
        let existing: MetafieldsEnvelope = self
            .send(
                "read pre-order metafield",
                self.http
                    .get(format!(
                        "{}/products/{product_id}/metafields.json",
                        self.base_url
                    ))
                    .query(&[("namespace", PREORDER_NAMESPACE), ("key", PREORDER_KEY)]),
            )
            .await?;

        let (metafield_id, current) = match existing.metafields.first() {
            Some(metafield) => (Some(metafield.id), counter_value(&metafield.value)?),
            None => (None, 0),
        };

        let next = current.saturating_add(u64::from(quantity));

        let request = match metafield_id {
            Some(metafield_id) => self.http.put(format!(
                "{}/products/{product_id}/metafields/{metafield_id}.json",
                self.base_url
            )),
            None => self.http.post(format!(
                "{}/products/{product_id}/metafields.json",
                self.base_url
            )),
        };

        let _: Value = self
            .send(
                "write pre-order metafield",
                request.json(&metafield_body(metafield_id, next)),
            )
            .await?;

        debug!(product_id, quantity, total = next, "incremented pre-order counter");

        Ok(next)
    }
}

pub(crate) fn price_rule_body(code: &str, amount: Decimal, starts_at: Timestamp) -> Value {
    json!({
        "price_rule": {
            "title": code,
            "target_type": "line_item",
            "target_selection": "all",
            "allocation_method": "across",
            "value_type": "fixed_amount",
            "value": format!("-{:.2}", amount.abs()),
            "customer_selection": "all",
            "usage_limit": 1,
            "once_per_customer": true,
            "starts_at": starts_at.to_string(),
        }
    })
}

pub(crate) fn discount_code_body(code: &str) -> Value {
    json!({ "discount_code": { "code": code } })
}

pub(crate) fn metafield_body(metafield_id: Option<u64>, value: u64) -> Value {
    match metafield_id {
        Some(id) => json!({
            "metafield": {
                "id": id,
                "value": value.to_string(),
                "type": "number_integer",
            }
        }),
        None => json!({
            "metafield": {
                "namespace": PREORDER_NAMESPACE,
                "key": PREORDER_KEY,
                "value": value.to_string(),
                "type": "number_integer",
            }
        }),
    }
}

/// Metafield values arrive either as JSON numbers or as numeric strings.
pub(crate) fn counter_value(value: &Value) -> Result<u64, CommerceAdminError> {
    match value {
        Value::Number(number) => number.as_u64(),
        Value::String(text) => text.trim().parse().ok(),
        _ => None,
    }
    .ok_or_else(|| CommerceAdminError::InvalidCounter(value.to_string()))
}
