//! Webhook conversion pipeline.

use std::sync::Arc;

use async_trait::async_trait;
use jiff::Timestamp;
use mockall::automock;
use rust_decimal::Decimal;
use tracing::{debug, info, warn};

use crate::{
    commerce::{CommerceAdmin, generate_reward_code},
    domain::referrals::{
        ReferralsService, ReferralsServiceError,
        data::NewConversion,
        records::{ConversionUuid, ReferralRecord},
    },
    kv::{self, KvStore, keys},
    webhooks::{
        WebhookTopic, WebhooksServiceError,
        payload::{FulfillmentPayload, OrderPayload, ProductPayload},
        records::{
            FulfillmentRecord, ProductSnapshot, RecentOrder, RecentOrderItem,
            ReferralRewardRecord, WebhookLogEntry,
        },
    },
};

/// Pipeline settings.
#[derive(Debug, Clone, PartialEq)]
pub struct WebhookSettings {
    /// Substring identifying this brand's products in line-item titles.
    pub brand_match: String,

    /// Fixed amount of the reward code minted for a referrer.
    pub reward_amount: Decimal,
}

/// What a delivery resulted in.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WebhookOutcome {
    /// Topic not handled; only the receipt was logged.
    Ignored,

    /// Order carried none of this brand's products.
    OrderSkipped,

    OrderRecorded {
        bottle_count: u32,
        reward_code: Option<String>,
    },

    FulfillmentRecorded,

    ProductSnapshotted,
}

impl WebhookOutcome {
    /// Short, fixed label for counters and log fields.
    #[must_use]
    pub fn label(&self) -> &'static str {
        match self {
            Self::Ignored => "ignored",
            Self::OrderSkipped => "order_skipped",
            Self::OrderRecorded {
                reward_code: Some(_),
                ..
            } => "order_rewarded",
            Self::OrderRecorded { .. } => "order_recorded",
            Self::FulfillmentRecorded => "fulfillment_recorded",
            Self::ProductSnapshotted => "product_snapshotted",
        }
    }
}

#[derive(Clone)]
pub struct WebhookPipeline {
    referrals: Arc<dyn ReferralsService>,
    commerce: Option<Arc<dyn CommerceAdmin>>,
    kv: Arc<dyn KvStore>,
    settings: WebhookSettings,
}

impl std::fmt::Debug for WebhookPipeline {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("WebhookPipeline")
            .field("commerce_configured", &self.commerce.is_some())
            .field("settings", &self.settings)
            .finish_non_exhaustive()
    }
}

impl WebhookPipeline {
    #[must_use]
    pub fn new(
        referrals: Arc<dyn ReferralsService>,
        commerce: Option<Arc<dyn CommerceAdmin>>,
        kv: Arc<dyn KvStore>,
        settings: WebhookSettings,
    ) -> Self {
        Self {
            referrals,
            commerce,
            kv,
            settings,
        }
    }

    async fn log_receipt(&self, topic: &WebhookTopic, received_at: Timestamp) {
        let entry = WebhookLogEntry {
            topic: topic.as_str().to_string(),
            received_at,
        };

        if let Err(error) = kv::put_json(
            self.kv.as_ref(),
            &keys::webhook_log(topic.as_str(), received_at.as_millisecond()),
            &entry,
            Some(keys::WEBHOOK_LOG_TTL),
        )
        .await
        {
            warn!(%topic, %error, "failed to write webhook receipt");
        }
    }

    async fn order_created(
        &self,
        body: &[u8],
        received_at: Timestamp,
    ) -> Result<WebhookOutcome, WebhooksServiceError> {
        let order: OrderPayload = serde_json::from_slice(body)?;
        let order_id = order.order_id();

        let items = order.brand_line_items(&self.settings.brand_match);

        if items.is_empty() {
            warn!(
                order_id = %order_id,
                brand = %self.settings.brand_match,
                "order has no matching products, skipping"
            );

            return Ok(WebhookOutcome::OrderSkipped);
        }

        let recent = RecentOrder {
            items: items
                .iter()
                .map(|item| RecentOrderItem {
                    title: item.title.clone(),
                    quantity: item.quantity,
                })
                .collect(),
            bottle_count: items
                .iter()
                .fold(0u32, |total, item| total.saturating_add(item.quantity)),
            country: order.country(),
            created_at: order
                .created_at
                .as_deref()
                .and_then(|created_at| created_at.parse().ok())
                .unwrap_or(received_at),
        };

        if let Err(error) = kv::put_json(
            self.kv.as_ref(),
            &keys::recent_order(&order_id),
            &recent,
            Some(keys::RECENT_ORDER_TTL),
        )
        .await
        {
            warn!(order_id = %order_id, %error, "failed to write recent order");
        }

        self.increment_preorder_counters(&order).await;

        let reward_code = self.attribute_referral(&order, received_at).await?;

        info!(
            order_id = %order_id,
            bottle_count = recent.bottle_count,
            country = %recent.country,
            "recorded order"
        );

        Ok(WebhookOutcome::OrderRecorded {
            bottle_count: recent.bottle_count,
            reward_code,
        })
    }

    /// Each product is updated on its own; one failure does not stop the rest.
    async fn increment_preorder_counters(&self, order: &OrderPayload) {
        let Some(commerce) = &self.commerce else {
            debug!("commerce admin not configured, skipping pre-order counters");
            return;
        };

        for item in &order.line_items {
            let Some(product_id) = item.product_id else {
                continue;
            };

            if let Err(error) = commerce
                .increment_preorder_sold(product_id, item.quantity)
                .await
            {
                warn!(product_id, %error, "failed to increment pre-order counter");
            }
        }
    }

    async fn resolve_referral(
        &self,
        order: &OrderPayload,
    ) -> Result<Option<ReferralRecord>, WebhooksServiceError> {
        let candidates = order.referral_code_candidates();

        for code in &candidates {
            if let Some(referral) = self.referrals.find_referral_by_code(code).await? {
                return Ok(Some(referral));
            }
        }

        if !candidates.is_empty() {
            info!(
                order_id = order.id,
                codes = ?candidates,
                "referral code did not resolve, skipping attribution"
            );
        }

        Ok(None)
    }

    async fn attribute_referral(
        &self,
        order: &OrderPayload,
        received_at: Timestamp,
    ) -> Result<Option<String>, WebhooksServiceError> {
        let Some(referral) = self.resolve_referral(order).await? else {
            return Ok(None);
        };

        let order_id = order.order_id();

        if self.referrals.conversion_exists(&order_id).await? {
            info!(order_id = %order_id, code = %referral.referrer_code, "order already rewarded");
            return Ok(None);
        }

        let Some(commerce) = &self.commerce else {
            warn!(
                order_id = %order_id,
                code = %referral.referrer_code,
                "commerce admin not configured, cannot mint reward"
            );
            return Ok(None);
        };

        let reward_code = generate_reward_code(&referral.referrer_email, received_at);

        let discount = commerce
            .create_discount_code(&reward_code, self.settings.reward_amount)
            .await?;

        let referee_email = order.buyer_email().map(str::to_string);

        let recorded = self
            .referrals
            .record_conversion(
                referral.uuid,
                NewConversion {
                    uuid: ConversionUuid::new(),
                    referee_email: referee_email.clone(),
                    order_id: order_id.clone(),
                    reward_code: discount.code.clone(),
                },
            )
            .await;

        match recorded {
            Ok(_) => {}
            Err(ReferralsServiceError::AlreadyExists) => {
                warn!(
                    order_id = %order_id,
                    orphaned_code = %discount.code,
                    "order rewarded concurrently, reward code left orphaned"
                );
                return Ok(None);
            }
            Err(error) => return Err(error.into()),
        }

        let notification = ReferralRewardRecord {
            referrer_email: referral.referrer_email.clone(),
            referrer_code: referral.referrer_code.clone(),
            reward_code: discount.code.clone(),
            order_id: order_id.clone(),
            referee_email,
            created_at: received_at,
        };

        if let Err(error) = kv::put_json(
            self.kv.as_ref(),
            &keys::referral_reward(&referral.referrer_code, &order_id),
            &notification,
            Some(keys::REFERRAL_REWARD_TTL),
        )
        .await
        {
            warn!(order_id = %order_id, %error, "failed to write referral reward notification");
        }

        info!(
            order_id = %order_id,
            code = %referral.referrer_code,
            reward_code = %discount.code,
            "rewarded referrer"
        );

        Ok(Some(discount.code))
    }

    async fn order_fulfilled(
        &self,
        body: &[u8],
        received_at: Timestamp,
    ) -> Result<WebhookOutcome, WebhooksServiceError> {
        let fulfillment: FulfillmentPayload = serde_json::from_slice(body)?;
        let order_id = fulfillment.id.to_string();

        kv::put_json(
            self.kv.as_ref(),
            &keys::fulfillment(&order_id),
            &FulfillmentRecord {
                order_id: order_id.clone(),
                status: fulfillment.fulfillment_status,
                fulfilled_at: received_at,
            },
            Some(keys::FULFILLMENT_TTL),
        )
        .await?;

        info!(order_id = %order_id, "recorded fulfillment");

        Ok(WebhookOutcome::FulfillmentRecorded)
    }

    async fn product_updated(
        &self,
        body: &[u8],
        received_at: Timestamp,
    ) -> Result<WebhookOutcome, WebhooksServiceError> {
        let product: ProductPayload = serde_json::from_slice(body)?;

        kv::put_json(
            self.kv.as_ref(),
            &keys::product(&product.id.to_string()),
            &ProductSnapshot {
                id: product.id,
                title: product.title,
                status: product.status,
                updated_at: product.updated_at,
                received_at,
            },
            Some(keys::PRODUCT_SNAPSHOT_TTL),
        )
        .await?;

        debug!(product_id = product.id, "stored product snapshot");

        Ok(WebhookOutcome::ProductSnapshotted)
    }
}

#[async_trait]
impl WebhooksService for WebhookPipeline {
    async fn process(
        &self,
        topic: &str,
        body: &[u8],
        received_at: Timestamp,
    ) -> Result<WebhookOutcome, WebhooksServiceError> {
        let topic = WebhookTopic::from(topic);

        self.log_receipt(&topic, received_at).await;

        match topic {
            WebhookTopic::OrderCreated => self.order_created(body, received_at).await,
            WebhookTopic::OrderFulfilled => self.order_fulfilled(body, received_at).await,
            WebhookTopic::ProductUpdated => self.product_updated(body, received_at).await,
            WebhookTopic::Other(topic) => {
                info!(%topic, "unhandled webhook topic");
                Ok(WebhookOutcome::Ignored)
            }
        }
    }

    async fn recent_orders(&self, limit: usize) -> Result<Vec<RecentOrder>, WebhooksServiceError> {
        let keys = self.kv.list(keys::RECENT_ORDER_PREFIX).await?;

        let mut orders = Vec::with_capacity(keys.len());

        for key in keys {
            match kv::get_json::<RecentOrder>(self.kv.as_ref(), &key).await {
                Ok(Some(order)) => orders.push(order),
                Ok(None) => {}
                Err(error) => debug!(key = %key, %error, "skipping unreadable recent order"),
            }
        }

        orders.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        orders.truncate(limit);

        Ok(orders)
    }
}

#[automock]
#[async_trait]
pub trait WebhooksService: Send + Sync {
    /// Handle a verified delivery.
    ///
    /// A receipt is logged for every delivery before the body is parsed.
    async fn process(
        &self,
        topic: &str,
        body: &[u8],
        received_at: Timestamp,
    ) -> Result<WebhookOutcome, WebhooksServiceError>;

    /// Newest anonymised orders, at most `limit`.
    async fn recent_orders(&self, limit: usize) -> Result<Vec<RecentOrder>, WebhooksServiceError>;
}
