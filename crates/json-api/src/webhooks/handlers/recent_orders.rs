//! Recent Orders Handler

use salvo::{
    oapi::{ToSchema, extract::QueryParam},
    prelude::*,
};
use serde::{Deserialize, Serialize};
use tracing::warn;

use jerrycan_app::webhooks::records::{RecentOrder, RecentOrderItem};

use crate::extensions::*;

const DEFAULT_LIMIT: usize = 10;
const MAX_LIMIT: usize = 50;

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub(crate) struct RecentOrderItemResponse {
    pub title: String,
    pub quantity: u32,
}

impl From<RecentOrderItem> for RecentOrderItemResponse {
    fn from(item: RecentOrderItem) -> Self {
        Self {
            title: item.title,
            quantity: item.quantity,
        }
    }
}

/// An anonymised order: products, bottle count and country only.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub(crate) struct RecentOrderResponse {
    pub items: Vec<RecentOrderItemResponse>,
    pub bottle_count: u32,
    pub country: String,
    pub created_at: String,
}

impl From<RecentOrder> for RecentOrderResponse {
    fn from(order: RecentOrder) -> Self {
        Self {
            items: order.items.into_iter().map(Into::into).collect(),
            bottle_count: order.bottle_count,
            country: order.country,
            created_at: order.created_at.to_string(),
        }
    }
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub(crate) struct RecentOrdersResponse {
    /// Newest first
    pub orders: Vec<RecentOrderResponse>,
}

/// Recent Orders Handler
///
/// Social-proof feed. Cache failures yield an empty list rather than an error.
#[endpoint(tags("webhooks"), summary = "Recent Orders")]
pub(crate) async fn handler(
    limit: QueryParam<usize, false>,
    depot: &mut Depot,
) -> Result<Json<RecentOrdersResponse>, StatusError> {
    let state = depot.state()?;

    let limit = limit
        .into_inner()
        .unwrap_or(DEFAULT_LIMIT)
        .clamp(1, MAX_LIMIT);

    let orders = state
        .app
        .webhooks
        .recent_orders(limit)
        .await
        .unwrap_or_else(|error| {
            warn!("failed to read recent orders: {error}");

            Vec::new()
        });

    Ok(Json(RecentOrdersResponse {
        orders: orders.into_iter().map(Into::into).collect(),
    }))
}
