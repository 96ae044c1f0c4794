//! Shopify Webhook Handler

use jiff::Timestamp;
use salvo::{oapi::ToSchema, prelude::*};
use serde::{Deserialize, Serialize};
use tracing::{error, info, warn};

use jerrycan_app::webhooks::verify_signature;

use crate::{extensions::*, observability::{WebhookResult, observe_webhook}};

pub(crate) const HMAC_HEADER: &str = "x-shopify-hmac-sha256";
pub(crate) const TOPIC_HEADER: &str = "x-shopify-topic";

/// Webhook Acknowledgement
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub(crate) struct WebhookAck {
    pub success: bool,
}

/// Shopify Webhook Handler
///
/// Verifies the delivery signature, then always acknowledges. Processing
/// failures are logged, never returned to the sender.
#[endpoint(
    tags("webhooks"),
    summary = "Shopify Webhook",
    responses(
        (status_code = StatusCode::OK, description = "Delivery acknowledged"),
        (status_code = StatusCode::UNAUTHORIZED, description = "Missing headers or bad signature"),
        (status_code = StatusCode::INTERNAL_SERVER_ERROR, description = "Webhook secret not configured"),
    ),
)]
pub(crate) async fn handler(
    req: &mut Request,
    depot: &mut Depot,
) -> Result<Json<WebhookAck>, StatusError> {
    let state = depot.state()?;

    let Some(secret) = state.webhook_secret.as_ref() else {
        error!("webhook received but no webhook secret is configured");

        return Err(StatusError::internal_server_error());
    };

    let (Some(signature), Some(topic)) = (
        req.header::<String>(HMAC_HEADER),
        req.header::<String>(TOPIC_HEADER),
    ) else {
        warn!("webhook rejected: missing signature or topic header");

        return Err(StatusError::unauthorized());
    };

    let body = req
        .payload_with_max_size(state.webhook_body_limit)
        .await
        .or_400("could not read webhook body")?
        .to_vec();

    if !verify_signature(secret.expose().as_bytes(), &body, &signature) {
        warn!(topic = %topic, "webhook rejected: signature mismatch");
        observe_webhook(&topic, WebhookResult::Rejected);

        return Err(StatusError::unauthorized());
    }

    match state
        .app
        .webhooks
        .process(&topic, &body, Timestamp::now())
        .await
    {
        Ok(outcome) => {
            info!(topic = %topic, ?outcome, "webhook processed");
            observe_webhook(&topic, WebhookResult::Processed(outcome.label()));
        }
        Err(error) => {
            error!(topic = %topic, "webhook processing failed: {error}");
            observe_webhook(&topic, WebhookResult::Failed);
        }
    }

    Ok(Json(WebhookAck { success: true }))
}
