//! Webhook Handlers

pub(crate) mod recent_orders;
pub(crate) mod shopify;
