//! Webhook topics.

use std::fmt;

/// Topic carried in the `x-shopify-topic` header.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum WebhookTopic {
    OrderCreated,
    OrderFulfilled,
    ProductUpdated,
    Other(String),
}

impl WebhookTopic {
    #[must_use]
    pub fn as_str(&self) -> &str {
        match self {
            Self::OrderCreated => "orders/create",
            Self::OrderFulfilled => "orders/fulfilled",
            Self::ProductUpdated => "products/update",
            Self::Other(topic) => topic,
        }
    }

    /// Like [`Self::as_str`], but every unhandled topic shares one label.
    #[must_use]
    pub fn label(&self) -> &'static str {
        match self {
            Self::OrderCreated => "orders/create",
            Self::OrderFulfilled => "orders/fulfilled",
            Self::ProductUpdated => "products/update",
            Self::Other(_) => "other",
        }
    }
}

impl From<&str> for WebhookTopic {
    fn from(topic: &str) -> Self {
        match topic.trim() {
            "orders/create" => Self::OrderCreated,
            "orders/fulfilled" => Self::OrderFulfilled,
            "products/update" => Self::ProductUpdated,
            other => Self::Other(other.to_string()),
        }
    }
}

impl fmt::Display for WebhookTopic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
