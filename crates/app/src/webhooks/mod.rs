//! Commerce platform webhooks: verification and the conversion pipeline.

mod errors;
pub mod payload;
pub mod records;
mod service;
pub mod signature;
mod topic;

pub use errors::WebhooksServiceError;
pub use service::*;
pub use signature::verify_signature;
pub use topic::WebhookTopic;
