//! Commerce webhooks and the social-proof feed

mod handlers;

pub(crate) use handlers::*;
