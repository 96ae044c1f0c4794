//! Referral issuance and landing

mod errors;
mod handlers;

pub(crate) use handlers::*;
