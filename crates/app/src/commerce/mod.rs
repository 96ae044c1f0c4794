//! Commerce platform admin bridge: discount codes and product counters.

mod client;
pub mod codes;
mod errors;
mod models;

pub use client::*;
pub use codes::{generate_referral_code, generate_reward_code};
pub use errors::CommerceAdminError;
pub use models::*;
