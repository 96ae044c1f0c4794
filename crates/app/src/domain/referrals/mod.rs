//! Referral codes and the conversions they earn.

pub mod data;
pub mod email;
mod errors;
pub mod records;
mod repository;
pub mod service;

pub use errors::ReferralsServiceError;
pub use service::*;
