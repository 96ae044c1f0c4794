//! Referral Handlers

pub(crate) mod generate;
pub(crate) mod landing;
