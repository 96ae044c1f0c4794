//! Jerry Can Domain Concerns

pub mod batches;
pub mod referrals;
