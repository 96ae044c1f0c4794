//! Batches: bottle identity and provenance reads.

pub mod data;
pub mod errors;
pub mod identity;
pub mod records;
mod repository;
pub mod service;

pub use errors::BatchesServiceError;
pub use service::*;
