//! Batches and bottle certificates

mod errors;
mod handlers;
mod models;

pub(crate) use handlers::*;
