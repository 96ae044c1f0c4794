//! Shared application domain, persistence and integration modules.

pub mod commerce;
pub mod context;
pub mod database;
pub mod domain;
pub mod kv;
pub mod secret;
pub mod webhooks;

#[cfg(test)]
mod test;

mod uuids;
