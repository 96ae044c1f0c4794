//! Batch Handlers

pub(crate) mod certificate;
pub(crate) mod get;
pub(crate) mod index;
