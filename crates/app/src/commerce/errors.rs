//! Commerce admin errors.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum CommerceAdminError {
    /// An HTTP transport or serialization error occurred.
    #[error("http error: {0}")]
    Http(#[from] reqwest::Error),

    /// The platform returned a non-2xx response.
    #[error("{operation} failed with status {status}: {body}")]
    UnexpectedResponse {
        operation: &'static str,
        status: u16,
        body: String,
    },

    /// A stored counter was not a number.
    #[error("metafield {0} does not hold an integer")]
    InvalidCounter(String),
}
