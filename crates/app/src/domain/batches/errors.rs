//! Batches service errors.

use sqlx::{
    Error,
    error::{DatabaseError, ErrorKind},
};
use thiserror::Error;

use crate::domain::batches::records::BatchStatus;

#[derive(Debug, Error)]
pub enum BatchesServiceError {
    #[error("batch already exists")]
    AlreadyExists,

    #[error("batch not found")]
    NotFound,

    #[error("invalid batch data")]
    InvalidData,

    #[error("batch cannot move from {from} back to {to}")]
    InvalidTransition { from: BatchStatus, to: BatchStatus },

    #[error("storage error")]
    Sql(#[source] Error),
}

impl From<Error> for BatchesServiceError {
    fn from(error: Error) -> Self {
        if matches!(error, Error::RowNotFound) {
            return Self::NotFound;
        }

        match error.as_database_error().map(DatabaseError::kind) {
            Some(ErrorKind::UniqueViolation) => Self::AlreadyExists,
            Some(ErrorKind::NotNullViolation | ErrorKind::CheckViolation) => Self::InvalidData,
            Some(ErrorKind::ForeignKeyViolation | ErrorKind::Other | _) | None => Self::Sql(error),
        }
    }
}
