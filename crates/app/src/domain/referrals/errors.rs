//! Referrals service errors.

use sqlx::{
    Error,
    error::{DatabaseError, ErrorKind},
};
use thiserror::Error;

use crate::{commerce::CommerceAdminError, kv::KvStoreError};

#[derive(Debug, Error)]
pub enum ReferralsServiceError {
    #[error("invalid email address")]
    InvalidEmail,

    #[error("commerce admin API is not configured")]
    CommerceNotConfigured,

    #[error("referral not found")]
    NotFound,

    #[error("referral already exists")]
    AlreadyExists,

    #[error("invalid referral data")]
    InvalidData,

    #[error("commerce admin request failed")]
    Commerce(#[from] CommerceAdminError),

    #[error("key-value store error")]
    Kv(#[from] KvStoreError),

    #[error("storage error")]
    Sql(#[source] Error),
}

impl From<Error> for ReferralsServiceError {
    fn from(error: Error) -> Self {
        if matches!(error, Error::RowNotFound) {
            return Self::NotFound;
        }

        match error.as_database_error().map(DatabaseError::kind) {
            Some(ErrorKind::UniqueViolation) => Self::AlreadyExists,
            Some(ErrorKind::NotNullViolation | ErrorKind::CheckViolation) => Self::InvalidData,
            Some(ErrorKind::ForeignKeyViolation) => Self::NotFound,
            Some(ErrorKind::Other | _) | None => Self::Sql(error),
        }
    }
}
