//! Batch Errors

use salvo::http::StatusError;
use tracing::error;

use jerrycan_app::domain::batches::BatchesServiceError;

pub(crate) fn into_status_error(error: BatchesServiceError) -> StatusError {
    match error {
        BatchesServiceError::NotFound => StatusError::not_found().brief("Batch not found"),
        BatchesServiceError::AlreadyExists => StatusError::conflict().brief("Batch already exists"),
        BatchesServiceError::InvalidData | BatchesServiceError::InvalidTransition { .. } => {
            StatusError::bad_request().brief("Invalid batch data")
        }
        BatchesServiceError::Sql(source) => {
            error!("failed to read batches: {source}");

            StatusError::internal_server_error()
        }
    }
}
