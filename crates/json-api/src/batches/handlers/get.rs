//! Get Batch Handler

use jiff::Zoned;
use salvo::{
    oapi::{ToSchema, extract::PathParam},
    prelude::*,
};
use serde::{Deserialize, Serialize};

use crate::{
    batches::{
        errors::into_status_error,
        models::{BatchResponse, BatchStatsResponse},
    },
    extensions::*,
};

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub(crate) struct BatchDetailResponse {
    pub batch: BatchResponse,
    pub stats: BatchStatsResponse,
}

/// Get Batch Handler
///
/// Returns a batch with its bottle stats.
#[endpoint(
    tags("batches"),
    summary = "Get Batch",
    responses(
        (status_code = StatusCode::OK, description = "Batch found"),
        (status_code = StatusCode::NOT_FOUND, description = "Unknown batch"),
    ),
)]
pub(crate) async fn handler(
    batch: PathParam<String>,
    depot: &mut Depot,
) -> Result<Json<BatchDetailResponse>, StatusError> {
    let state = depot.state()?;
    let id = batch.into_inner();

    let record = state
        .app
        .batches
        .get_batch(&id)
        .await
        .map_err(into_status_error)?
        .ok_or_else(|| StatusError::not_found().brief("Batch not found"))?;

    let stats = state
        .app
        .batches
        .get_batch_stats(&id, Zoned::now().date())
        .await
        .map_err(into_status_error)?
        .ok_or_else(|| StatusError::not_found().brief("Batch not found"))?;

    Ok(Json(BatchDetailResponse {
        batch: record.into(),
        stats: stats.into(),
    }))
}
