//! Batch Index Handler

use salvo::{oapi::ToSchema, prelude::*};
use serde::{Deserialize, Serialize};

use crate::{batches::models::BatchResponse, extensions::*};

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub(crate) struct BatchesResponse {
    /// Every batch, newest first
    pub batches: Vec<BatchResponse>,
}

/// Batch Index Handler
///
/// Returns every batch, newest first.
#[endpoint(tags("batches"), summary = "List Batches")]
pub(crate) async fn handler(depot: &mut Depot) -> Result<Json<BatchesResponse>, StatusError> {
    let state = depot.state()?;

    let batches = state
        .app
        .batches
        .list_batches()
        .await
        .or_500("failed to fetch batches")?;

    Ok(Json(BatchesResponse {
        batches: batches.into_iter().map(Into::into).collect(),
    }))
}
