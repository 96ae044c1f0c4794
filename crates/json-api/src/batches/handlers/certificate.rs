//! Bottle Certificate Handler

use jiff::Zoned;
use salvo::{
    oapi::{ToSchema, extract::PathParam},
    prelude::*,
};
use serde::{Deserialize, Serialize};
use tracing::debug;

use jerrycan_app::domain::batches::identity::{certificate_url, parse_bottle_reference};

use crate::{
    batches::{
        errors::into_status_error,
        models::{BatchResponse, BatchStatsResponse, BottleResponse},
    },
    extensions::*,
};

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub(crate) struct CertificateResponse {
    /// Canonical certificate path, e.g. `/batch/batch-007/founder-12/`
    pub certificate_url: String,

    /// One of `standard`, `premium`, `founder`
    pub label_type: String,
    pub bottle_number: u16,
    pub batch: BatchResponse,
    pub stats: BatchStatsResponse,

    /// Present once the bottle has been recorded individually.
    pub bottle: Option<BottleResponse>,
}

fn not_found() -> StatusError {
    StatusError::not_found().brief("Certificate not found")
}

/// Bottle Certificate Handler
///
/// Returns the provenance certificate for one bottle. Any malformed or
/// out-of-range bottle segment is a 404.
#[endpoint(
    tags("batches"),
    summary = "Bottle Certificate",
    responses(
        (status_code = StatusCode::OK, description = "Certificate found"),
        (status_code = StatusCode::NOT_FOUND, description = "Unknown batch or invalid bottle"),
    ),
)]
pub(crate) async fn handler(
    batch: PathParam<String>,
    bottle: PathParam<String>,
    depot: &mut Depot,
) -> Result<Json<CertificateResponse>, StatusError> {
    let state = depot.state()?;
    let batch = batch.into_inner();
    let segment = bottle.into_inner();

    let reference = parse_bottle_reference(&segment).map_err(|error| {
        debug!(segment = %segment, "rejected bottle reference: {error}");

        not_found()
    })?;

    let batches = &state.app.batches;

    let record = batches
        .get_batch(&batch)
        .await
        .map_err(into_status_error)?
        .ok_or_else(not_found)?;

    let stats = batches
        .get_batch_stats(&batch, Zoned::now().date())
        .await
        .map_err(into_status_error)?
        .ok_or_else(not_found)?;

    let bottle = batches
        .get_bottle(&batch, reference.label_type, reference.bottle_number)
        .await
        .map_err(into_status_error)?;

    Ok(Json(CertificateResponse {
        certificate_url: certificate_url(&batch, reference.label_type, reference.bottle_number),
        label_type: reference.label_type.to_string(),
        bottle_number: reference.bottle_number,
        batch: record.into(),
        stats: stats.into(),
        bottle: bottle.map(Into::into),
    }))
}
