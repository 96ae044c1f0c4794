//! Batch response models

use std::string::ToString;

use salvo::oapi::ToSchema;
use serde::{Deserialize, Serialize};

use jerrycan_app::domain::batches::records::{BatchRecord, BatchStats, BottleRecord};

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub(crate) struct BatchResponse {
    /// URL identifier, e.g. `batch-007`
    pub id: String,
    pub name: String,
    pub cask_type: Option<String>,

    /// Civil date, `YYYY-MM-DD`
    pub distillation_date: Option<String>,
    pub bottling_date: Option<String>,

    /// Nominal number of bottles in the run
    pub bottle_count: Option<u32>,

    /// Alcohol by volume as a decimal string, e.g. `"40.5"`
    pub abv: Option<String>,

    /// One of `ageing`, `bottled`, `released`, `sold_out`
    pub status: String,
    pub tasting_notes: Option<String>,
    pub founder_notes: Option<String>,
    pub created_at: String,
}

impl From<BatchRecord> for BatchResponse {
    fn from(batch: BatchRecord) -> Self {
        Self {
            id: batch.id,
            name: batch.name,
            cask_type: batch.cask_type,
            distillation_date: batch.distillation_date.as_ref().map(ToString::to_string),
            bottling_date: batch.bottling_date.as_ref().map(ToString::to_string),
            bottle_count: batch.bottle_count,
            abv: batch.abv.as_ref().map(ToString::to_string),
            status: batch.status.to_string(),
            tasting_notes: batch.tasting_notes,
            founder_notes: batch.founder_notes,
            created_at: batch.created_at.to_string(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub(crate) struct BatchStatsResponse {
    pub total_bottles: u32,
    pub available: u32,
    pub sold: u32,
    pub days_aged: u32,
}

impl From<BatchStats> for BatchStatsResponse {
    fn from(stats: BatchStats) -> Self {
        Self {
            total_bottles: stats.total_bottles,
            available: stats.available,
            sold: stats.sold,
            days_aged: stats.days_aged,
        }
    }
}

/// Recorded state of one physical bottle.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub(crate) struct BottleResponse {
    /// `available` or `sold`
    pub status: String,
    pub gtin: Option<String>,
    pub sold_at: Option<String>,
}

impl From<BottleRecord> for BottleResponse {
    fn from(bottle: BottleRecord) -> Self {
        Self {
            status: bottle.status.as_str().to_string(),
            gtin: bottle.gtin,
            sold_at: bottle.sold_at.as_ref().map(ToString::to_string),
        }
    }
}
