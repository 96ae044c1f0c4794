//! Batch Records

use std::{fmt, str::FromStr};

use jiff::{Timestamp, civil::Date};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::{domain::batches::identity::LabelType, uuids::TypedUuid};

/// Batch lifecycle. Moves only forward: ageing → bottled → released → sold out.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BatchStatus {
    Ageing,
    Bottled,
    Released,
    SoldOut,
}

impl BatchStatus {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Ageing => "ageing",
            Self::Bottled => "bottled",
            Self::Released => "released",
            Self::SoldOut => "sold_out",
        }
    }

    /// Whether moving to `next` keeps the lifecycle monotonic.
    #[must_use]
    pub fn can_transition_to(self, next: Self) -> bool {
        next >= self
    }
}

impl fmt::Display for BatchStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown status {0:?}")]
pub struct UnknownStatus(pub String);

impl FromStr for BatchStatus {
    type Err = UnknownStatus;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value {
            "ageing" => Ok(Self::Ageing),
            "bottled" => Ok(Self::Bottled),
            "released" => Ok(Self::Released),
            "sold_out" => Ok(Self::SoldOut),
            other => Err(UnknownStatus(other.to_string())),
        }
    }
}

/// Bottle sale state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BottleStatus {
    Available,
    Sold,
}

impl BottleStatus {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Available => "available",
            Self::Sold => "sold",
        }
    }
}

impl FromStr for BottleStatus {
    type Err = UnknownStatus;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value {
            "available" => Ok(Self::Available),
            "sold" => Ok(Self::Sold),
            other => Err(UnknownStatus(other.to_string())),
        }
    }
}

/// Batch Record
#[derive(Debug, Clone, PartialEq)]
pub struct BatchRecord {
    /// Stable identifier used in certificate URLs, e.g. `batch-007`.
    pub id: String,
    pub name: String,
    pub cask_type: Option<String>,
    pub distillation_date: Option<Date>,
    pub bottling_date: Option<Date>,
    /// Nominal bottle count, used when no bottle rows exist yet.
    pub bottle_count: Option<u32>,
    pub abv: Option<Decimal>,
    pub status: BatchStatus,
    pub tasting_notes: Option<String>,
    pub founder_notes: Option<String>,
    pub created_at: Timestamp,
}

/// Bottle UUID
pub type BottleUuid = TypedUuid<BottleRecord>;

/// Bottle Record
#[derive(Debug, Clone, PartialEq)]
pub struct BottleRecord {
    pub uuid: BottleUuid,
    pub batch_id: String,
    pub bottle_number: u16,
    pub label_type: LabelType,
    pub gtin: Option<String>,
    pub status: BottleStatus,
    pub sold_at: Option<Timestamp>,
    pub created_at: Timestamp,
}

/// Bottle counts for a batch, as read from storage.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct BottleCounts {
    pub total: u32,
    pub available: u32,
    pub sold: u32,
}

/// Aggregate view over a batch's bottles. Recomputed on every read.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct BatchStats {
    pub total_bottles: u32,
    pub available: u32,
    pub sold: u32,
    pub days_aged: u32,
}

impl BatchStats {
    /// Combine stored counts with the batch's nominal size and age.
    #[must_use]
    pub fn compute(batch: &BatchRecord, counts: BottleCounts, today: Date) -> Self {
        let total_bottles = if counts.total > 0 {
            counts.total
        } else {
            batch.bottle_count.unwrap_or(0)
        };

        Self {
            total_bottles,
            available: counts.available,
            sold: counts.sold,
            days_aged: days_between(batch.distillation_date, today),
        }
    }
}

fn days_between(from: Option<Date>, to: Date) -> u32 {
    let Some(from) = from else {
        return 0;
    };

    from.until(to)
        .ok()
        .and_then(|span| u32::try_from(span.get_days()).ok())
        .unwrap_or(0)
}
