//! Batch Data

use jiff::civil::Date;
use rust_decimal::Decimal;

use crate::domain::batches::records::BatchStatus;

/// New Batch Data
#[derive(Debug, Clone, PartialEq)]
pub struct NewBatch {
    pub id: String,
    pub name: String,
    pub cask_type: Option<String>,
    pub distillation_date: Option<Date>,
    pub bottling_date: Option<Date>,
    pub bottle_count: Option<u32>,
    pub abv: Option<Decimal>,
    pub status: BatchStatus,
    pub tasting_notes: Option<String>,
    pub founder_notes: Option<String>,
}
