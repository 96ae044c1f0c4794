//! Batches Repository

use jiff_sqlx::{Date as SqlxDate, Timestamp as SqlxTimestamp};
use sqlx::{FromRow, Postgres, Row, Transaction, postgres::PgRow, query_as, query_scalar};

use crate::domain::batches::{
    data::NewBatch,
    identity::LabelType,
    records::{BatchRecord, BatchStatus, BottleCounts, BottleRecord, BottleStatus, BottleUuid},
};

const GET_BATCH_SQL: &str = include_str!("sql/get_batch.sql");
const LIST_BATCHES_SQL: &str = include_str!("sql/list_batches.sql");
const COUNT_BOTTLES_SQL: &str = include_str!("sql/count_bottles.sql");
const GET_BOTTLE_SQL: &str = include_str!("sql/get_bottle.sql");
const CREATE_BATCH_SQL: &str = include_str!("sql/create_batch.sql");
const LOCK_BATCH_SQL: &str = include_str!("sql/lock_batch.sql");
const UPDATE_BATCH_STATUS_SQL: &str = include_str!("sql/update_batch_status.sql");

#[derive(Debug, Clone, Default)]
pub(crate) struct PgBatchesRepository;

impl PgBatchesRepository {
    #[must_use]
    pub(crate) fn new() -> Self {
        Self
    }

    pub(crate) async fn get_batch(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        id: &str,
    ) -> Result<Option<BatchRecord>, sqlx::Error> {
        query_as::<Postgres, BatchRecord>(GET_BATCH_SQL)
            .bind(id)
            .fetch_optional(&mut **tx)
            .await
    }

    pub(crate) async fn list_batches(
        &self,
        tx: &mut Transaction<'_, Postgres>,
    ) -> Result<Vec<BatchRecord>, sqlx::Error> {
        query_as::<Postgres, BatchRecord>(LIST_BATCHES_SQL)
            .fetch_all(&mut **tx)
            .await
    }

    pub(crate) async fn count_bottles(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        batch: &str,
    ) -> Result<BottleCounts, sqlx::Error> {
        let row = sqlx::query(COUNT_BOTTLES_SQL)
            .bind(batch)
            .fetch_one(&mut **tx)
            .await?;

        Ok(BottleCounts {
            total: try_get_count(&row, "total")?,
            available: try_get_count(&row, "available")?,
            sold: try_get_count(&row, "sold")?,
        })
    }

    pub(crate) async fn get_bottle(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        batch: &str,
        label_type: LabelType,
        bottle_number: u16,
    ) -> Result<Option<BottleRecord>, sqlx::Error> {
        query_as::<Postgres, BottleRecord>(GET_BOTTLE_SQL)
            .bind(batch)
            .bind(label_type.as_str())
            .bind(i32::from(bottle_number))
            .fetch_optional(&mut **tx)
            .await
    }

    pub(crate) async fn create_batch(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        batch: NewBatch,
    ) -> Result<BatchRecord, sqlx::Error> {
        let bottle_count = batch
            .bottle_count
            .map(i32::try_from)
            .transpose()
            .map_err(|e| sqlx::Error::ColumnDecode {
                index: "bottle_count".to_string(),
                source: Box::new(e),
            })?;

        query_as::<Postgres, BatchRecord>(CREATE_BATCH_SQL)
            .bind(batch.id)
            .bind(batch.name)
            .bind(batch.cask_type)
            .bind(batch.distillation_date.map(SqlxDate::from))
            .bind(batch.bottling_date.map(SqlxDate::from))
            .bind(bottle_count)
            .bind(batch.abv)
            .bind(batch.status.as_str())
            .bind(batch.tasting_notes)
            .bind(batch.founder_notes)
            .fetch_one(&mut **tx)
            .await
    }

    /// Read the current status and hold a row lock until the transaction ends.
    pub(crate) async fn lock_batch_status(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        id: &str,
    ) -> Result<Option<BatchStatus>, sqlx::Error> {
        let status: Option<String> = query_scalar(LOCK_BATCH_SQL)
            .bind(id)
            .fetch_optional(&mut **tx)
            .await?;

        status
            .map(|status| status.parse::<BatchStatus>())
            .transpose()
            .map_err(|e| sqlx::Error::ColumnDecode {
                index: "status".to_string(),
                source: Box::new(e),
            })
    }

    pub(crate) async fn update_batch_status(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        id: &str,
        status: BatchStatus,
    ) -> Result<BatchRecord, sqlx::Error> {
        query_as::<Postgres, BatchRecord>(UPDATE_BATCH_STATUS_SQL)
            .bind(id)
            .bind(status.as_str())
            .fetch_one(&mut **tx)
            .await
    }
}

fn try_get_count(row: &PgRow, column: &str) -> sqlx::Result<u32> {
    let count: i64 = row.try_get(column)?;

    u32::try_from(count).map_err(|e| sqlx::Error::ColumnDecode {
        index: column.to_string(),
        source: Box::new(e),
    })
}

impl<'r> FromRow<'r, PgRow> for BatchRecord {
    fn from_row(row: &'r PgRow) -> sqlx::Result<Self> {
        let bottle_count = row
            .try_get::<Option<i32>, _>("bottle_count")?
            .map(u32::try_from)
            .transpose()
            .map_err(|e| sqlx::Error::ColumnDecode {
                index: "bottle_count".to_string(),
                source: Box::new(e),
            })?;

        let status = row
            .try_get::<String, _>("status")?
            .parse::<BatchStatus>()
            .map_err(|e| sqlx::Error::ColumnDecode {
                index: "status".to_string(),
                source: Box::new(e),
            })?;

        Ok(Self {
            id: row.try_get("id")?,
            name: row.try_get("name")?,
            cask_type: row.try_get("cask_type")?,
            distillation_date: row
                .try_get::<Option<SqlxDate>, _>("distillation_date")?
                .map(SqlxDate::to_jiff),
            bottling_date: row
                .try_get::<Option<SqlxDate>, _>("bottling_date")?
                .map(SqlxDate::to_jiff),
            bottle_count,
            abv: row.try_get("abv")?,
            status,
            tasting_notes: row.try_get("tasting_notes")?,
            founder_notes: row.try_get("founder_notes")?,
            created_at: row.try_get::<SqlxTimestamp, _>("created_at")?.to_jiff(),
        })
    }
}

impl<'r> FromRow<'r, PgRow> for BottleRecord {
    fn from_row(row: &'r PgRow) -> sqlx::Result<Self> {
        let bottle_number = u16::try_from(row.try_get::<i32, _>("bottle_number")?).map_err(|e| {
            sqlx::Error::ColumnDecode {
                index: "bottle_number".to_string(),
                source: Box::new(e),
            }
        })?;

        let label_type = row
            .try_get::<String, _>("label_type")?
            .parse::<LabelType>()
            .map_err(|e| sqlx::Error::ColumnDecode {
                index: "label_type".to_string(),
                source: Box::new(e),
            })?;

        let status = row
            .try_get::<String, _>("status")?
            .parse::<BottleStatus>()
            .map_err(|e| sqlx::Error::ColumnDecode {
                index: "status".to_string(),
                source: Box::new(e),
            })?;

        Ok(Self {
            uuid: BottleUuid::from_uuid(row.try_get("uuid")?),
            batch_id: row.try_get("batch_id")?,
            bottle_number,
            label_type,
            gtin: row.try_get("gtin")?,
            status,
            sold_at: row
                .try_get::<Option<SqlxTimestamp>, _>("sold_at")?
                .map(SqlxTimestamp::to_jiff),
            created_at: row.try_get::<SqlxTimestamp, _>("created_at")?.to_jiff(),
        })
    }
}
