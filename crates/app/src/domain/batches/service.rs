//! Batches service.

use async_trait::async_trait;
use jiff::civil::Date;
use mockall::automock;

use crate::{
    database::Db,
    domain::batches::{
        data::NewBatch,
        errors::BatchesServiceError,
        identity::LabelType,
        records::{BatchRecord, BatchStats, BatchStatus, BottleRecord},
        repository::PgBatchesRepository,
    },
};

#[derive(Debug, Clone)]
pub struct PgBatchesService {
    db: Db,
    repository: PgBatchesRepository,
}

impl PgBatchesService {
    #[must_use]
    pub fn new(db: Db) -> Self {
        Self {
            db,
            repository: PgBatchesRepository::new(),
        }
    }
}

#[async_trait]
impl BatchesService for PgBatchesService {
    async fn get_batch(&self, id: &str) -> Result<Option<BatchRecord>, BatchesServiceError> {
        let mut tx = self.db.begin().await?;

        let batch = self.repository.get_batch(&mut tx, id).await?;

        tx.commit().await?;

        Ok(batch)
    }

    async fn list_batches(&self) -> Result<Vec<BatchRecord>, BatchesServiceError> {
        let mut tx = self.db.begin().await?;

        let batches = self.repository.list_batches(&mut tx).await?;

        tx.commit().await?;

        Ok(batches)
    }

    async fn get_batch_stats(
        &self,
        id: &str,
        today: Date,
    ) -> Result<Option<BatchStats>, BatchesServiceError> {
        let mut tx = self.db.begin().await?;

        let Some(batch) = self.repository.get_batch(&mut tx, id).await? else {
            return Ok(None);
        };

        let counts = self.repository.count_bottles(&mut tx, id).await?;

        tx.commit().await?;

        Ok(Some(BatchStats::compute(&batch, counts, today)))
    }

    async fn get_bottle(
        &self,
        batch: &str,
        label_type: LabelType,
        bottle_number: u16,
    ) -> Result<Option<BottleRecord>, BatchesServiceError> {
        let mut tx = self.db.begin().await?;

        let bottle = self
            .repository
            .get_bottle(&mut tx, batch, label_type, bottle_number)
            .await?;

        tx.commit().await?;

        Ok(bottle)
    }

    async fn create_batch(&self, batch: NewBatch) -> Result<BatchRecord, BatchesServiceError> {
        let mut tx = self.db.begin().await?;

        let created = self.repository.create_batch(&mut tx, batch).await?;

        tx.commit().await?;

        Ok(created)
    }

    async fn update_batch_status(
        &self,
        id: &str,
        status: BatchStatus,
    ) -> Result<BatchRecord, BatchesServiceError> {
        let mut tx = self.db.begin().await?;

        let current = self
            .repository
            .lock_batch_status(&mut tx, id)
            .await?
            .ok_or(BatchesServiceError::NotFound)?;

        if !current.can_transition_to(status) {
            return Err(BatchesServiceError::InvalidTransition {
                from: current,
                to: status,
            });
        }

        let updated = self
            .repository
            .update_batch_status(&mut tx, id, status)
            .await?;

        tx.commit().await?;

        Ok(updated)
    }
}

#[automock]
#[async_trait]
pub trait BatchesService: Send + Sync {
    /// Retrieve a single batch by its URL identifier.
    async fn get_batch(&self, id: &str) -> Result<Option<BatchRecord>, BatchesServiceError>;

    /// Retrieve every batch, newest first.
    async fn list_batches(&self) -> Result<Vec<BatchRecord>, BatchesServiceError>;

    /// Aggregate bottle stats, or `None` when the batch does not exist.
    async fn get_batch_stats(
        &self,
        id: &str,
        today: Date,
    ) -> Result<Option<BatchStats>, BatchesServiceError>;

    /// Retrieve the stored bottle behind a certificate, if one was recorded.
    async fn get_bottle(
        &self,
        batch: &str,
        label_type: LabelType,
        bottle_number: u16,
    ) -> Result<Option<BottleRecord>, BatchesServiceError>;

    /// Record a new production run.
    async fn create_batch(&self, batch: NewBatch) -> Result<BatchRecord, BatchesServiceError>;

    /// Move a batch forward through its lifecycle.
    async fn update_batch_status(
        &self,
        id: &str,
        status: BatchStatus,
    ) -> Result<BatchRecord, BatchesServiceError>;
}

#[cfg(test)]
mod tests {
    use jiff::{ToSpan, civil::date};
    use testresult::TestResult;

    use crate::test::{TestContext, helpers::insert_bottles};

    use super::*;

    fn new_batch(id: &str) -> NewBatch {
        NewBatch {
            id: id.to_string(),
            name: "Expedition Rum".to_string(),
            cask_type: Some("ex-bourbon".to_string()),
            distillation_date: None,
            bottling_date: None,
            bottle_count: Some(700),
            abv: None,
            status: BatchStatus::Ageing,
            tasting_notes: None,
            founder_notes: None,
        }
    }

    #[tokio::test]
    async fn create_batch_then_get_returns_it() -> TestResult {
        let ctx = TestContext::new().await;

        let created = ctx.batches.create_batch(new_batch("batch-001")).await?;
        let fetched = ctx.batches.get_batch("batch-001").await?;

        assert_eq!(fetched, Some(created));

        Ok(())
    }

    #[tokio::test]
    async fn get_batch_unknown_id_returns_none() -> TestResult {
        let ctx = TestContext::new().await;

        assert_eq!(ctx.batches.get_batch("batch-404").await?, None);

        Ok(())
    }

    #[tokio::test]
    async fn create_batch_duplicate_id_returns_already_exists() -> TestResult {
        let ctx = TestContext::new().await;

        ctx.batches.create_batch(new_batch("batch-001")).await?;

        let result = ctx.batches.create_batch(new_batch("batch-001")).await;

        assert!(
            matches!(result, Err(BatchesServiceError::AlreadyExists)),
            "expected AlreadyExists, got {result:?}"
        );

        Ok(())
    }

    #[tokio::test]
    async fn list_batches_returns_newest_first() -> TestResult {
        let ctx = TestContext::new().await;

        ctx.batches.create_batch(new_batch("batch-001")).await?;
        ctx.batches.create_batch(new_batch("batch-002")).await?;

        let ids: Vec<String> = ctx
            .batches
            .list_batches()
            .await?
            .into_iter()
            .map(|batch| batch.id)
            .collect();

        assert_eq!(ids, vec!["batch-002".to_string(), "batch-001".to_string()]);

        Ok(())
    }

    #[tokio::test]
    async fn stats_use_nominal_count_without_bottle_rows() -> TestResult {
        let ctx = TestContext::new().await;

        ctx.batches.create_batch(new_batch("batch-001")).await?;

        let stats = ctx
            .batches
            .get_batch_stats("batch-001", date(2026, 1, 1))
            .await?;

        assert_eq!(
            stats,
            Some(BatchStats {
                total_bottles: 700,
                available: 0,
                sold: 0,
                days_aged: 0,
            })
        );

        Ok(())
    }

    #[tokio::test]
    async fn stats_count_bottle_rows_by_status() -> TestResult {
        let ctx = TestContext::new().await;
        let today = date(2026, 10, 17);

        let mut batch = new_batch("batch-007");
        batch.distillation_date = Some(today - 30.days());

        ctx.batches.create_batch(batch).await?;

        insert_bottles(&ctx, "batch-007", LabelType::Standard, 1..=650, "available").await?;
        insert_bottles(&ctx, "batch-007", LabelType::Standard, 651..=700, "sold").await?;

        let stats = ctx.batches.get_batch_stats("batch-007", today).await?;

        assert_eq!(
            stats,
            Some(BatchStats {
                total_bottles: 700,
                available: 650,
                sold: 50,
                days_aged: 30,
            })
        );

        Ok(())
    }

    #[tokio::test]
    async fn stats_for_unknown_batch_are_none() -> TestResult {
        let ctx = TestContext::new().await;

        let stats = ctx
            .batches
            .get_batch_stats("batch-404", date(2026, 1, 1))
            .await?;

        assert_eq!(stats, None);

        Ok(())
    }

    #[tokio::test]
    async fn get_bottle_finds_recorded_bottle() -> TestResult {
        let ctx = TestContext::new().await;

        ctx.batches.create_batch(new_batch("batch-001")).await?;
        insert_bottles(&ctx, "batch-001", LabelType::Founder, 7..=7, "sold").await?;

        let bottle = ctx
            .batches
            .get_bottle("batch-001", LabelType::Founder, 7)
            .await?;

        assert!(bottle.is_some_and(|bottle| bottle.bottle_number == 7));

        let missing = ctx
            .batches
            .get_bottle("batch-001", LabelType::Standard, 7)
            .await?;

        assert!(missing.is_none());

        Ok(())
    }

    #[tokio::test]
    async fn status_moves_forward_but_not_back() -> TestResult {
        let ctx = TestContext::new().await;

        ctx.batches.create_batch(new_batch("batch-001")).await?;

        let updated = ctx
            .batches
            .update_batch_status("batch-001", BatchStatus::Released)
            .await?;

        assert_eq!(updated.status, BatchStatus::Released);

        let result = ctx
            .batches
            .update_batch_status("batch-001", BatchStatus::Bottled)
            .await;

        assert!(
            matches!(
                result,
                Err(BatchesServiceError::InvalidTransition {
                    from: BatchStatus::Released,
                    to: BatchStatus::Bottled,
                })
            ),
            "expected InvalidTransition, got {result:?}"
        );

        Ok(())
    }

    #[tokio::test]
    async fn status_update_for_unknown_batch_returns_not_found() {
        let ctx = TestContext::new().await;

        let result = ctx
            .batches
            .update_batch_status("batch-404", BatchStatus::Bottled)
            .await;

        assert!(
            matches!(result, Err(BatchesServiceError::NotFound)),
            "expected NotFound, got {result:?}"
        );
    }
}
