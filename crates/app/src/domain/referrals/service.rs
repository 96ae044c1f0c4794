//! Referrals service.

use std::sync::Arc;

use async_trait::async_trait;
use jiff::Timestamp;
use mockall::automock;
use rust_decimal::Decimal;
use tracing::{debug, info, warn};

use crate::{
    commerce::{CommerceAdmin, generate_referral_code},
    database::Db,
    domain::referrals::{
        data::{NewConversion, NewReferral},
        email::normalize_email,
        errors::ReferralsServiceError,
        records::{
            CachedReferral, ConversionRecord, IssuedReferral, ReferralRecord, ReferralUuid,
            share_url,
        },
        repository::PgReferralsRepository,
    },
    kv::{self, KvStore, keys},
};

/// Issuance settings.
#[derive(Debug, Clone, PartialEq)]
pub struct ReferralSettings {
    /// Public site origin used to build share URLs.
    pub site_url: String,

    /// Fixed amount taken off a referee's order.
    pub referee_discount: Decimal,
}

#[derive(Clone)]
pub struct PgReferralsService {
    db: Db,
    repository: PgReferralsRepository,
    commerce: Option<Arc<dyn CommerceAdmin>>,
    kv: Arc<dyn KvStore>,
    settings: ReferralSettings,
}

impl std::fmt::Debug for PgReferralsService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PgReferralsService")
            .field("commerce_configured", &self.commerce.is_some())
            .field("settings", &self.settings)
            .finish_non_exhaustive()
    }
}

impl PgReferralsService {
    #[must_use]
    pub fn new(
        db: Db,
        commerce: Option<Arc<dyn CommerceAdmin>>,
        kv: Arc<dyn KvStore>,
        settings: ReferralSettings,
    ) -> Self {
        Self {
            db,
            repository: PgReferralsRepository::new(),
            commerce,
            kv,
            settings,
        }
    }

    async fn find_by_email(
        &self,
        email: &str,
    ) -> Result<Option<ReferralRecord>, ReferralsServiceError> {
        let mut tx = self.db.begin().await?;

        let referral = self.repository.find_by_email(&mut tx, email).await?;

        tx.commit().await?;

        Ok(referral)
    }

    /// Point `referral:{code}` at the record. Failures are logged only.
    async fn cache(&self, record: &ReferralRecord) {
        if let Err(error) = kv::put_json(
            self.kv.as_ref(),
            &keys::referral(&record.referrer_code),
            &CachedReferral::from(record),
            Some(keys::REFERRAL_TTL),
        )
        .await
        {
            warn!(code = %record.referrer_code, %error, "failed to cache referral");
        }
    }

    fn issued(&self, record: &ReferralRecord, existing: bool) -> IssuedReferral {
        IssuedReferral {
            code: record.referrer_code.clone(),
            share_url: share_url(&self.settings.site_url, &record.referrer_code),
            existing,
        }
    }
}

#[async_trait]
impl ReferralsService for PgReferralsService {
    async fn issue_referral(&self, email: &str) -> Result<IssuedReferral, ReferralsServiceError> {
        let email = normalize_email(email).ok_or(ReferralsServiceError::InvalidEmail)?;

        if let Some(existing) = self.find_by_email(&email).await? {
            debug!(code = %existing.referrer_code, "returning existing referral code");

            self.cache(&existing).await;

            return Ok(self.issued(&existing, true));
        }

        let commerce = self
            .commerce
            .as_ref()
            .ok_or(ReferralsServiceError::CommerceNotConfigured)?;

        let code = generate_referral_code(&email, Timestamp::now());

        let discount = commerce
            .create_discount_code(&code, self.settings.referee_discount)
            .await?;

        let mut tx = self.db.begin().await?;

        let created = self
            .repository
            .create_referral(
                &mut tx,
                NewReferral {
                    uuid: ReferralUuid::new(),
                    referrer_email: email.clone(),
                    referrer_code: discount.code.clone(),
                },
            )
            .await
            .map_err(ReferralsServiceError::from);

        let record = match created {
            Ok(record) => {
                tx.commit().await?;
                record
            }
            Err(ReferralsServiceError::AlreadyExists) => {
                drop(tx);

                let winner = self
                    .find_by_email(&email)
                    .await?
                    .ok_or(ReferralsServiceError::AlreadyExists)?;

                warn!(
                    code = %winner.referrer_code,
                    orphaned_code = %discount.code,
                    price_rule_id = discount.price_rule_id,
                    "concurrent issuance for the same email, discount left orphaned"
                );

                return Ok(self.issued(&winner, true));
            }
            Err(error) => {
                warn!(
                    orphaned_code = %discount.code,
                    price_rule_id = discount.price_rule_id,
                    "failed to store referral after creating its discount"
                );

                return Err(error);
            }
        };

        self.cache(&record).await;

        info!(code = %record.referrer_code, "issued referral code");

        Ok(self.issued(&record, false))
    }

    async fn find_referral_by_code(
        &self,
        code: &str,
    ) -> Result<Option<ReferralRecord>, ReferralsServiceError> {
        let mut tx = self.db.begin().await?;

        let referral = self.repository.find_by_code(&mut tx, code).await?;

        tx.commit().await?;

        Ok(referral)
    }

    async fn lookup_cached_referral(
        &self,
        code: &str,
    ) -> Result<Option<CachedReferral>, ReferralsServiceError> {
        Ok(kv::get_json(self.kv.as_ref(), &keys::referral(code)).await?)
    }

    async fn record_conversion(
        &self,
        referral: ReferralUuid,
        conversion: NewConversion,
    ) -> Result<ConversionRecord, ReferralsServiceError> {
        let mut tx = self.db.begin().await?;

        let recorded = self
            .repository
            .create_conversion(&mut tx, referral, conversion)
            .await?;

        self.repository.increment_counters(&mut tx, referral).await?;

        tx.commit().await?;

        Ok(recorded)
    }

    async fn conversion_exists(&self, order_id: &str) -> Result<bool, ReferralsServiceError> {
        let mut tx = self.db.begin().await?;

        let exists = self.repository.conversion_exists(&mut tx, order_id).await?;

        tx.commit().await?;

        Ok(exists)
    }

    async fn list_conversions(
        &self,
        referral: ReferralUuid,
    ) -> Result<Vec<ConversionRecord>, ReferralsServiceError> {
        let mut tx = self.db.begin().await?;

        let conversions = self.repository.list_conversions(&mut tx, referral).await?;

        tx.commit().await?;

        Ok(conversions)
    }
}

#[automock]
#[async_trait]
pub trait ReferralsService: Send + Sync {
    /// Return the email's referral code, minting one on first request.
    ///
    /// The discount is created upstream before the row is stored; a failed
    /// upstream call leaves no local state behind.
    async fn issue_referral(&self, email: &str) -> Result<IssuedReferral, ReferralsServiceError>;

    async fn find_referral_by_code(
        &self,
        code: &str,
    ) -> Result<Option<ReferralRecord>, ReferralsServiceError>;

    /// Cache-only lookup backing the landing page.
    async fn lookup_cached_referral(
        &self,
        code: &str,
    ) -> Result<Option<CachedReferral>, ReferralsServiceError>;

    /// Store a conversion and bump both of the referrer's counters atomically.
    async fn record_conversion(
        &self,
        referral: ReferralUuid,
        conversion: NewConversion,
    ) -> Result<ConversionRecord, ReferralsServiceError>;

    async fn conversion_exists(&self, order_id: &str) -> Result<bool, ReferralsServiceError>;

    async fn list_conversions(
        &self,
        referral: ReferralUuid,
    ) -> Result<Vec<ConversionRecord>, ReferralsServiceError>;
}

#[cfg(test)]
mod tests {
    use testresult::TestResult;

    use crate::{
        commerce::{CommerceAdminError, DiscountCode, MockCommerceAdmin},
        domain::referrals::records::ConversionUuid,
        kv::{KvStoreError, MockKvStore},
        test::TestContext,
    };

    use super::*;

    fn settings() -> ReferralSettings {
        ReferralSettings {
            site_url: "https://jerrycanspirits.co.uk".to_string(),
            referee_discount: Decimal::from(10),
        }
    }

    fn echo_discount(code: &str) -> DiscountCode {
        DiscountCode {
            price_rule_id: 1,
            discount_code_id: 2,
            code: code.to_string(),
        }
    }

    fn service(
        ctx: &TestContext,
        commerce: Option<MockCommerceAdmin>,
        kv: MockKvStore,
    ) -> PgReferralsService {
        PgReferralsService::new(
            ctx.app_db(),
            commerce.map(|commerce| Arc::new(commerce) as Arc<dyn CommerceAdmin>),
            Arc::new(kv),
            settings(),
        )
    }

    #[tokio::test]
    async fn invalid_email_is_rejected_before_any_call() {
        let ctx = TestContext::new().await;

        let mut commerce = MockCommerceAdmin::new();
        commerce.expect_create_discount_code().never();

        let mut kv = MockKvStore::new();
        kv.expect_put().never();

        let result = service(&ctx, Some(commerce), kv)
            .issue_referral("not-an-email")
            .await;

        assert!(
            matches!(result, Err(ReferralsServiceError::InvalidEmail)),
            "expected InvalidEmail, got {result:?}"
        );
    }

    #[tokio::test]
    async fn first_issuance_creates_discount_row_and_cache_entry() -> TestResult {
        let ctx = TestContext::new().await;

        let mut commerce = MockCommerceAdmin::new();
        commerce
            .expect_create_discount_code()
            .once()
            .withf(|code, amount| code.starts_with("JCS-JANEXX-") && *amount == Decimal::from(10))
            .returning(|code, _| Ok(echo_discount(code)));

        let mut kv = MockKvStore::new();
        kv.expect_put()
            .once()
            .withf(|key, value, ttl| {
                key.starts_with("referral:JCS-JANEXX-")
                    && value.contains(r#""email":"jane@example.com""#)
                    && *ttl == Some(keys::REFERRAL_TTL)
            })
            .return_once(|_, _, _| Ok(()));

        let referrals = service(&ctx, Some(commerce), kv);

        let issued = referrals.issue_referral("jane@example.com").await?;

        assert!(!issued.existing);
        assert_eq!(
            issued.share_url,
            format!("https://jerrycanspirits.co.uk/refer/{}/", issued.code)
        );

        let stored = referrals.find_referral_by_code(&issued.code).await?;

        assert!(stored.is_some_and(|record| record.referrer_email == "jane@example.com"));

        Ok(())
    }

    #[tokio::test]
    async fn repeat_issuance_returns_same_code_without_new_discount() -> TestResult {
        let ctx = TestContext::new().await;

        let mut commerce = MockCommerceAdmin::new();
        commerce
            .expect_create_discount_code()
            .once()
            .returning(|code, _| Ok(echo_discount(code)));

        let mut kv = MockKvStore::new();
        kv.expect_put()
            .times(2)
            .withf(|key, _, ttl| {
                key.starts_with("referral:JCS-JANEXX-") && *ttl == Some(keys::REFERRAL_TTL)
            })
            .returning(|_, _, _| Ok(()));

        let referrals = service(&ctx, Some(commerce), kv);

        let first = referrals.issue_referral("jane@example.com").await?;
        let second = referrals.issue_referral("  JANE@Example.com ").await?;

        assert_eq!(first.code, second.code);
        assert!(second.existing);

        Ok(())
    }

    #[tokio::test]
    async fn repeat_issuance_repairs_a_failed_cache_write() -> TestResult {
        let ctx = TestContext::new().await;

        let mut commerce = MockCommerceAdmin::new();
        commerce
            .expect_create_discount_code()
            .once()
            .returning(|code, _| Ok(echo_discount(code)));

        let mut kv = MockKvStore::new();
        let mut sequence = mockall::Sequence::new();

        kv.expect_put()
            .once()
            .in_sequence(&mut sequence)
            .return_once(|_, _, _| {
                Err(KvStoreError::Backend(redis::RedisError::from((
                    redis::ErrorKind::IoError,
                    "connection refused",
                ))))
            });
        kv.expect_put()
            .once()
            .in_sequence(&mut sequence)
            .withf(|key, value, _| {
                key.starts_with("referral:JCS-JANEXX-")
                    && value.contains(r#""email":"jane@example.com""#)
            })
            .return_once(|_, _, _| Ok(()));

        let referrals = service(&ctx, Some(commerce), kv);

        let first = referrals.issue_referral("jane@example.com").await?;
        let second = referrals.issue_referral("jane@example.com").await?;

        assert!(!first.existing);
        assert!(second.existing);
        assert_eq!(first.code, second.code);

        Ok(())
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn concurrent_issuance_returns_the_stored_winner() -> TestResult {
        let ctx = TestContext::new().await;
        let pool = ctx.db.pool().clone();

        let mut commerce = MockCommerceAdmin::new();
        commerce
            .expect_create_discount_code()
            .once()
            .return_once(move |code, _| {
                let winner = sqlx::query(
                    "INSERT INTO referrals (uuid, referrer_email, referrer_code) \
                     VALUES ($1, $2, $3)",
                )
                .bind(uuid::Uuid::now_v7())
                .bind("jane@example.com")
                .bind("JCS-JANEXX-WINNER");

                tokio::task::block_in_place(|| {
                    tokio::runtime::Handle::current().block_on(winner.execute(&pool))
                })
                .map_err(|error| CommerceAdminError::UnexpectedResponse {
                    operation: "insert concurrent referral",
                    status: 0,
                    body: error.to_string(),
                })?;

                Ok(echo_discount(code))
            });

        let mut kv = MockKvStore::new();
        kv.expect_put().never();

        let issued = service(&ctx, Some(commerce), kv)
            .issue_referral("jane@example.com")
            .await?;

        assert_eq!(issued.code, "JCS-JANEXX-WINNER");
        assert!(issued.existing);

        let rows: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM referrals")
            .fetch_one(ctx.db.pool())
            .await?;

        assert_eq!(rows, 1);

        Ok(())
    }

    #[tokio::test]
    async fn missing_commerce_client_reports_not_configured() {
        let ctx = TestContext::new().await;

        let result = service(&ctx, None, MockKvStore::new())
            .issue_referral("jane@example.com")
            .await;

        assert!(
            matches!(result, Err(ReferralsServiceError::CommerceNotConfigured)),
            "expected CommerceNotConfigured, got {result:?}"
        );
    }

    #[tokio::test]
    async fn failed_discount_creation_leaves_no_row() -> TestResult {
        let ctx = TestContext::new().await;

        let mut commerce = MockCommerceAdmin::new();
        commerce.expect_create_discount_code().once().returning(|_, _| {
            Err(CommerceAdminError::UnexpectedResponse {
                operation: "create price rule",
                status: 422,
                body: "{}".to_string(),
            })
        });

        let mut kv = MockKvStore::new();
        kv.expect_put().never();

        let referrals = service(&ctx, Some(commerce), kv);

        let result = referrals.issue_referral("jane@example.com").await;

        assert!(
            matches!(result, Err(ReferralsServiceError::Commerce(_))),
            "expected Commerce, got {result:?}"
        );

        let rows: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM referrals")
            .fetch_one(ctx.db.pool())
            .await?;

        assert_eq!(rows, 0);

        Ok(())
    }

    #[tokio::test]
    async fn cache_failure_after_insert_still_succeeds() -> TestResult {
        let ctx = TestContext::new().await;

        let mut commerce = MockCommerceAdmin::new();
        commerce
            .expect_create_discount_code()
            .once()
            .returning(|code, _| Ok(echo_discount(code)));

        let mut kv = MockKvStore::new();
        kv.expect_put().once().return_once(|_, _, _| {
            Err(KvStoreError::Backend(redis::RedisError::from((
                redis::ErrorKind::IoError,
                "connection refused",
            ))))
        });

        let issued = service(&ctx, Some(commerce), kv)
            .issue_referral("jane@example.com")
            .await?;

        assert!(!issued.existing);

        Ok(())
    }

    #[tokio::test]
    async fn cached_lookup_reads_pointer() -> TestResult {
        let ctx = TestContext::new().await;

        let mut kv = MockKvStore::new();
        kv.expect_get()
            .once()
            .withf(|key| key == "referral:JCS-JANEXX-000001")
            .return_once(|_| {
                Ok(Some(
                    r#"{"email":"jane@example.com","code":"JCS-JANEXX-000001","created_at":"2026-01-01T00:00:00Z"}"#
                        .to_string(),
                ))
            });

        let cached = service(&ctx, None, kv)
            .lookup_cached_referral("JCS-JANEXX-000001")
            .await?;

        assert_eq!(
            cached.map(|cached| cached.email),
            Some("jane@example.com".to_string())
        );

        Ok(())
    }

    #[tokio::test]
    async fn record_conversion_increments_both_counters() -> TestResult {
        let ctx = TestContext::new().await;

        let mut commerce = MockCommerceAdmin::new();
        commerce
            .expect_create_discount_code()
            .once()
            .returning(|code, _| Ok(echo_discount(code)));

        let mut kv = MockKvStore::new();
        kv.expect_put().once().return_once(|_, _, _| Ok(()));

        let referrals = service(&ctx, Some(commerce), kv);

        let issued = referrals.issue_referral("jane@example.com").await?;
        let referral = referrals
            .find_referral_by_code(&issued.code)
            .await?
            .ok_or("referral missing")?;

        assert!(!referrals.conversion_exists("1001").await?);

        let conversion = referrals
            .record_conversion(
                referral.uuid,
                NewConversion {
                    uuid: ConversionUuid::new(),
                    referee_email: Some("sam@example.com".to_string()),
                    order_id: "1001".to_string(),
                    reward_code: "JCSR-JANEXX-000001".to_string(),
                },
            )
            .await?;

        assert_eq!(conversion.referral_uuid, referral.uuid);
        assert!(referrals.conversion_exists("1001").await?);

        let updated = referrals
            .find_referral_by_code(&issued.code)
            .await?
            .ok_or("referral missing")?;

        assert_eq!(updated.total_referrals, 1);
        assert_eq!(updated.total_rewards_earned, 1);
        assert_eq!(referrals.list_conversions(referral.uuid).await?.len(), 1);

        Ok(())
    }

    #[tokio::test]
    async fn duplicate_order_conversion_is_refused() -> TestResult {
        let ctx = TestContext::new().await;

        let mut commerce = MockCommerceAdmin::new();
        commerce
            .expect_create_discount_code()
            .once()
            .returning(|code, _| Ok(echo_discount(code)));

        let mut kv = MockKvStore::new();
        kv.expect_put().once().return_once(|_, _, _| Ok(()));

        let referrals = service(&ctx, Some(commerce), kv);

        let issued = referrals.issue_referral("jane@example.com").await?;
        let referral = referrals
            .find_referral_by_code(&issued.code)
            .await?
            .ok_or("referral missing")?;

        let conversion = |reward: &str| NewConversion {
            uuid: ConversionUuid::new(),
            referee_email: None,
            order_id: "1001".to_string(),
            reward_code: reward.to_string(),
        };

        referrals
            .record_conversion(referral.uuid, conversion("JCSR-A"))
            .await?;

        let result = referrals
            .record_conversion(referral.uuid, conversion("JCSR-B"))
            .await;

        assert!(
            matches!(result, Err(ReferralsServiceError::AlreadyExists)),
            "expected AlreadyExists, got {result:?}"
        );

        let updated = referrals
            .find_referral_by_code(&issued.code)
            .await?
            .ok_or("referral missing")?;

        assert_eq!(updated.total_referrals, 1);

        Ok(())
    }
}
