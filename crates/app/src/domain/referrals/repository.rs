//! Referrals Repository

use jiff_sqlx::Timestamp as SqlxTimestamp;
use sqlx::{FromRow, Postgres, Row, Transaction, postgres::PgRow, query_as, query_scalar};

use crate::domain::referrals::{
    data::{NewConversion, NewReferral},
    records::{ConversionRecord, ConversionStatus, ConversionUuid, ReferralRecord, ReferralUuid},
};

const FIND_REFERRAL_BY_EMAIL_SQL: &str = include_str!("sql/find_referral_by_email.sql");
const FIND_REFERRAL_BY_CODE_SQL: &str = include_str!("sql/find_referral_by_code.sql");
const CREATE_REFERRAL_SQL: &str = include_str!("sql/create_referral.sql");
const CREATE_CONVERSION_SQL: &str = include_str!("sql/create_conversion.sql");
const INCREMENT_REFERRAL_COUNTERS_SQL: &str = include_str!("sql/increment_referral_counters.sql");
const CONVERSION_EXISTS_SQL: &str = include_str!("sql/conversion_exists.sql");
const LIST_CONVERSIONS_SQL: &str = include_str!("sql/list_conversions.sql");

#[derive(Debug, Clone, Default)]
pub(crate) struct PgReferralsRepository;

impl PgReferralsRepository {
    #[must_use]
    pub(crate) fn new() -> Self {
        Self
    }

    pub(crate) async fn find_by_email(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        email: &str,
    ) -> Result<Option<ReferralRecord>, sqlx::Error> {
        query_as::<Postgres, ReferralRecord>(FIND_REFERRAL_BY_EMAIL_SQL)
            .bind(email)
            .fetch_optional(&mut **tx)
            .await
    }

    pub(crate) async fn find_by_code(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        code: &str,
    ) -> Result<Option<ReferralRecord>, sqlx::Error> {
        query_as::<Postgres, ReferralRecord>(FIND_REFERRAL_BY_CODE_SQL)
            .bind(code)
            .fetch_optional(&mut **tx)
            .await
    }

    pub(crate) async fn create_referral(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        referral: NewReferral,
    ) -> Result<ReferralRecord, sqlx::Error> {
        query_as::<Postgres, ReferralRecord>(CREATE_REFERRAL_SQL)
            .bind(referral.uuid.into_uuid())
            .bind(referral.referrer_email)
            .bind(referral.referrer_code)
            .fetch_one(&mut **tx)
            .await
    }

    pub(crate) async fn create_conversion(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        referral: ReferralUuid,
        conversion: NewConversion,
    ) -> Result<ConversionRecord, sqlx::Error> {
        query_as::<Postgres, ConversionRecord>(CREATE_CONVERSION_SQL)
            .bind(conversion.uuid.into_uuid())
            .bind(referral.into_uuid())
            .bind(conversion.referee_email)
            .bind(conversion.order_id)
            .bind(conversion.reward_code)
            .fetch_one(&mut **tx)
            .await
    }

    pub(crate) async fn increment_counters(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        referral: ReferralUuid,
    ) -> Result<ReferralRecord, sqlx::Error> {
        query_as::<Postgres, ReferralRecord>(INCREMENT_REFERRAL_COUNTERS_SQL)
            .bind(referral.into_uuid())
            .fetch_one(&mut **tx)
            .await
    }

    pub(crate) async fn conversion_exists(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        order_id: &str,
    ) -> Result<bool, sqlx::Error> {
        query_scalar(CONVERSION_EXISTS_SQL)
            .bind(order_id)
            .fetch_one(&mut **tx)
            .await
    }

    pub(crate) async fn list_conversions(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        referral: ReferralUuid,
    ) -> Result<Vec<ConversionRecord>, sqlx::Error> {
        query_as::<Postgres, ConversionRecord>(LIST_CONVERSIONS_SQL)
            .bind(referral.into_uuid())
            .fetch_all(&mut **tx)
            .await
    }
}

fn try_get_counter(row: &PgRow, column: &str) -> sqlx::Result<u32> {
    let value: i32 = row.try_get(column)?;

    u32::try_from(value).map_err(|e| sqlx::Error::ColumnDecode {
        index: column.to_string(),
        source: Box::new(e),
    })
}

impl<'r> FromRow<'r, PgRow> for ReferralRecord {
    fn from_row(row: &'r PgRow) -> sqlx::Result<Self> {
        Ok(Self {
            uuid: ReferralUuid::from_uuid(row.try_get("uuid")?),
            referrer_email: row.try_get("referrer_email")?,
            referrer_code: row.try_get("referrer_code")?,
            total_referrals: try_get_counter(row, "total_referrals")?,
            total_rewards_earned: try_get_counter(row, "total_rewards_earned")?,
            created_at: row.try_get::<SqlxTimestamp, _>("created_at")?.to_jiff(),
        })
    }
}

impl<'r> FromRow<'r, PgRow> for ConversionRecord {
    fn from_row(row: &'r PgRow) -> sqlx::Result<Self> {
        let status = row
            .try_get::<String, _>("status")?
            .parse::<ConversionStatus>()
            .map_err(|e| sqlx::Error::ColumnDecode {
                index: "status".to_string(),
                source: Box::new(e),
            })?;

        Ok(Self {
            uuid: ConversionUuid::from_uuid(row.try_get("uuid")?),
            referral_uuid: ReferralUuid::from_uuid(row.try_get("referral_uuid")?),
            referee_email: row.try_get("referee_email")?,
            order_id: row.try_get("order_id")?,
            reward_code: row.try_get("reward_code")?,
            status,
            created_at: row.try_get::<SqlxTimestamp, _>("created_at")?.to_jiff(),
        })
    }
}
