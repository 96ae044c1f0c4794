//! Test Helpers

use std::ops::RangeInclusive;

use sqlx::query;
use uuid::Uuid;

use crate::{
    domain::{
        batches::identity::LabelType,
        referrals::{ReferralsServiceError, records::ReferralRecord},
    },
    test::TestContext,
};

/// Insert one bottle row per number in `numbers`.
pub(crate) async fn insert_bottles(
    ctx: &TestContext,
    batch: &str,
    label_type: LabelType,
    numbers: RangeInclusive<u16>,
    status: &str,
) -> Result<(), sqlx::Error> {
    let mut tx = ctx.db.pool().begin().await?;

    for number in numbers {
        query(
            "INSERT INTO bottles (uuid, batch_id, bottle_number, label_type, status) \
             VALUES ($1, $2, $3, $4, $5)",
        )
        .bind(Uuid::now_v7())
        .bind(batch)
        .bind(i32::from(number))
        .bind(label_type.as_str())
        .bind(status)
        .execute(&mut *tx)
        .await?;
    }

    tx.commit().await
}

/// Insert a referral row directly, bypassing discount creation.
pub(crate) async fn insert_referral(
    ctx: &TestContext,
    email: &str,
    code: &str,
) -> Result<ReferralRecord, ReferralsServiceError> {
    let uuid = Uuid::now_v7();

    query("INSERT INTO referrals (uuid, referrer_email, referrer_code) VALUES ($1, $2, $3)")
        .bind(uuid)
        .bind(email)
        .bind(code)
        .execute(ctx.db.pool())
        .await?;

    let record = sqlx::query_as::<_, ReferralRecord>(
        "SELECT uuid, referrer_email, referrer_code, total_referrals, \
         total_rewards_earned, created_at FROM referrals WHERE uuid = $1",
    )
    .bind(uuid)
    .fetch_one(ctx.db.pool())
    .await?;

    Ok(record)
}
