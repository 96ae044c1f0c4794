//! Test helpers.

use std::{sync::Arc, time::Duration};

use jiff::{Timestamp, civil::date};
use rust_decimal::Decimal;
use salvo::{affix_state::inject, prelude::*};

use jerrycan_app::{
    context::AppContext,
    domain::{
        batches::{
            MockBatchesService,
            records::{BatchRecord, BatchStatus},
        },
        referrals::MockReferralsService,
    },
    secret::Secret,
    webhooks::MockWebhooksService,
};

use crate::{rate_limit::RateLimiter, state::State};

pub(crate) const TEST_WEBHOOK_SECRET: &str = "whsec_test";

/// Mocks for every service; anything not configured by a test must not be called.
#[derive(Default)]
pub(crate) struct Mocks {
    pub(crate) batches: MockBatchesService,
    pub(crate) referrals: MockReferralsService,
    pub(crate) webhooks: MockWebhooksService,
}

impl Mocks {
    pub(crate) fn into_app(self) -> AppContext {
        AppContext {
            batches: Arc::new(self.batches),
            referrals: Arc::new(self.referrals),
            webhooks: Arc::new(self.webhooks),
        }
    }
}

pub(crate) fn state(mocks: Mocks) -> State {
    State::new(
        mocks.into_app(),
        Some(Secret::new(TEST_WEBHOOK_SECRET)),
        RateLimiter::new(Duration::from_secs(60), 100),
    )
}

pub(crate) fn service_with_state(state: State, route: Router) -> Service {
    Service::new(Router::new().hoop(inject(Arc::new(state))).push(route))
}

pub(crate) fn service(mocks: Mocks, route: Router) -> Service {
    service_with_state(state(mocks), route)
}

pub(crate) fn make_batch(id: &str) -> BatchRecord {
    BatchRecord {
        id: id.to_string(),
        name: "Expedition Spiced Rum".to_string(),
        cask_type: Some("ex-bourbon".to_string()),
        distillation_date: Some(date(2026, 9, 17)),
        bottling_date: None,
        bottle_count: Some(700),
        abv: Some(Decimal::new(405, 1)),
        status: BatchStatus::Ageing,
        tasting_notes: Some("Vanilla, clove, orange peel".to_string()),
        founder_notes: None,
        created_at: Timestamp::UNIX_EPOCH,
    }
}
