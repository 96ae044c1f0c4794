//! App Context

use std::sync::Arc;

use thiserror::Error;
use tracing::{info, warn};

use crate::{
    commerce::{CommerceAdmin, ShopifyAdminClient, ShopifyAdminConfig},
    database::{self, Db},
    domain::{
        batches::{BatchesService, PgBatchesService},
        referrals::{PgReferralsService, ReferralSettings, ReferralsService},
    },
    kv::{KvStore, KvStoreError, RedisKvStore},
    webhooks::{WebhookPipeline, WebhookSettings, WebhooksService},
};

#[derive(Debug, Error)]
pub enum AppInitError {
    #[error("failed to connect to database")]
    Database(#[source] sqlx::Error),

    #[error("failed to apply database migrations")]
    Migrate(#[source] sqlx::migrate::MigrateError),

    #[error("failed to connect to key-value store")]
    Cache(#[source] KvStoreError),
}

/// Everything needed to wire the services together.
#[derive(Debug, Clone)]
pub struct AppSettings {
    pub database_url: String,
    pub run_migrations: bool,
    pub redis_url: String,
    pub cache_namespace: String,

    /// `None` when no admin token is configured.
    pub commerce: Option<ShopifyAdminConfig>,
    pub referrals: ReferralSettings,
    pub webhooks: WebhookSettings,
}

#[derive(Clone)]
pub struct AppContext {
    pub batches: Arc<dyn BatchesService>,
    pub referrals: Arc<dyn ReferralsService>,
    pub webhooks: Arc<dyn WebhooksService>,
}

impl AppContext {
    /// Connect to the stores and build every service.
    ///
    /// # Errors
    ///
    /// Returns an error when the database or key-value store is unreachable,
    /// or when migrations fail.
    pub async fn from_settings(settings: AppSettings) -> Result<Self, AppInitError> {
        let pool = database::connect(&settings.database_url)
            .await
            .map_err(AppInitError::Database)?;

        if settings.run_migrations {
            database::migrate(&pool)
                .await
                .map_err(AppInitError::Migrate)?;

            info!("database migrations applied");
        }

        let kv: Arc<dyn KvStore> = Arc::new(
            RedisKvStore::connect(&settings.redis_url, &settings.cache_namespace)
                .await
                .map_err(AppInitError::Cache)?,
        );

        let commerce: Option<Arc<dyn CommerceAdmin>> = match settings.commerce {
            Some(config) => Some(Arc::new(ShopifyAdminClient::new(config))),
            None => {
                warn!("commerce admin token not configured; referral issuance disabled");
                None
            }
        };

        let db = Db::new(pool);

        let referrals: Arc<dyn ReferralsService> = Arc::new(PgReferralsService::new(
            db.clone(),
            commerce.clone(),
            Arc::clone(&kv),
            settings.referrals,
        ));

        let webhooks = Arc::new(WebhookPipeline::new(
            Arc::clone(&referrals),
            commerce,
            kv,
            settings.webhooks,
        ));

        Ok(Self {
            batches: Arc::new(PgBatchesService::new(db)),
            referrals,
            webhooks,
        })
    }
}
