//! App Router

use salvo::Router;

use crate::{batches, healthcheck, observability::metrics_handler, referrals, webhooks};

pub(crate) fn app_router() -> Router {
    Router::new()
        .push(Router::with_path("healthcheck").get(healthcheck::handler))
        .push(Router::with_path("metrics").get(metrics_handler))
        .push(
            Router::with_path("api")
                .push(
                    Router::with_path("batches")
                        .get(batches::index::handler)
                        .push(Router::with_path("{batch}").get(batches::get::handler)),
                )
                .push(Router::with_path("referrals/generate").post(referrals::generate::handler))
                .push(Router::with_path("webhooks/shopify").post(webhooks::shopify::handler))
                .push(Router::with_path("recent-orders").get(webhooks::recent_orders::handler)),
        )
        .push(Router::with_path("batch/{batch}/{bottle}").get(batches::certificate::handler))
        .push(Router::with_path("refer/{code}").get(referrals::landing::handler))
}
