//! Jerry Can JSON API Server

use std::{process, sync::Arc};

use salvo::{
    affix_state::inject,
    oapi::{OpenApi, swagger_ui::SwaggerUi},
    prelude::*,
    trailing_slash::remove_slash,
};
use tracing::{error, info};

use jerrycan_app::{
    context::{AppContext, AppSettings},
    domain::referrals::ReferralSettings,
    webhooks::WebhookSettings,
};

use crate::{
    config::ServerConfig, observability::Observability, rate_limit::RateLimiter, state::State,
};

#[cfg(not(target_env = "msvc"))]
use tikv_jemallocator::Jemalloc;

#[cfg(not(target_env = "msvc"))]
#[global_allocator]
static GLOBAL: Jemalloc = Jemalloc;

mod batches;
mod config;
mod extensions;
mod healthcheck;
mod observability;
mod rate_limit;
mod referrals;
mod router;
mod shutdown;
mod state;
#[cfg(test)]
mod test_helpers;
mod webhooks;

fn app_settings(config: &ServerConfig) -> AppSettings {
    AppSettings {
        database_url: config.database.database_url.clone(),
        run_migrations: config.database.run_migrations,
        redis_url: config.cache.redis_url.clone(),
        cache_namespace: config.cache.cache_namespace.clone(),
        commerce: config.commerce.admin(),
        referrals: ReferralSettings {
            site_url: config.site.site_url.clone(),
            referee_discount: config.commerce.referee_discount,
        },
        webhooks: WebhookSettings {
            brand_match: config.site.brand_match.clone(),
            reward_amount: config.commerce.reward_amount,
        },
    }
}

/// Jerry Can JSON API Server entry point
#[tokio::main]
pub async fn main() {
    // Load configuration from .env and CLI arguments
    let config = ServerConfig::load().unwrap_or_else(|e| {
        #[expect(
            clippy::print_stderr,
            reason = "logging not initialized yet, must use eprintln for config errors"
        )]
        {
            eprintln!("Configuration error: {e}");
        }

        #[expect(clippy::exit, reason = "no server to shut down yet")]
        process::exit(1);
    });

    let observability = Observability::init(&config).unwrap_or_else(|e| {
        #[expect(
            clippy::print_stderr,
            reason = "the subscriber failed to install, so there is nowhere else to report"
        )]
        {
            eprintln!("Observability error: {e}");
        }

        #[expect(clippy::exit, reason = "no server to shut down yet")]
        process::exit(1);
    });

    let addr = config.socket_addr();

    info!("Starting server on {addr}");

    let app = match AppContext::from_settings(app_settings(&config)).await {
        Ok(app) => app,
        Err(init_error) => {
            error!("failed to initialize app context: {init_error}");

            observability.shutdown();

            #[expect(clippy::exit, reason = "startup failed before serving")]
            process::exit(1);
        }
    };

    let state = State::new(
        app,
        config.commerce.webhook_secret(),
        RateLimiter::new(
            config.rate_limit.window(),
            config.rate_limit.rate_limit_max_requests,
        ),
    )
    .with_webhook_body_limit(config.commerce.webhook_max_body_bytes);

    // Bind server
    let listener = TcpListener::new(addr).bind().await;

    let router = Router::new()
        .hoop(CatchPanic::new())
        .hoop(observability::request_logging)
        .hoop(inject(Arc::new(state)))
        .push(router::app_router());

    let doc = OpenApi::new("Jerry Can API", env!("CARGO_PKG_VERSION")).merge_router(&router);

    let router = router
        .push(doc.into_router("/api-doc/openapi.json"))
        .push(SwaggerUi::new("/api-doc/openapi.json").into_router("docs"));

    let server = Server::new(listener);

    let handle = server.handle();
    let grace = config.server.shutdown_grace();

    // Listen for shutdown signal
    tokio::spawn(async move {
        if let Err(error) = shutdown::listen(handle, grace).await {
            error!("failed to listen for shutdown signal: {error}");
        }
    });

    // Start serving requests
    server
        .serve(Service::new(router).hoop(remove_slash()))
        .await;

    observability.shutdown();
}
