//! Prometheus metrics: HTTP traffic plus webhook and referral counters.

use std::sync::OnceLock;

use prometheus::{
    Encoder, HistogramOpts, HistogramVec, IntCounterVec, IntGauge, Opts, Registry, TextEncoder,
    core::Collector,
};
use salvo::{
    Request, Response, handler,
    http::{
        StatusCode,
        header::{CONTENT_TYPE, HeaderValue},
    },
};
use tracing::error;

use jerrycan_app::webhooks::WebhookTopic;

#[derive(Debug)]
struct Metrics {
    registry: Registry,
    requests_total: IntCounterVec,
    request_duration_seconds: HistogramVec,
    requests_in_flight: IntGauge,
    webhooks_total: IntCounterVec,
    referral_issuances_total: IntCounterVec,
}

static METRICS: OnceLock<Option<Metrics>> = OnceLock::new();

/// How a verified webhook delivery ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum WebhookResult<'a> {
    Rejected,
    Processed(&'a str),
    Failed,
}

impl WebhookResult<'_> {
    fn label(&self) -> &str {
        match self {
            Self::Rejected => "rejected",
            Self::Processed(outcome) => *outcome,
            Self::Failed => "failed",
        }
    }
}

#[derive(Debug)]
pub(super) struct InFlightRequestGuard {
    tracked: bool,
}

impl InFlightRequestGuard {
    pub(super) fn track() -> Self {
        if let Some(metrics) = metrics() {
            metrics.requests_in_flight.inc();
            return Self { tracked: true };
        }

        Self { tracked: false }
    }
}

impl Drop for InFlightRequestGuard {
    fn drop(&mut self) {
        if self.tracked
            && let Some(metrics) = metrics()
        {
            metrics.requests_in_flight.dec();
        }
    }
}

pub(super) fn observe_request(method: &str, route: &str, status_code: u16, duration_seconds: f64) {
    let Some(metrics) = metrics() else {
        return;
    };

    let status_class = status_class(status_code);
    let status_code = status_code.to_string();

    metrics
        .requests_total
        .with_label_values(&[method, route, status_class, status_code.as_str()])
        .inc();

    metrics
        .request_duration_seconds
        .with_label_values(&[method, route])
        .observe(duration_seconds);
}

/// Count one webhook delivery by topic and result.
pub(crate) fn observe_webhook(topic: &str, result: WebhookResult<'_>) {
    if let Some(metrics) = metrics() {
        metrics
            .webhooks_total
            .with_label_values(&[WebhookTopic::from(topic).label(), result.label()])
            .inc();
    }
}

/// Count one successful referral issuance.
pub(crate) fn observe_referral_issuance(existing: bool) {
    if let Some(metrics) = metrics() {
        let kind = if existing { "existing" } else { "new" };

        metrics.referral_issuances_total.with_label_values(&[kind]).inc();
    }
}

#[handler]
pub(crate) async fn metrics_handler(_req: &mut Request, res: &mut Response) {
    let Some(metrics) = metrics() else {
        res.status_code(StatusCode::INTERNAL_SERVER_ERROR);
        return;
    };

    let encoder = TextEncoder::new();
    let metric_families = metrics.registry.gather();

    let mut encoded = Vec::new();

    if let Err(source) = encoder.encode(&metric_families, &mut encoded) {
        error!("failed to encode metrics response: {source}");
        res.status_code(StatusCode::INTERNAL_SERVER_ERROR);

        return;
    }

    let content_type = match HeaderValue::from_str(encoder.format_type()) {
        Ok(value) => value,
        Err(source) => {
            error!("failed to encode metrics content type header: {source}");
            res.status_code(StatusCode::INTERNAL_SERVER_ERROR);

            return;
        }
    };

    res.headers_mut().insert(CONTENT_TYPE, content_type);
    res.render(String::from_utf8_lossy(&encoded).into_owned());
}

fn metrics() -> Option<&'static Metrics> {
    METRICS.get_or_init(build_metrics).as_ref()
}

fn register<M>(registry: &Registry, name: &str, metric: prometheus::Result<M>) -> Option<M>
where
    M: Collector + Clone + 'static,
{
    let metric = match metric {
        Ok(metric) => metric,
        Err(source) => {
            error!("failed to create {name} metric: {source}");
            return None;
        }
    };

    if let Err(source) = registry.register(Box::new(metric.clone())) {
        error!("failed to register {name} metric: {source}");
        return None;
    }

    Some(metric)
}

fn build_metrics() -> Option<Metrics> {
    let registry = Registry::new();

    let requests_total = register(
        &registry,
        "requests_total",
        IntCounterVec::new(
            Opts::new(
                "jerrycan_json_http_requests_total",
                "Total HTTP requests partitioned by method, route, status class, and status code.",
            ),
            &["method", "route", "status_class", "status_code"],
        ),
    )?;

    let request_duration_seconds = register(
        &registry,
        "request_duration",
        HistogramVec::new(
            HistogramOpts::new(
                "jerrycan_json_http_request_duration_seconds",
                "HTTP request duration in seconds partitioned by method and route.",
            )
            .buckets(vec![
                0.001, 0.0025, 0.005, 0.01, 0.025, 0.05, 0.1, 0.25, 0.5, 1.0, 2.5, 5.0, 10.0,
            ]),
            &["method", "route"],
        ),
    )?;

    let requests_in_flight = register(
        &registry,
        "in-flight gauge",
        IntGauge::with_opts(Opts::new(
            "jerrycan_json_http_requests_in_flight",
            "Current number of in-flight HTTP requests.",
        )),
    )?;

    let webhooks_total = register(
        &registry,
        "webhooks_total",
        IntCounterVec::new(
            Opts::new(
                "jerrycan_json_webhooks_total",
                "Webhook deliveries partitioned by topic and result.",
            ),
            &["topic", "result"],
        ),
    )?;

    let referral_issuances_total = register(
        &registry,
        "referral_issuances_total",
        IntCounterVec::new(
            Opts::new(
                "jerrycan_json_referral_issuances_total",
                "Referral codes handed out, split into newly minted and existing.",
            ),
            &["kind"],
        ),
    )?;

    Some(Metrics {
        registry,
        requests_total,
        request_duration_seconds,
        requests_in_flight,
        webhooks_total,
        referral_issuances_total,
    })
}

fn status_class(status_code: u16) -> &'static str {
    match status_code {
        100..=199 => "1xx",
        200..=299 => "2xx",
        300..=399 => "3xx",
        400..=499 => "4xx",
        500..=599 => "5xx",
        _ => "other",
    }
}

#[cfg(test)]
mod tests {
    use salvo::{
        Router, Service,
        test::{ResponseExt, TestClient},
    };

    use super::*;

    async fn scrape() -> String {
        let service =
            Service::new(Router::new().push(Router::with_path("metrics").get(metrics_handler)));

        TestClient::get("http://example.com/metrics")
            .send(&service)
            .await
            .take_string()
            .await
            .unwrap_or_default()
    }

    #[tokio::test]
    async fn metrics_endpoint_exposes_http_metrics() {
        observe_request("GET", "/api/batches", 200, 0.042);
        observe_request("GET", "/api/batches", 500, 0.123);

        let response = scrape().await;

        assert!(
            response.contains("jerrycan_json_http_requests_total"),
            "expected requests_total metric in response"
        );
        assert!(
            response.contains("jerrycan_json_http_request_duration_seconds"),
            "expected request_duration metric in response"
        );
        assert!(
            response.contains("jerrycan_json_http_requests_in_flight"),
            "expected in-flight metric in response"
        );
    }

    #[tokio::test]
    async fn webhook_topics_outside_the_handled_set_share_a_label() {
        observe_webhook("orders/create", WebhookResult::Processed("order_recorded"));
        observe_webhook("customers/create", WebhookResult::Rejected);
        observe_webhook("customers/delete", WebhookResult::Rejected);

        let response = scrape().await;

        assert!(response.contains(r#"result="order_recorded",topic="orders/create""#));
        assert!(response.contains(r#"result="rejected",topic="other""#));
        assert!(!response.contains("customers/"));
    }

    #[tokio::test]
    async fn referral_issuances_are_split_by_kind() {
        observe_referral_issuance(true);
        observe_referral_issuance(false);

        let response = scrape().await;

        assert!(response.contains(r#"jerrycan_json_referral_issuances_total{kind="existing"}"#));
        assert!(response.contains(r#"jerrycan_json_referral_issuances_total{kind="new"}"#));
    }

    #[test]
    fn status_codes_fall_into_classes() {
        assert_eq!(status_class(201), "2xx");
        assert_eq!(status_class(302), "3xx");
        assert_eq!(status_class(429), "4xx");
        assert_eq!(status_class(999), "other");
    }
}
