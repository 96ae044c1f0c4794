//! Generate Referral Handler

use std::time::Instant;

use salvo::{
    oapi::{ToSchema, extract::JsonBody},
    prelude::*,
};
use serde::{Deserialize, Serialize};
use tracing::warn;

use jerrycan_app::domain::referrals::records::IssuedReferral;

use crate::{
    extensions::*, observability::observe_referral_issuance, referrals::errors::into_status_error,
};

/// Generate Referral Request
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub(crate) struct GenerateReferralRequest {
    pub email: String,
}

/// Generate Referral Response
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub(crate) struct GenerateReferralResponse {
    /// Shareable discount code, e.g. `JCS-JANEXX-1A2B3C`
    pub code: String,

    /// Landing page link for the code
    pub share_url: String,

    /// Whether the email already had a code
    pub existing: bool,
}

impl From<IssuedReferral> for GenerateReferralResponse {
    fn from(issued: IssuedReferral) -> Self {
        Self {
            code: issued.code,
            share_url: issued.share_url,
            existing: issued.existing,
        }
    }
}

/// Best guess at the client address, preferring proxy headers.
fn client_key(req: &Request) -> String {
    req.header::<String>("cf-connecting-ip")
        .or_else(|| {
            req.header::<String>("x-forwarded-for").and_then(|forwarded| {
                forwarded
                    .split(',')
                    .next()
                    .map(|first| first.trim().to_string())
            })
        })
        .filter(|address| !address.is_empty())
        .unwrap_or_else(|| req.remote_addr().to_string())
}

/// Generate Referral Handler
///
/// Returns the referral code for an email, minting one on first request.
#[endpoint(
    tags("referrals"),
    summary = "Generate Referral Code",
    responses(
        (status_code = StatusCode::OK, description = "Referral code issued or found"),
        (status_code = StatusCode::BAD_REQUEST, description = "Invalid email"),
        (status_code = StatusCode::TOO_MANY_REQUESTS, description = "Rate limited"),
        (status_code = StatusCode::INTERNAL_SERVER_ERROR, description = "Internal Server Error"),
        (status_code = StatusCode::SERVICE_UNAVAILABLE, description = "Commerce admin not configured"),
    ),
)]
pub(crate) async fn handler(
    req: &mut Request,
    json: JsonBody<GenerateReferralRequest>,
    depot: &mut Depot,
) -> Result<Json<GenerateReferralResponse>, StatusError> {
    let state = depot.state()?;
    let client = client_key(req);

    if !state.referral_limiter.check(&client, Instant::now()) {
        warn!(client = %client, "referral generation rate limited");

        return Err(StatusError::too_many_requests().brief("Too many requests, try again later"));
    }

    let issued = state
        .app
        .referrals
        .issue_referral(&json.into_inner().email)
        .await
        .map_err(into_status_error)?;

    observe_referral_issuance(issued.existing);

    Ok(Json(issued.into()))
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use salvo::test::{ResponseExt, TestClient};
    use serde_json::json;
    use testresult::TestResult;

    use jerrycan_app::{commerce::CommerceAdminError, domain::referrals::ReferralsServiceError};

    use crate::{
        rate_limit::RateLimiter,
        state::State,
        test_helpers::{Mocks, TEST_WEBHOOK_SECRET, service, service_with_state},
    };

    use super::*;

    fn route() -> Router {
        Router::with_path("api/referrals/generate").post(handler)
    }

    fn issued(existing: bool) -> IssuedReferral {
        IssuedReferral {
            code: "JCS-JANEXX-1A2B3C".to_string(),
            share_url: "https://jerrycanspirits.co.uk/refer/JCS-JANEXX-1A2B3C/".to_string(),
            existing,
        }
    }

    async fn post(service: &Service, email: &str) -> Response {
        TestClient::post("http://example.com/api/referrals/generate")
            .add_header("x-forwarded-for", "203.0.113.7, 10.0.0.1", true)
            .json(&json!({ "email": email }))
            .send(service)
            .await
    }

    #[tokio::test]
    async fn test_generate_returns_issued_code() -> TestResult {
        let mut mocks = Mocks::default();

        mocks
            .referrals
            .expect_issue_referral()
            .once()
            .withf(|email| email == "Jane@Example.com")
            .return_once(|_| Ok(issued(false)));

        let mut res = post(&service(mocks, route()), "Jane@Example.com").await;

        let body: GenerateReferralResponse = res.take_json().await?;

        assert_eq!(res.status_code, Some(StatusCode::OK));
        assert_eq!(body.code, "JCS-JANEXX-1A2B3C");
        assert_eq!(
            body.share_url,
            "https://jerrycanspirits.co.uk/refer/JCS-JANEXX-1A2B3C/"
        );
        assert!(!body.existing);

        Ok(())
    }

    #[tokio::test]
    async fn test_generate_repeat_email_reports_existing() -> TestResult {
        let mut mocks = Mocks::default();

        mocks
            .referrals
            .expect_issue_referral()
            .once()
            .return_once(|_| Ok(issued(true)));

        let mut res = post(&service(mocks, route()), "jane@example.com").await;

        let body: GenerateReferralResponse = res.take_json().await?;

        assert!(body.existing);

        Ok(())
    }

    #[tokio::test]
    async fn test_generate_error_statuses() -> TestResult {
        let cases: [(fn() -> ReferralsServiceError, StatusCode); 3] = [
            (|| ReferralsServiceError::InvalidEmail, StatusCode::BAD_REQUEST),
            (
                || ReferralsServiceError::CommerceNotConfigured,
                StatusCode::SERVICE_UNAVAILABLE,
            ),
            (
                || {
                    ReferralsServiceError::Commerce(CommerceAdminError::UnexpectedResponse {
                        operation: "create price rule",
                        status: 422,
                        body: "{}".to_string(),
                    })
                },
                StatusCode::INTERNAL_SERVER_ERROR,
            ),
        ];

        for (error, expected) in cases {
            let mut mocks = Mocks::default();

            mocks
                .referrals
                .expect_issue_referral()
                .once()
                .return_once(move |_| Err(error()));

            let res = post(&service(mocks, route()), "jane").await;

            assert_eq!(res.status_code, Some(expected));
        }

        Ok(())
    }

    #[tokio::test]
    async fn test_generate_is_rate_limited_per_client() -> TestResult {
        let mut mocks = Mocks::default();

        mocks
            .referrals
            .expect_issue_referral()
            .times(2)
            .returning(|_| Ok(issued(true)));

        let state = State::new(
            mocks.into_app(),
            Some(jerrycan_app::secret::Secret::new(TEST_WEBHOOK_SECRET)),
            RateLimiter::new(Duration::from_secs(60), 2),
        );

        let service = service_with_state(state, route());

        assert_eq!(
            post(&service, "jane@example.com").await.status_code,
            Some(StatusCode::OK)
        );
        assert_eq!(
            post(&service, "jane@example.com").await.status_code,
            Some(StatusCode::OK)
        );
        assert_eq!(
            post(&service, "jane@example.com").await.status_code,
            Some(StatusCode::TOO_MANY_REQUESTS)
        );

        Ok(())
    }

    #[tokio::test]
    async fn test_generate_rejects_malformed_body() -> TestResult {
        let mut mocks = Mocks::default();

        mocks.referrals.expect_issue_referral().never();

        let res = TestClient::post("http://example.com/api/referrals/generate")
            .raw_json("{\"mail\": 1}")
            .send(&service(mocks, route()))
            .await;

        assert_eq!(res.status_code, Some(StatusCode::BAD_REQUEST));

        Ok(())
    }
}
