//! Referral Landing Handler

use salvo::{
    http::header::LOCATION,
    oapi::{ToSchema, extract::PathParam},
    prelude::*,
};
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use jerrycan_app::domain::referrals::records::CachedReferral;

use crate::extensions::*;

/// Where unknown codes are sent.
const SHOP_PATH: &str = "/shop/";

/// Referral Landing Response
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub(crate) struct ReferralLandingResponse {
    /// Code to apply at checkout
    pub code: String,

    /// When the referrer's code was minted
    pub created_at: String,
}

impl From<CachedReferral> for ReferralLandingResponse {
    fn from(referral: CachedReferral) -> Self {
        Self {
            code: referral.code,
            created_at: referral.created_at.to_string(),
        }
    }
}

fn redirect_to_shop(res: &mut Response) -> Result<(), StatusError> {
    res.add_header(LOCATION, SHOP_PATH, true)
        .or_500("failed to set location header")?
        .status_code(StatusCode::FOUND);

    Ok(())
}

/// Referral Landing Handler
///
/// Resolves a shared code from the cache. Unknown codes redirect to the shop.
#[endpoint(
    tags("referrals"),
    summary = "Referral Landing",
    responses(
        (status_code = StatusCode::OK, description = "Referral found", body = ReferralLandingResponse),
        (status_code = StatusCode::FOUND, description = "Unknown code, redirected to the shop"),
    ),
)]
pub(crate) async fn handler(
    code: PathParam<String>,
    depot: &mut Depot,
    res: &mut Response,
) -> Result<(), StatusError> {
    let state = depot.state()?;
    let code = code.into_inner();

    match state.app.referrals.lookup_cached_referral(&code).await {
        Ok(Some(referral)) => {
            res.render(Json(ReferralLandingResponse::from(referral)));

            Ok(())
        }
        Ok(None) => {
            debug!(code = %code, "unknown referral code");

            redirect_to_shop(res)
        }
        Err(error) => {
            warn!(code = %code, "referral lookup failed: {error}");

            redirect_to_shop(res)
        }
    }
}
