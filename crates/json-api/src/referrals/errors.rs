//! Referral Errors

use salvo::http::StatusError;
use tracing::error;

use jerrycan_app::domain::referrals::ReferralsServiceError;

pub(crate) fn into_status_error(error: ReferralsServiceError) -> StatusError {
    match error {
        ReferralsServiceError::InvalidEmail => {
            StatusError::bad_request().brief("A valid email address is required")
        }
        ReferralsServiceError::CommerceNotConfigured => {
            error!("referral requested but the commerce admin token is not configured");

            StatusError::service_unavailable().brief("Referrals are temporarily unavailable")
        }
        other => {
            error!("failed to issue referral: {other}");

            StatusError::internal_server_error().brief("Could not create a referral code")
        }
    }
}
