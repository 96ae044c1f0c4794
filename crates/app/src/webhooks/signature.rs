//! Webhook signature verification.

use base64::{Engine as _, engine::general_purpose::STANDARD as BASE64};
use hmac::{Hmac, Mac, digest::InvalidLength};
use sha2::Sha256;

type HmacSha256 = Hmac<Sha256>;

/// Compute the base64 HMAC-SHA256 of `body`, as sent in `x-shopify-hmac-sha256`.
///
/// # Errors
///
/// Returns [`InvalidLength`] if the secret is rejected as an HMAC key.
pub fn sign(secret: &[u8], body: &[u8]) -> Result<String, InvalidLength> {
    let mut mac = HmacSha256::new_from_slice(secret)?;

    mac.update(body);

    Ok(BASE64.encode(mac.finalize().into_bytes()))
}

/// Check `header` against the HMAC of the raw `body` in constant time.
///
/// A header that is not valid base64 never verifies.
#[must_use]
pub fn verify_signature(secret: &[u8], body: &[u8], header: &str) -> bool {
    let Ok(expected) = BASE64.decode(header.trim()) else {
        return false;
    };

    let Ok(mut mac) = HmacSha256::new_from_slice(secret) else {
        return false;
    };

    mac.update(body);

    mac.verify_slice(&expected).is_ok()
}
