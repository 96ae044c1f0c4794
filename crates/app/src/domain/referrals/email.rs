//! Referrer email normalization.

/// Trim and lowercase, returning `None` unless the result contains an `@`.
#[must_use]
pub fn normalize_email(email: &str) -> Option<String> {
    let normalized = email.trim().to_lowercase();

    normalized.contains('@').then_some(normalized)
}
