//! Redacted, zeroized secret strings.

use std::fmt;

use zeroize::Zeroize;

/// A credential (admin token, webhook signing key) that never prints.
#[derive(Clone, PartialEq, Eq)]
pub struct Secret(String);

impl Secret {
    #[must_use]
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    #[must_use]
    pub fn expose(&self) -> &str {
        &self.0
    }

    /// Treat blank values from the environment as "not configured".
    #[must_use]
    pub fn non_empty(value: Option<String>) -> Option<Self> {
        value
            .filter(|value| !value.trim().is_empty())
            .map(Self::new)
    }
}

impl fmt::Debug for Secret {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Secret(**redacted**)")
    }
}

impl Drop for Secret {
    fn drop(&mut self) {
        self.0.zeroize();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn debug_output_is_redacted() {
        let secret = Secret::new("shpat_123");

        assert_eq!(format!("{secret:?}"), "Secret(**redacted**)");
        assert_eq!(secret.expose(), "shpat_123");
    }

    #[test]
    fn blank_values_are_not_configured() {
        assert!(Secret::non_empty(None).is_none());
        assert!(Secret::non_empty(Some("   ".to_string())).is_none());
        assert!(Secret::non_empty(Some("x".to_string())).is_some());
    }
}
