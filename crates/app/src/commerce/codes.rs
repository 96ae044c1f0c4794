//! Shareable discount code generation.

use jiff::Timestamp;

/// Prefix shared by every referral code this shop issues.
pub const CODE_PREFIX: &str = "JCS";

/// Prefix for rewards paid out to referrers.
pub const REWARD_PREFIX: &str = "JCSR";

const EMAIL_PART_LEN: usize = 6;

/// Derive a code of the form `JCS-{EMAILP}-{TIMEHX}`.
///
/// The middle part is the first six ASCII alphanumerics of the email's local
/// part, upper-cased and padded with `X`; the suffix is the low 24 bits of
/// the millisecond timestamp in upper-case hex. Codes minted for the same
/// address in the same millisecond collide.
#[must_use]
pub fn generate_referral_code(email: &str, now: Timestamp) -> String {
    derive_code(CODE_PREFIX, email, now)
}

/// Derive a reward code for a referrer, `JCSR-{EMAILP}-{TIMEHX}`.
#[must_use]
pub fn generate_reward_code(referrer_email: &str, now: Timestamp) -> String {
    derive_code(REWARD_PREFIX, referrer_email, now)
}

fn derive_code(prefix: &str, email: &str, now: Timestamp) -> String {
    let local = email.split('@').next().unwrap_or_default();

    let mut middle: String = local
        .chars()
        .filter(char::is_ascii_alphanumeric)
        .take(EMAIL_PART_LEN)
        .map(|c| c.to_ascii_uppercase())
        .collect();

    while middle.len() < EMAIL_PART_LEN {
        middle.push('X');
    }

    let suffix = now.as_millisecond().rem_euclid(0x0100_0000);

    format!("{prefix}-{middle}-{suffix:06X}")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn at(ms: i64) -> Timestamp {
        Timestamp::from_millisecond(ms).unwrap_or(Timestamp::UNIX_EPOCH)
    }

    #[test]
    fn code_uses_email_prefix_and_timestamp_suffix() {
        let code = generate_referral_code("jane.doe@example.com", at(0x0123_4567_89AB));

        assert_eq!(code, "JCS-JANEDO-6789AB");
    }

    #[test]
    fn short_local_parts_are_padded() {
        let code = generate_referral_code("al@example.com", at(0x10));

        assert_eq!(code, "JCS-ALXXXX-000010");
    }

    #[test]
    fn symbols_are_dropped_from_local_part() {
        let code = generate_referral_code("o'brien+rum@example.com", at(0xFF_FFFF));

        assert_eq!(code, "JCS-OBRIEN-FFFFFF");
    }

    #[test]
    fn same_input_gives_same_code() {
        let now = at(1_760_000_000_000);

        assert_eq!(
            generate_referral_code("jane@example.com", now),
            generate_referral_code("jane@example.com", now)
        );
    }

    #[test]
    fn codes_have_fixed_shape() {
        let code = generate_referral_code("jane@example.com", Timestamp::now());
        let parts: Vec<&str> = code.split('-').collect();

        assert_eq!(parts.len(), 3, "{code}");
        assert_eq!(parts.first(), Some(&"JCS"));
        assert!(parts.iter().skip(1).all(|part| part.len() == 6), "{code}");
    }

    #[test]
    fn reward_codes_use_their_own_prefix() {
        let code = generate_reward_code("jane@example.com", at(0xABCDEF));

        assert_eq!(code, "JCSR-JANEXX-ABCDEF");
    }
}
