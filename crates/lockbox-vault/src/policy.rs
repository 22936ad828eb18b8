//! Password strength policy.
//!
//! A candidate secret must satisfy four rules, checked in this order:
//!
//! 1. At least [`MIN_LENGTH`] characters.
//! 2. At least one character from [`SPECIAL_CHARS`].
//! 3. At least one uppercase and one lowercase letter.
//! 4. At least one decimal digit.
//!
//! Evaluation stops at the first rule that fails and reports it as a
//! [`PolicyViolation`].

/// Minimum password length, counted in characters.
pub const MIN_LENGTH: usize = 8;

/// Characters that satisfy the special-character rule.
pub const SPECIAL_CHARS: &str = "!@#$%^&*(),.?\":{}|<>";

/// The rule a candidate secret failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum PolicyViolation {
    #[error("password cannot be less than 8 characters")]
    TooShort,

    #[error("password must contain at least one special character")]
    MissingSpecial,

    #[error("password must contain both uppercase and lowercase letters")]
    MissingCaseMix,

    #[error("password must contain at least one digit")]
    MissingDigit,
}

/// Check `candidate` against the password policy.
///
/// # Errors
///
/// Returns the first [`PolicyViolation`] encountered, in rule order.
pub fn validate(candidate: &str) -> Result<(), PolicyViolation> {
    if candidate.chars().count() < MIN_LENGTH {
        return Err(PolicyViolation::TooShort);
    }

    if !candidate.chars().any(|c| SPECIAL_CHARS.contains(c)) {
        return Err(PolicyViolation::MissingSpecial);
    }

    let has_upper = candidate.chars().any(char::is_uppercase);
    let has_lower = candidate.chars().any(char::is_lowercase);
    if !has_upper || !has_lower {
        return Err(PolicyViolation::MissingCaseMix);
    }

    if !candidate.chars().any(char::is_numeric) {
        return Err(PolicyViolation::MissingDigit);
    }

    Ok(())
}
