//! Input checks shared by the public forms and the admin tools

use crate::error::{BeaconError, Result};
use once_cell::sync::Lazy;
use regex::Regex;

static EMAIL_REGEX: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^[A-Za-z0-9.!#$%&'*+/=?^_`{|}~-]+@[A-Za-z0-9](?:[A-Za-z0-9-]{0,61}[A-Za-z0-9])?(?:\.[A-Za-z0-9](?:[A-Za-z0-9-]{0,61}[A-Za-z0-9])?)+$")
        .expect("email regex is valid")
});

pub const MAX_EMAIL_LENGTH: usize = 254;
pub const MIN_PASSWORD_LENGTH: usize = 8;

pub fn is_valid_email(email: &str) -> bool {
    email.len() <= MAX_EMAIL_LENGTH && EMAIL_REGEX.is_match(email)
}

/// Trim and lowercase an address, rejecting anything that is not one
pub fn normalize_email(email: &str) -> Result<String> {
    let email = email.trim().to_lowercase();
    if !is_valid_email(&email) {
        return Err(BeaconError::Validation(format!(
            "'{}' is not a valid email address",
            email
        )));
    }
    Ok(email)
}

/// Trimmed value of a required field
pub fn require_text<'a>(field: &str, value: &'a str) -> Result<&'a str> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(BeaconError::Validation(format!("{} is required", field)));
    }
    Ok(trimmed)
}

/// Trimmed optional field; blank strings become `None`
pub fn optional_text(value: Option<&str>) -> Option<String> {
    value
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(str::to_string)
}

/// Header values must stay on one line
pub fn require_single_line(field: &str, value: &str) -> Result<()> {
    if value.contains('\r') || value.contains('\n') {
        return Err(BeaconError::Validation(format!(
            "{} must not contain line breaks",
            field
        )));
    }
    Ok(())
}

pub fn validate_password(password: &str) -> Result<()> {
    if password.chars().count() < MIN_PASSWORD_LENGTH {
        return Err(BeaconError::Validation(format!(
            "password must be at least {} characters",
            MIN_PASSWORD_LENGTH
        )));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accepts_ordinary_addresses() {
        assert!(is_valid_email("jane.doe@example.org"));
        assert!(is_valid_email("donations+2024@beacon-foundation.org"));
    }

    #[test]
    fn rejects_malformed_addresses() {
        for bad in ["", "plainaddress", "@example.org", "jane@", "jane@example", "a b@example.org", "jane@@example.org"] {
            assert!(!is_valid_email(bad), "{} should be rejected", bad);
        }
    }

    #[test]
    fn normalize_trims_and_lowercases() {
        assert_eq!(normalize_email("  Jane@Example.ORG ").unwrap(), "jane@example.org");
        assert!(normalize_email("nope").is_err());
    }

    #[test]
    fn line_breaks_are_rejected_in_headers() {
        assert!(require_single_line("subject", "Hello\r\nBcc: x@example.org").is_err());
        assert!(require_single_line("subject", "Hello").is_ok());
    }

    #[test]
    fn blank_optional_text_is_none() {
        assert_eq!(optional_text(Some("   ")), None);
        assert_eq!(optional_text(Some(" Sam ")), Some("Sam".to_string()));
        assert_eq!(optional_text(None), None);
    }
}
