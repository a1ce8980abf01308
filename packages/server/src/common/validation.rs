//! Request input validation for phone numbers and OTP codes.

use lazy_static::lazy_static;
use regex::Regex;
use thiserror::Error;

lazy_static! {
    static ref PHONE_RE: Regex = Regex::new(r"^\+?[0-9]{10,15}$").unwrap();
    static ref OTP_CODE_RE: Regex = Regex::new(r"^[0-9]{6}$").unwrap();
}

/// Malformed or missing input, rejected before reaching the OTP core
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{0}")]
pub struct ValidationError(pub String);

impl ValidationError {
    pub fn new(message: impl Into<String>) -> Self {
        Self(message.into())
    }
}

/// Normalize a phone number: strip whitespace, dashes and parentheses, then
/// require an optional leading `+` followed by 10-15 digits.
pub fn normalize_phone(raw: &str) -> Result<String, ValidationError> {
    let phone: String = raw
        .chars()
        .filter(|c| !c.is_whitespace() && !matches!(c, '-' | '(' | ')'))
        .collect();

    if phone.is_empty() {
        return Err(ValidationError::new("Phone number is required"));
    }

    if !PHONE_RE.is_match(&phone) {
        return Err(ValidationError::new("Invalid phone number"));
    }

    Ok(phone)
}

/// Check a submitted OTP is exactly six ASCII digits.
pub fn validate_otp_code(raw: &str) -> Result<&str, ValidationError> {
    let code = raw.trim();

    if code.is_empty() {
        return Err(ValidationError::new("OTP is required"));
    }

    if !OTP_CODE_RE.is_match(code) {
        return Err(ValidationError::new("OTP must be a 6-digit code"));
    }

    Ok(code)
}

/// Keep only the last four digits of a phone number for log output.
pub fn mask_phone(phone: &str) -> String {
    let hidden = phone.chars().count().saturating_sub(4);
    phone
        .chars()
        .enumerate()
        .map(|(i, c)| if i < hidden { '*' } else { c })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_phone_strips_formatting() {
        assert_eq!(
            normalize_phone("+91 (123) 456-7890").unwrap(),
            "+911234567890"
        );
        assert_eq!(normalize_phone("9999999999").unwrap(), "9999999999");
    }

    #[test]
    fn test_normalize_phone_rejects_bad_input() {
        assert_eq!(
            normalize_phone("   ").unwrap_err(),
            ValidationError::new("Phone number is required")
        );
        assert!(normalize_phone("12345").is_err(), "too short");
        assert!(normalize_phone("+1234567890123456").is_err(), "too long");
        assert!(normalize_phone("+91abc4567890").is_err(), "letters");
        assert!(normalize_phone("++911234567890").is_err(), "double plus");
    }

    #[test]
    fn test_validate_otp_code() {
        assert_eq!(validate_otp_code(" 012345 ").unwrap(), "012345");
        assert!(validate_otp_code("").is_err());
        assert!(validate_otp_code("12345").is_err());
        assert!(validate_otp_code("1234567").is_err());
        assert!(validate_otp_code("12a456").is_err());
    }

    #[test]
    fn test_mask_phone() {
        assert_eq!(mask_phone("+911234567890"), "*********7890");
        assert_eq!(mask_phone("123"), "123");
    }
}
