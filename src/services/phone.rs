//! Phone number helpers shared by provisioning and delivery.

const TAG_DIGITS: usize = 4;

pub fn digits_only(phone: &str) -> String {
    phone.chars().filter(|c| c.is_ascii_digit()).collect()
}

/// Last four digits of the digit-only form, or every digit when there are fewer.
///
/// Informational only: the panel does not deduplicate on it.
pub fn trial_tag(phone: &str) -> String {
    let digits = digits_only(phone);
    let skip = digits.len().saturating_sub(TAG_DIGITS);
    digits[skip..].to_string()
}

/// Digits with `country_code` prepended unless already present.
pub fn normalize_phone(phone: &str, country_code: &str) -> String {
    let digits = digits_only(phone);
    if digits.starts_with(country_code) {
        digits
    } else {
        format!("{}{}", country_code, digits)
    }
}

/// A usable phone carries at least one digit.
pub fn is_valid_phone(phone: &str) -> bool {
    !phone.trim().is_empty() && phone.chars().any(|c| c.is_ascii_digit())
}
