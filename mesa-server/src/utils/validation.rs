//! Input validation helpers
//!
//! Centralized text length constants and validation functions.
//! SQLite TEXT has no built-in length enforcement, so limits are checked here.

use shared::error::{AppError, ErrorCode};
use shared::money;

// ── Text length limits ──────────────────────────────────────────────

/// Entity names: restaurant, category, menu item, user, ticket subject
pub const MAX_NAME_LEN: usize = 200;

/// Notes, descriptions, ticket messages and responses
pub const MAX_NOTE_LEN: usize = 500;

/// Longer free text (support ticket body)
pub const MAX_MESSAGE_LEN: usize = 4000;

/// Email addresses (RFC 5321)
pub const MAX_EMAIL_LEN: usize = 254;

/// Passwords (before hashing)
pub const MAX_PASSWORD_LEN: usize = 128;

pub const MIN_PASSWORD_LEN: usize = 8;

/// Restaurant slugs
pub const MAX_SLUG_LEN: usize = 64;

/// Per-line item quantity
pub const MAX_QUANTITY: i32 = 999;

// ── Validation helpers ──────────────────────────────────────────────

/// Validate that a required string is non-empty and within the length limit.
pub fn validate_required_text(value: &str, field: &str, max_len: usize) -> Result<(), AppError> {
    if value.trim().is_empty() {
        let err = AppError::validation(format!("{field} must not be empty"));
        return Err(err.with_detail("field", field));
    }
    if value.len() > max_len {
        return Err(AppError::validation(format!(
            "{field} is too long ({} chars, max {max_len})",
            value.len()
        ))
        .with_detail("field", field));
    }
    Ok(())
}

/// Validate that an optional string, if present, is within the length limit.
pub fn validate_optional_text(
    value: &Option<String>,
    field: &str,
    max_len: usize,
) -> Result<(), AppError> {
    if let Some(v) = value
        && v.len() > max_len
    {
        return Err(AppError::validation(format!(
            "{field} is too long ({} chars, max {max_len})",
            v.len()
        ))
        .with_detail("field", field));
    }
    Ok(())
}

/// Lower-case and trim an email, then check its shape
pub fn normalize_email(email: &str) -> Result<String, AppError> {
    let email = email.trim().to_lowercase();
    validate_required_text(&email, "email", MAX_EMAIL_LEN)?;
    let valid = match email.split_once('@') {
        Some((local, domain)) => {
            !local.is_empty()
                && domain.contains('.')
                && !domain.starts_with('.')
                && !domain.ends_with('.')
        }
        None => false,
    };
    if !valid || email.contains(char::is_whitespace) {
        let err = AppError::with_message(ErrorCode::InvalidFormat, "Invalid email");
        return Err(err.with_detail("field", "email"));
    }
    Ok(email)
}

/// Lower-case ASCII letters, digits and hyphens; no leading or trailing hyphen
pub fn validate_slug(slug: &str) -> Result<(), AppError> {
    validate_required_text(slug, "slug", MAX_SLUG_LEN)?;
    let charset_ok = slug
        .chars()
        .all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '-');
    if !charset_ok || slug.starts_with('-') || slug.ends_with('-') {
        return Err(AppError::with_message(
            ErrorCode::InvalidFormat,
            "Slug may only contain lower-case letters, digits and hyphens",
        )
        .with_detail("field", "slug"));
    }
    Ok(())
}

pub fn validate_password(password: &str) -> Result<(), AppError> {
    if password.len() < MIN_PASSWORD_LEN {
        return Err(AppError::validation(format!(
            "Password must be at least {MIN_PASSWORD_LEN} characters"
        ))
        .with_detail("field", "password"));
    }
    if password.len() > MAX_PASSWORD_LEN {
        return Err(AppError::validation(format!(
            "Password is too long (max {MAX_PASSWORD_LEN})"
        ))
        .with_detail("field", "password"));
    }
    Ok(())
}

pub fn validate_quantity(quantity: i32) -> Result<(), AppError> {
    if !(1..=MAX_QUANTITY).contains(&quantity) {
        return Err(AppError::new(ErrorCode::InvalidQuantity)
            .with_detail("quantity", quantity)
            .with_detail("max", MAX_QUANTITY));
    }
    Ok(())
}

/// Menu prices: finite, non-negative, capped
pub fn validate_price(price: f64) -> Result<(), AppError> {
    if !money::is_valid_amount(price) {
        return Err(AppError::new(ErrorCode::MenuItemInvalidPrice).with_detail("price", price));
    }
    Ok(())
}

/// Hourly rates share the price bounds
pub fn validate_rate(rate: f64) -> Result<(), AppError> {
    if !money::is_valid_amount(rate) {
        return Err(AppError::with_message(ErrorCode::ValueOutOfRange, "Hourly rate is out of range")
            .with_detail("hourly_rate", rate));
    }
    Ok(())
}
