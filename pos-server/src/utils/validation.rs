//! Input validation helpers
//!
//! Centralized text length constants and validation functions.

use crate::utils::AppError;

// ── Text length limits ──────────────────────────────────────────────

/// Entity names: product item names, categories, labels
pub const MAX_NAME_LEN: usize = 200;

/// Short identifiers: product type, unit type, gateway ids
pub const MAX_SHORT_TEXT_LEN: usize = 100;

/// Free-form notes (names label on held orders)
pub const MAX_NOTE_LEN: usize = 500;

/// Upper bound for any single monetary input
pub const MAX_PRICE: f64 = 1_000_000.0;

/// Upper bound for a line-item quantity
pub const MAX_QUANTITY: i64 = 10_000;

// ── Validation helpers ──────────────────────────────────────────────

/// Validate that a required string is non-empty and within the length limit.
pub fn validate_required_text(value: &str, field: &str, max_len: usize) -> Result<(), AppError> {
    if value.trim().is_empty() {
        return Err(AppError::validation(format!("{field} must not be empty")));
    }
    if value.len() > max_len {
        return Err(AppError::validation(format!(
            "{field} is too long ({} chars, max {max_len})",
            value.len()
        )));
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
        )));
    }
    Ok(())
}

/// Validate a price: finite, non-negative, below [`MAX_PRICE`]
pub fn validate_price(value: f64, field: &str) -> Result<(), AppError> {
    if !value.is_finite() || value < 0.0 || value > MAX_PRICE {
        return Err(AppError::validation(format!(
            "{field} must be between 0 and {MAX_PRICE}"
        )));
    }
    Ok(())
}

/// Validate a percentage in [0, 100]
pub fn validate_percentage(value: f64, field: &str) -> Result<(), AppError> {
    if !value.is_finite() || !(0.0..=100.0).contains(&value) {
        return Err(AppError::validation(format!(
            "{field} must be between 0 and 100"
        )));
    }
    Ok(())
}

/// Validate a line-item quantity in [1, MAX_QUANTITY]
pub fn validate_quantity(value: i64, field: &str) -> Result<(), AppError> {
    if !(1..=MAX_QUANTITY).contains(&value) {
        return Err(AppError::validation(format!(
            "{field} must be between 1 and {MAX_QUANTITY}"
        )));
    }
    Ok(())
}
