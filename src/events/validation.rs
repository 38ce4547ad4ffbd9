//! Field rules shared by the inbound event shapes.

use crate::outcome::{Failure, Outcome};

/// Minimum length of identifier-like text fields, after trimming.
pub const MIN_TEXT_LEN: usize = 6;

/// Inclusive bounds for enhancement round counters.
pub const MIN_ROUNDS: i64 = 1;
pub const MAX_ROUNDS: i64 = 10;

/// Trims `value` and checks it is at least [`MIN_TEXT_LEN`] characters.
///
/// Returns the trimmed text.
pub fn require_text(field: &str, value: &str) -> Outcome<String> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(Failure::invalid_arguments(format!(
            "{} must not be empty",
            field
        )));
    }
    let len = trimmed.chars().count();
    if len < MIN_TEXT_LEN {
        return Err(Failure::invalid_arguments(format!(
            "{} must be at least {} characters, got {}",
            field, MIN_TEXT_LEN, len
        )));
    }
    Ok(trimmed.to_string())
}

/// Checks a round counter lies within `[MIN_ROUNDS, MAX_ROUNDS]`.
pub fn require_rounds(field: &str, value: i64) -> Outcome<i64> {
    if !(MIN_ROUNDS..=MAX_ROUNDS).contains(&value) {
        return Err(Failure::invalid_arguments(format!(
            "{} must be between {} and {}, got {}",
            field, MIN_ROUNDS, MAX_ROUNDS, value
        )));
    }
    Ok(value)
}

/// Checks a flag is literally `true`.
pub fn require_true(field: &str, value: bool) -> Outcome<bool> {
    if !value {
        return Err(Failure::invalid_arguments(format!("{} must be true", field)));
    }
    Ok(value)
}

/// Checks a persisted identity value is present and not blank.
pub fn require_present<'a>(field: &str, value: Option<&'a str>) -> Outcome<&'a str> {
    match value {
        Some(v) if !v.trim().is_empty() => Ok(v),
        _ => Err(Failure::invalid_arguments(format!("{} is required", field))),
    }
}
