use lazy_static::lazy_static;
use regex::Regex;

use crate::error::AppError;

/// Longest accepted text field, in bytes.
pub const MAX_FIELD_LENGTH: usize = 1024;

lazy_static! {
    static ref EMAIL_RE: Regex = Regex::new(r"^[^@\s]+@[^@\s]+\.[^@\s]+$").unwrap();
    static ref FORBIDDEN_CHARS_RE: Regex = Regex::new(r"[\x00\r\n]").unwrap();
}

/// Non-empty, at most [`MAX_FIELD_LENGTH`] bytes, no NUL/CR/LF.
pub fn validate_field(name: &str, value: &str) -> Result<(), AppError> {
    if value.is_empty() {
        return Err(AppError::validation(format!("{name} cannot be empty")));
    }
    if value.len() > MAX_FIELD_LENGTH {
        return Err(AppError::validation(format!(
            "{name} exceeds maximum length of {MAX_FIELD_LENGTH}"
        )));
    }
    if FORBIDDEN_CHARS_RE.is_match(value) {
        return Err(AppError::validation(format!("{name} contains invalid characters")));
    }
    Ok(())
}

pub fn is_valid_email(email: &str) -> bool {
    EMAIL_RE.is_match(email)
}
