//! Input validation for dotenv-keyvault.
//!
//! Validates variable names read from `.env` files.

use crate::error::DotenvError;

/// Validate a variable name.
///
/// Variable names must be valid environment variable names:
/// - Only ASCII letters, digits, and underscore
/// - Cannot start with a digit
/// - Cannot be empty
///
/// # Errors
///
/// Returns `DotenvError::InvalidKey` if the name is invalid.
pub fn validate_key(key: &str) -> Result<(), DotenvError> {
    let invalid = |reason: String| DotenvError::InvalidKey {
        key: key.to_string(),
        reason,
    };

    let Some(first_char) = key.chars().next() else {
        return Err(invalid("name is empty".to_string()));
    };

    if first_char.is_ascii_digit() {
        return Err(invalid("cannot start with a digit".to_string()));
    }

    for (i, ch) in key.chars().enumerate() {
        if !ch.is_ascii_alphanumeric() && ch != '_' {
            return Err(invalid(format!(
                "invalid character '{}' at position {}. Only letters, digits, and underscore are allowed",
                ch,
                i + 1
            )));
        }
    }

    Ok(())
}
