/// Input validation for path parameters on all query routes
use thiserror::Error;

const MAX_DISPLAY_NAME_CHARS: usize = 64;
const MAX_ID_LEN: usize = 128;

#[derive(Debug, Error, PartialEq)]
pub enum ValidationError {
    #[error("Display name cannot be empty")]
    DisplayNameEmpty,

    #[error("Display name too long (max 64 characters, got {0})")]
    DisplayNameTooLong(usize),

    #[error("Display name contains control characters")]
    DisplayNameInvalidChars,

    #[error("Id cannot be empty")]
    IdEmpty,

    #[error("Id too long (max 128 characters, got {0})")]
    IdTooLong(usize),

    #[error("Id contains invalid characters (only alphanumeric, '_' and '-' allowed)")]
    IdInvalidChars,
}

/// Validates a VRC display name
///
/// Rules:
/// - Cannot be empty
/// - Max 64 characters
/// - No control characters
pub fn validate_display_name(name: &str) -> Result<(), ValidationError> {
    if name.is_empty() {
        return Err(ValidationError::DisplayNameEmpty);
    }

    let chars = name.chars().count();
    if chars > MAX_DISPLAY_NAME_CHARS {
        return Err(ValidationError::DisplayNameTooLong(chars));
    }

    if name.chars().any(char::is_control) {
        return Err(ValidationError::DisplayNameInvalidChars);
    }

    Ok(())
}

/// Validates a world, group, server or role id
///
/// Rules:
/// - Cannot be empty
/// - Max 128 characters
/// - Only ASCII alphanumeric characters, '_' and '-'
pub fn validate_id(id: &str) -> Result<(), ValidationError> {
    if id.is_empty() {
        return Err(ValidationError::IdEmpty);
    }

    if id.len() > MAX_ID_LEN {
        return Err(ValidationError::IdTooLong(id.len()));
    }

    if !id
        .chars()
        .all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-')
    {
        return Err(ValidationError::IdInvalidChars);
    }

    Ok(())
}
