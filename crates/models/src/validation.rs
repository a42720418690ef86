//! Field-level checks shared by the entity modules.

use crate::errors::ModelError;

/// Trim `value` and require it to be non-empty and at most `max_chars` long.
pub fn required_text(field: &str, value: &str, max_chars: Option<usize>) -> Result<String, ModelError> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(ModelError::Validation(format!("{field} required")));
    }
    if let Some(max) = max_chars {
        if trimmed.chars().count() > max {
            return Err(ModelError::Validation(format!("{field} must be at most {max} characters")));
        }
    }
    Ok(trimmed.to_string())
}
