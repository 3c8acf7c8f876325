//! Validation error types

use thiserror::Error;

/// Input rejected before it reaches the database
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    /// Field is empty (or only whitespace) when it shouldn't be
    #[error("{field} is required")]
    Empty { field: &'static str },

    /// Field exceeds maximum length
    #[error("{field} exceeds maximum length of {max} characters")]
    TooLong { field: &'static str, max: usize },

    /// Field contains NUL or another control character
    #[error("{field} must not contain control characters")]
    ControlCharacters { field: &'static str },

    /// Two fields that must agree do not
    #[error("{0}")]
    Mismatch(&'static str),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_display() {
        assert_eq!(ValidationError::Empty { field: "name" }.to_string(), "name is required");
        assert_eq!(
            ValidationError::TooLong { field: "name", max: 200 }.to_string(),
            "name exceeds maximum length of 200 characters"
        );
        assert_eq!(
            ValidationError::ControlCharacters { field: "name" }.to_string(),
            "name must not contain control characters"
        );
        assert_eq!(
            ValidationError::Mismatch("passwords do not match").to_string(),
            "passwords do not match"
        );
    }
}
