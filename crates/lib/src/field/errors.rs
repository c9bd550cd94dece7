//! Field-specific error types.

use thiserror::Error;

/// Errors that can occur while reading or copying field values.
///
/// # Stability
///
/// - New variants may be added in minor versions (enum is `#[non_exhaustive]`)
/// - Helper methods like `is_*()` provide stable APIs
#[non_exhaustive]
#[derive(Debug, Error)]
pub enum FieldError {
    /// The text did not contain a value of the expected shape.
    #[error("Read failure: expected {expected}, found '{found}'")]
    ReadFailure {
        /// Description of the expected token
        expected: &'static str,
        /// The text found instead (truncated)
        found: String,
    },

    /// An integer did not fit in 32 bits.
    #[error("Integer overflow: {text} does not fit in 32 bits")]
    IntegerOverflow {
        /// The digits that were read
        text: String,
    },

    /// A quoted string had no closing quote.
    #[error("Unterminated string starting with '{start}'")]
    UnterminatedString {
        /// The first characters of the string
        start: String,
    },

    /// Two fields with different value types were combined.
    #[error("Field type mismatch: expected {expected}")]
    TypeMismatch {
        /// Value type of the receiving field
        expected: &'static str,
    },
}

impl FieldError {
    /// Check if this error was raised while parsing text.
    pub fn is_read_error(&self) -> bool {
        matches!(
            self,
            FieldError::ReadFailure { .. }
                | FieldError::IntegerOverflow { .. }
                | FieldError::UnterminatedString { .. }
        )
    }

    /// Check if this error is a value type mismatch.
    pub fn is_type_error(&self) -> bool {
        matches!(self, FieldError::TypeMismatch { .. })
    }

    pub(crate) fn read_failure(expected: &'static str, found: &str) -> Self {
        FieldError::ReadFailure {
            expected,
            found: found.chars().take(24).collect(),
        }
    }
}

// Conversion to the crate-level error type
impl From<FieldError> for crate::Error {
    fn from(err: FieldError) -> Self {
        crate::Error::Field(err)
    }
}
