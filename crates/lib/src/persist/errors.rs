//! Model record error types.

use thiserror::Error;

/// Errors raised while reading model records.
///
/// Problems local to one value (an unreadable field, a malformed reference)
/// do not abort a load; they are collected in the
/// [`LoadReport`](super::LoadReport). Only input whose record structure is
/// broken is reported here.
///
/// # Stability
///
/// - New variants may be added in minor versions (enum is `#[non_exhaustive]`)
/// - Helper methods like `is_*()` provide stable APIs
#[non_exhaustive]
#[derive(Debug, Error)]
pub enum PersistError {
    /// The record structure could not be parsed.
    #[error("Malformed record at byte {position}: {reason}, found '{found}'")]
    MalformedRecord {
        /// Byte offset into the input
        position: usize,
        /// What the reader expected
        reason: &'static str,
        /// The text found instead (truncated)
        found: String,
    },

    /// The input ended inside a record.
    #[error("Record '{type_name}' is not closed")]
    UnterminatedRecord {
        /// Type name of the open record
        type_name: String,
    },
}

impl PersistError {
    /// Check if this error is about the shape of the input.
    pub fn is_malformed(&self) -> bool {
        matches!(
            self,
            PersistError::MalformedRecord { .. } | PersistError::UnterminatedRecord { .. }
        )
    }

    pub(crate) fn malformed(position: usize, reason: &'static str, found: &str) -> Self {
        PersistError::MalformedRecord {
            position,
            reason,
            found: found.chars().take(24).collect(),
        }
    }
}

// Conversion to the crate-level error type
impl From<PersistError> for crate::Error {
    fn from(err: PersistError) -> Self {
        crate::Error::Persist(err)
    }
}
