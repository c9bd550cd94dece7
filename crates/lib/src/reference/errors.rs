//! Reference-specific error types.
//!
//! Every variant here describes a recoverable data problem: the reference
//! involved has already been left null and a diagnostic has been logged by
//! the time the error is returned.

use thiserror::Error;

use crate::{ObjectId, TypeId};

/// Errors that can occur while assigning, resolving or reading references.
///
/// # Stability
///
/// - New variants may be added in minor versions (enum is `#[non_exhaustive]`)
/// - Helper methods like `is_*()` provide stable APIs
#[non_exhaustive]
#[derive(Debug, Error)]
pub enum ReferenceError {
    /// The target's type is not compatible with the slot's expected type.
    #[error("Incompatible target: slot expects {expected_name} ({expected}), got {actual_name} ({actual})")]
    TypeMismatch {
        /// Expected type id of the slot
        expected: TypeId,
        /// Name of the expected type
        expected_name: String,
        /// Type id of the rejected target
        actual: TypeId,
        /// Name of the rejected target's type
        actual_name: String,
    },

    /// The resolver found no entity for a persisted id.
    #[error("Resolve failure: {type_name} ({type_id}) id {object_id} assembly {assembly:?} referred by {context}")]
    ResolutionFailed {
        /// Type id the resolver was asked for
        type_id: TypeId,
        /// Name of that type
        type_name: String,
        /// The persisted object id
        object_id: ObjectId,
        /// The persisted assembly path
        assembly: Vec<i32>,
        /// Context name of the reference
        context: String,
    },

    /// A persisted type name was not known to the registry.
    #[error("Cannot resolve id {object_id} for {context}: invalid type {type_id}")]
    InvalidType {
        /// The stored (negative) type id
        type_id: TypeId,
        /// The persisted object id
        object_id: ObjectId,
        /// Context name of the reference
        context: String,
    },

    /// The persisted text was not a valid reference.
    #[error("Malformed reference: {reason} near '{found}'")]
    Malformed {
        /// What was expected
        reason: &'static str,
        /// The text found instead (truncated)
        found: String,
    },
}

impl ReferenceError {
    /// Check if this error is a type incompatibility.
    pub fn is_type_error(&self) -> bool {
        matches!(
            self,
            ReferenceError::TypeMismatch { .. } | ReferenceError::InvalidType { .. }
        )
    }

    /// Check if this error means a persisted target could not be found.
    pub fn is_resolution_failure(&self) -> bool {
        matches!(
            self,
            ReferenceError::ResolutionFailed { .. } | ReferenceError::InvalidType { .. }
        )
    }

    /// Check if this error comes from unreadable persisted text.
    pub fn is_malformed(&self) -> bool {
        matches!(self, ReferenceError::Malformed { .. })
    }

    pub(crate) fn malformed(reason: &'static str, found: &str) -> Self {
        ReferenceError::Malformed {
            reason,
            found: found.trim_start().chars().take(24).collect(),
        }
    }
}

// Conversion to the crate-level error type
impl From<ReferenceError> for crate::Error {
    fn from(err: ReferenceError) -> Self {
        crate::Error::Reference(err)
    }
}
