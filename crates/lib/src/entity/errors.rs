//! Entity-specific error types.
//!
//! These report violations of the back-edge bookkeeping discipline. They
//! never come from bad data, only from a reference being bound or unbound
//! out of step with its target.

use thiserror::Error;

use crate::reference::RefKey;

/// Errors raised by an entity's back-edge set.
///
/// # Stability
///
/// - New variants may be added in minor versions (enum is `#[non_exhaustive]`)
/// - Helper methods like `is_*()` provide stable APIs
#[non_exhaustive]
#[derive(Debug, Error)]
pub enum EntityError {
    /// The reference is already registered as pointing at this entity.
    #[error("Reference {key} is already registered as referring to this entity")]
    AlreadyReferenced {
        /// The reference that was inserted twice
        key: RefKey,
    },

    /// The reference was not registered as pointing at this entity.
    #[error("Reference {key} is not registered as referring to this entity")]
    NotReferenced {
        /// The reference that was missing
        key: RefKey,
    },
}

impl EntityError {
    /// Check if this error signals broken back-edge bookkeeping.
    pub fn is_binding_violation(&self) -> bool {
        matches!(
            self,
            EntityError::AlreadyReferenced { .. } | EntityError::NotReferenced { .. }
        )
    }

    /// The reference involved.
    pub fn key(&self) -> RefKey {
        match self {
            EntityError::AlreadyReferenced { key } | EntityError::NotReferenced { key } => *key,
        }
    }
}

// Conversion to the crate-level error type
impl From<EntityError> for crate::Error {
    fn from(err: EntityError) -> Self {
        crate::Error::Entity(err)
    }
}
