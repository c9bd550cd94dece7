//! Type registry error types.

use thiserror::Error;

use crate::TypeId;

/// Errors that can occur while registering entity types.
///
/// # Stability
///
/// - New variants may be added in minor versions (enum is `#[non_exhaustive]`)
/// - Helper methods like `is_*()` provide stable APIs
#[non_exhaustive]
#[derive(Debug, Error)]
pub enum RegistryError {
    /// A type with this name is already registered.
    #[error("Type already registered: {name}")]
    DuplicateType {
        /// The name that was registered twice
        name: String,
    },

    /// The parent type id does not belong to this registry.
    #[error("Unknown parent type {parent} for type {name}")]
    UnknownParent {
        /// The type being registered
        name: String,
        /// The parent type id that was not found
        parent: TypeId,
    },

    /// An alias points at a type name that is not registered.
    #[error("Cannot alias {alias} to unknown type {target}")]
    UnknownAliasTarget {
        /// The legacy name being added
        alias: String,
        /// The type name it should map to
        target: String,
    },
}

impl RegistryError {
    /// Check if this error reports a name collision.
    pub fn is_duplicate(&self) -> bool {
        matches!(self, RegistryError::DuplicateType { .. })
    }

    /// Check if this error refers to a type that does not exist.
    pub fn is_not_found(&self) -> bool {
        matches!(
            self,
            RegistryError::UnknownParent { .. } | RegistryError::UnknownAliasTarget { .. }
        )
    }
}

// Conversion to the crate-level error type
impl From<RegistryError> for crate::Error {
    fn from(err: RegistryError) -> Self {
        crate::Error::Registry(err)
    }
}
