//! Graph-level error types.
//!
//! These cover addressing problems: handles to destroyed entities and keys
//! naming slots, lists or fields an entity does not have.

use thiserror::Error;

use crate::{
    entity::EntityHandle,
    reference::{ListKey, RefKey},
};

/// Errors raised when addressing entities and their slots in a graph.
///
/// # Stability
///
/// - New variants may be added in minor versions (enum is `#[non_exhaustive]`)
/// - Helper methods like `is_*()` provide stable APIs
#[non_exhaustive]
#[derive(Debug, Error)]
pub enum GraphError {
    /// The handle does not name a live entity.
    #[error("Entity {handle} does not exist (destroyed or from another graph)")]
    StaleHandle {
        /// The offending handle
        handle: EntityHandle,
    },

    /// The owner exists but has no such reference slot.
    #[error("No reference at {key}")]
    NoSuchReference {
        /// The key that did not match a slot
        key: RefKey,
    },

    /// The owner exists but has no such reference list.
    #[error("No reference list at {key}")]
    NoSuchList {
        /// The key that did not match a list
        key: ListKey,
    },

    /// An operation that needs two distinct entities got the same one twice.
    #[error("Entity {handle} given as both source and destination")]
    SameEntity {
        /// The repeated handle
        handle: EntityHandle,
    },

    /// The entity has no field with this name.
    #[error("Entity {handle} has no field '{name}'")]
    NoSuchField {
        /// Entity that was searched
        handle: EntityHandle,
        /// Field name that was requested
        name: String,
    },

    /// The field exists but holds another value type.
    #[error("Field '{name}' of entity {handle} does not hold {expected} values")]
    FieldTypeMismatch {
        /// Entity that owns the field
        handle: EntityHandle,
        /// Field name
        name: String,
        /// Requested value type
        expected: &'static str,
    },
}

impl GraphError {
    /// Check if this error means something addressed was not found.
    pub fn is_not_found(&self) -> bool {
        matches!(
            self,
            GraphError::StaleHandle { .. }
                | GraphError::NoSuchReference { .. }
                | GraphError::NoSuchList { .. }
                | GraphError::NoSuchField { .. }
        )
    }

    /// Check if this error is a stale entity handle.
    pub fn is_stale_handle(&self) -> bool {
        matches!(self, GraphError::StaleHandle { .. })
    }

    /// Check if this error is a value type mismatch.
    pub fn is_type_error(&self) -> bool {
        matches!(self, GraphError::FieldTypeMismatch { .. })
    }
}

// Conversion to the crate-level error type
impl From<GraphError> for crate::Error {
    fn from(err: GraphError) -> Self {
        crate::Error::Graph(err)
    }
}
