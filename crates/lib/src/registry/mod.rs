//! Type identification for entities.
//!
//! The graph only consumes the [`TypeRegistry`] trait: numeric type ids,
//! names, and "is-a" queries. [`TypeTable`] is a ready-made implementation
//! with single inheritance, built once at startup and shared by every graph
//! through an `Arc`.

mod errors;

pub use errors::RegistryError;

use std::collections::HashMap;
use std::fmt::Debug;

use crate::{
    TypeId,
    constants::{DEFAULT_TYPE, NO_TYPE},
};

/// Lookup interface for entity types.
///
/// Type ids are positive. `0` is reserved for "no explicit type" and negative
/// values mean "unknown type"; implementations must never hand them out.
pub trait TypeRegistry: Debug {
    /// True when `type_id` is `expected` or derives from it.
    fn is_of_type(&self, type_id: TypeId, expected: TypeId) -> bool;

    /// Name of a registered type.
    fn type_name(&self, type_id: TypeId) -> Option<&str>;

    /// Id of a named type, or [`NO_TYPE`] if the name is unknown.
    fn type_id_from_name(&self, name: &str) -> TypeId;

    /// Name of a type for diagnostics, never failing.
    fn display_name(&self, type_id: TypeId) -> &str {
        self.type_name(type_id).unwrap_or("(unknown)")
    }
}

#[derive(Debug, Clone)]
struct TypeEntry {
    name: String,
    parent: Option<TypeId>,
}

/// A [`TypeRegistry`] with single inheritance.
///
/// # Example
///
/// ```
/// use fieldgraph::{TypeRegistry, TypeTable};
///
/// let mut types = TypeTable::new();
/// let base = types.register("BASE", None).unwrap();
/// let link = types.register("LINK", Some(base)).unwrap();
///
/// assert!(types.is_of_type(link, base));
/// assert!(!types.is_of_type(base, link));
/// assert_eq!(types.type_id_from_name("LINK"), link);
/// ```
#[derive(Debug, Clone, Default)]
pub struct TypeTable {
    entries: Vec<TypeEntry>,
    by_name: HashMap<String, TypeId>,
    aliases: HashMap<String, TypeId>,
}

impl TypeTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a new type, optionally deriving from `parent`.
    pub fn register(
        &mut self,
        name: impl Into<String>,
        parent: Option<TypeId>,
    ) -> Result<TypeId, RegistryError> {
        let name = name.into();
        if self.by_name.contains_key(&name) || self.aliases.contains_key(&name) {
            return Err(RegistryError::DuplicateType { name });
        }
        if let Some(parent) = parent {
            if self.entry(parent).is_none() {
                return Err(RegistryError::UnknownParent { name, parent });
            }
        }

        let id = self.entries.len() as TypeId + 1;
        self.by_name.insert(name.clone(), id);
        self.entries.push(TypeEntry { name, parent });
        Ok(id)
    }

    /// Map a legacy type name onto a registered one, so old model files
    /// written with the legacy name still resolve.
    pub fn add_alias(
        &mut self,
        alias: impl Into<String>,
        target: &str,
    ) -> Result<(), RegistryError> {
        let alias = alias.into();
        if self.by_name.contains_key(&alias) {
            return Err(RegistryError::DuplicateType { name: alias });
        }
        match self.by_name.get(target) {
            Some(&id) => {
                self.aliases.insert(alias, id);
                Ok(())
            }
            None => Err(RegistryError::UnknownAliasTarget {
                alias,
                target: target.to_string(),
            }),
        }
    }

    /// Parent type of `type_id`, if any.
    pub fn parent(&self, type_id: TypeId) -> Option<TypeId> {
        self.entry(type_id).and_then(|entry| entry.parent)
    }

    /// Number of registered types.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    fn entry(&self, type_id: TypeId) -> Option<&TypeEntry> {
        if type_id <= DEFAULT_TYPE {
            return None;
        }
        self.entries.get(type_id as usize - 1)
    }
}

impl TypeRegistry for TypeTable {
    fn is_of_type(&self, type_id: TypeId, expected: TypeId) -> bool {
        let mut current = Some(type_id);
        while let Some(id) = current {
            if id == expected {
                return self.entry(id).is_some();
            }
            current = self.parent(id);
        }
        false
    }

    fn type_name(&self, type_id: TypeId) -> Option<&str> {
        self.entry(type_id).map(|entry| entry.name.as_str())
    }

    fn type_id_from_name(&self, name: &str) -> TypeId {
        if let Some(&id) = self.by_name.get(name) {
            return id;
        }
        if let Some(&id) = self.aliases.get(name) {
            tracing::debug!(alias = name, type_id = id, "Mapped legacy type name");
            return id;
        }
        tracing::warn!(type_name = name, "Unknown type name");
        NO_TYPE
    }
}
