//!
//! Fieldgraph: guarded references between persistent entities.
//! This library keeps a graph of entities whose pointers to each other stay
//! consistent while entities are created, copied, saved, loaded and destroyed.
//!
//! ## Core Concepts
//!
//! * **Entities (`Entity`)**: Identified by a type id, an object id and an assembly path. An entity owns named fields, single references and reference lists.
//! * **Graph (`Graph`)**: A generational arena owning every entity. All operations that touch both ends of a reference go through it.
//! * **References (`Reference`, `ReferenceList`)**: Nullable pointers that are either bound to a live target or hold the persisted `(type, id, assembly)` of one. Every bound reference is recorded in its target's back-edge set, so destroying a target nulls every reference to it.
//! * **Resolvers (`resolver::Resolver`)**: Map persisted identities back to live entities after a load.
//! * **Type registries (`TypeRegistry`)**: Answer subtype queries and translate type names for the text form.
//! * **Model records (`persist`)**: Read and write a whole graph as text.

pub mod config;
pub mod constants;
pub mod entity;
pub mod field;
pub mod graph;
pub mod intern;
pub mod persist;
pub mod reference;
pub mod registry;
pub mod resolver;

pub use config::GraphConfig;
pub use entity::{Entity, EntityBuilder, EntityHandle};
pub use graph::{Graph, GraphError};
pub use intern::FieldName;
pub use reference::{ListKey, RefKey, Reference, ReferenceList, UnresolvedRef};
pub use registry::{TypeRegistry, TypeTable};
pub use resolver::{GraphLookup, ResolveReport, Resolver};

/// Numeric type identifier handed out by a [`TypeRegistry`].
pub type TypeId = i32;

/// Persistent object number of an entity, unique within its assembly.
pub type ObjectId = i32;

/// Result type used throughout the Fieldgraph library.
pub type Result<T> = std::result::Result<T, Error>;

/// Common error type for the Fieldgraph library.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialize(#[from] serde_json::Error),

    /// Structured errors from the registry module
    #[error(transparent)]
    Registry(registry::RegistryError),

    /// Structured errors from the field module
    #[error(transparent)]
    Field(field::FieldError),

    /// Structured errors from the reference module
    #[error(transparent)]
    Reference(reference::ReferenceError),

    /// Structured errors from the entity module
    #[error(transparent)]
    Entity(entity::EntityError),

    /// Structured errors from the graph module
    #[error(transparent)]
    Graph(graph::GraphError),

    /// Structured errors from the persist module
    #[error(transparent)]
    Persist(persist::PersistError),
}

impl Error {
    /// Get the originating module for this error.
    pub fn module(&self) -> &'static str {
        match self {
            Error::Io(_) => "io",
            Error::Serialize(_) => "serialize",
            Error::Registry(_) => "registry",
            Error::Field(_) => "field",
            Error::Reference(_) => "reference",
            Error::Entity(_) => "entity",
            Error::Graph(_) => "graph",
            Error::Persist(_) => "persist",
        }
    }

    /// Check if this error indicates something was not found.
    pub fn is_not_found(&self) -> bool {
        match self {
            Error::Registry(registry_err) => registry_err.is_not_found(),
            Error::Graph(graph_err) => graph_err.is_not_found(),
            _ => false,
        }
    }

    /// Check if this error comes from a handle to a destroyed entity.
    pub fn is_stale_handle(&self) -> bool {
        match self {
            Error::Graph(graph_err) => graph_err.is_stale_handle(),
            _ => false,
        }
    }

    /// Check if this error is type-related.
    pub fn is_type_error(&self) -> bool {
        match self {
            Error::Field(field_err) => field_err.is_type_error(),
            Error::Reference(reference_err) => reference_err.is_type_error(),
            Error::Graph(graph_err) => graph_err.is_type_error(),
            _ => false,
        }
    }

    /// Check if this error reports a reference that could not be resolved.
    pub fn is_resolution_failure(&self) -> bool {
        match self {
            Error::Reference(reference_err) => reference_err.is_resolution_failure(),
            _ => false,
        }
    }

    /// Check if this error reports unreadable persisted text.
    pub fn is_malformed(&self) -> bool {
        match self {
            Error::Field(field_err) => field_err.is_read_error(),
            Error::Reference(reference_err) => reference_err.is_malformed(),
            Error::Persist(persist_err) => persist_err.is_malformed(),
            _ => false,
        }
    }

    /// Check if this error reports a broken back-edge invariant.
    pub fn is_binding_violation(&self) -> bool {
        match self {
            Error::Entity(entity_err) => entity_err.is_binding_violation(),
            _ => false,
        }
    }

    /// Check if this error is I/O related.
    pub fn is_io_error(&self) -> bool {
        matches!(self, Error::Io(_))
    }
}
