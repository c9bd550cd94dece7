//! Constants used throughout the fieldgraph library.
//!
//! This module provides central definitions for sentinel ids, reserved record
//! keywords and the tokens of the reference text grammar.

use crate::{ObjectId, TypeId};

/// Object id written for an empty reference slot. Never passed to a resolver.
pub const NO_REFERENCE: ObjectId = 0;

/// Object id of an entity that has not been given a persistent number yet.
///
/// References to such entities keep their live binding when copied with
/// forced unresolution, since the captured id could never be resolved again.
pub const UNNUMBERED: ObjectId = -1;

/// Stored type id meaning "no explicit type, use the slot's expected type".
pub const DEFAULT_TYPE: TypeId = 0;

/// Type id returned by registries for names they do not know.
pub const NO_TYPE: TypeId = -1;

/// Token introducing the assembly path of a reference.
pub const ASSEMBLY_TOKEN: &str = "aID:";

/// Token introducing the object id after an assembly path.
pub const USER_ID_TOKEN: &str = "uID:";

/// Reserved record keyword holding the object id of an entity.
pub const ID_KEY: &str = "ID";

/// Reserved record keyword holding the assembly path of an entity.
pub const ASSEMBLY_KEY: &str = "ASSEMBLY_ID";
