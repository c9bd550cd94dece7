//! Guarded pointer slots between entities.
//!
//! A [`Reference`] is either *resolved*, holding a non-owning
//! [`EntityHandle`] to its target (possibly none), or *unresolved*, holding
//! the persisted `(type, id, assembly)` triple read from a record. The two
//! states are mutually exclusive.
//!
//! References are plain data. Everything that needs to see both ends of an
//! edge (binding into the target's back-edge set, type checks, resolving)
//! lives on [`Graph`](crate::Graph), addressed by a [`RefKey`].

mod errors;
mod list;
pub mod text;

pub use errors::ReferenceError;
pub use list::{ListKey, ReferenceList};

use std::fmt;

use crate::{
    ObjectId, TypeId,
    constants::{DEFAULT_TYPE, NO_REFERENCE},
    entity::EntityHandle,
};

/// Where a reference lives inside its owning entity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum RefSlot {
    /// The n-th reference slot declared on the entity.
    Single(u32),
    /// An item of the n-th reference list. `item` is a stable id that does
    /// not change when the list is reordered or shrinks.
    Listed { list: u32, item: u32 },
}

/// Graph-wide address of one reference: its owner and its slot.
///
/// Back-edge sets store these keys, so a key stays valid exactly as long as
/// the reference it names.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct RefKey {
    pub owner: EntityHandle,
    pub slot: RefSlot,
}

impl RefKey {
    pub fn single(owner: EntityHandle, index: u32) -> Self {
        Self {
            owner,
            slot: RefSlot::Single(index),
        }
    }

    pub fn listed(owner: EntityHandle, list: u32, item: u32) -> Self {
        Self {
            owner,
            slot: RefSlot::Listed { list, item },
        }
    }

    /// The list this key belongs to, if any.
    pub fn list_key(&self) -> Option<ListKey> {
        match self.slot {
            RefSlot::Single(_) => None,
            RefSlot::Listed { list, .. } => Some(ListKey {
                owner: self.owner,
                list,
            }),
        }
    }
}

impl fmt::Display for RefKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.slot {
            RefSlot::Single(index) => write!(f, "{}.ref[{index}]", self.owner),
            RefSlot::Listed { list, item } => write!(f, "{}.list[{list}]#{item}", self.owner),
        }
    }
}

/// Persisted form of a reference, before resolving.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct UnresolvedRef {
    /// Stored type id. [`DEFAULT_TYPE`] means "the slot's expected type",
    /// negative values come from unknown type names.
    pub type_id: TypeId,
    pub id: ObjectId,
    pub assembly: Vec<i32>,
    /// Type name as read, kept when the registry did not know it so the
    /// reference is written back unchanged.
    pub type_name: Option<String>,
}

impl UnresolvedRef {
    pub fn new(type_id: TypeId, id: ObjectId, assembly: Vec<i32>) -> Self {
        Self {
            type_id,
            id,
            assembly,
            type_name: None,
        }
    }

    /// Builder-style setter for an unrecognised type name.
    pub fn with_type_name(mut self, name: impl Into<String>) -> Self {
        self.type_name = Some(name.into());
        self
    }

    /// True for the empty-slot sentinel, which resolves to null without a lookup.
    pub fn is_empty(&self) -> bool {
        self.id == NO_REFERENCE
    }

    /// Overwrite the leading assembly levels with `to` when they match
    /// `from`. Both paths must be non-empty and equally long. Only the
    /// levels the stored path actually has are compared and replaced.
    pub fn replace_assembly_prefix(&mut self, from: &[i32], to: &[i32]) -> bool {
        if from.is_empty() || from.len() != to.len() {
            return false;
        }
        let overlap = self.assembly.len().min(from.len());
        if self.assembly[..overlap] != from[..overlap] {
            return false;
        }
        let changed = self.assembly[..overlap] != to[..overlap];
        self.assembly[..overlap].copy_from_slice(&to[..overlap]);
        changed
    }

    /// Replace assembly level `level` when it equals `from`.
    ///
    /// Moving from the top level (`from == 0`) into an assembly (`to > 0`)
    /// first inserts a new outermost level, so the whole path moves one
    /// level down.
    pub fn rebase_assembly(&mut self, from: i32, to: i32, level: usize) -> bool {
        let mut changed = false;
        if from == 0 && to > 0 {
            self.assembly.insert(0, 0);
            changed = true;
        }
        if let Some(current) = self.assembly.get_mut(level) {
            if *current == from {
                *current = to;
                changed = true;
            }
        }
        changed
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum RefState {
    Resolved {
        target: Option<EntityHandle>,
        bound: bool,
    },
    Unresolved(UnresolvedRef),
}

impl Default for RefState {
    fn default() -> Self {
        RefState::Resolved {
            target: None,
            bound: false,
        }
    }
}

/// A guarded, nullable pointer slot owned by one entity.
///
/// # Example
///
/// ```
/// use fieldgraph::Reference;
///
/// let reference = Reference::new("parent", 2);
/// assert!(reference.is_resolved());
/// assert!(reference.is_null());
/// assert_eq!(reference.context_name(), "parent");
/// ```
#[derive(Debug)]
pub struct Reference {
    state: RefState,
    context: String,
    expected_type: TypeId,
    print_if_zero: bool,
}

impl Reference {
    /// An empty slot accepting entities of `expected_type` and its subtypes.
    pub fn new(context: impl Into<String>, expected_type: TypeId) -> Self {
        Self {
            state: RefState::default(),
            context: context.into(),
            expected_type,
            print_if_zero: true,
        }
    }

    /// A slot already holding a persisted descriptor.
    pub fn unresolved(
        context: impl Into<String>,
        expected_type: TypeId,
        unresolved: UnresolvedRef,
    ) -> Self {
        let mut reference = Self::new(context, expected_type);
        reference.state = RefState::Unresolved(unresolved);
        reference
    }

    pub fn is_resolved(&self) -> bool {
        matches!(self.state, RefState::Resolved { .. })
    }

    /// True unless the reference is resolved, bound and has a target.
    pub fn is_null(&self) -> bool {
        self.target().is_none()
    }

    /// The live target. Unbound and unresolved references have none.
    pub fn target(&self) -> Option<EntityHandle> {
        match self.state {
            RefState::Resolved {
                target,
                bound: true,
            } => target,
            _ => None,
        }
    }

    /// Whether the target's back-edge set currently holds this reference.
    pub fn is_bound(&self) -> bool {
        matches!(self.state, RefState::Resolved { bound: true, .. })
    }

    pub fn unresolved_ref(&self) -> Option<&UnresolvedRef> {
        match &self.state {
            RefState::Unresolved(unresolved) => Some(unresolved),
            RefState::Resolved { .. } => None,
        }
    }

    pub(crate) fn unresolved_mut(&mut self) -> Option<&mut UnresolvedRef> {
        match &mut self.state {
            RefState::Unresolved(unresolved) => Some(unresolved),
            RefState::Resolved { .. } => None,
        }
    }

    /// Stored object id of an unresolved reference, [`NO_REFERENCE`] otherwise.
    pub fn stored_id(&self) -> ObjectId {
        self.unresolved_ref().map_or(NO_REFERENCE, |u| u.id)
    }

    pub fn context_name(&self) -> &str {
        &self.context
    }

    pub fn set_context_name(&mut self, context: impl Into<String>) {
        self.context = context.into();
    }

    pub fn expected_type(&self) -> TypeId {
        self.expected_type
    }

    /// Type id to hand to a resolver: the stored type, or the expected type
    /// when none was stored.
    pub(crate) fn lookup_type(&self, stored: TypeId) -> TypeId {
        if stored == DEFAULT_TYPE {
            self.expected_type
        } else {
            stored
        }
    }

    /// Whether an empty slot is still written to records.
    pub fn print_if_zero(&self) -> bool {
        self.print_if_zero
    }

    pub fn set_print_if_zero(&mut self, print: bool) {
        self.print_if_zero = print;
    }

    pub(crate) fn state(&self) -> &RefState {
        &self.state
    }

    pub(crate) fn set_state(&mut self, state: RefState) {
        self.state = state;
    }

    /// The stored target regardless of the bound flag.
    pub(crate) fn raw_target(&self) -> Option<EntityHandle> {
        match self.state {
            RefState::Resolved { target, .. } => target,
            RefState::Unresolved(_) => None,
        }
    }

    pub(crate) fn set_bound(&mut self, value: bool) {
        if let RefState::Resolved { bound, .. } = &mut self.state {
            *bound = value;
        }
    }

    /// Drop the target without touching any back-edge set.
    pub(crate) fn zero_out(&mut self) {
        self.state = RefState::default();
    }
}

/// Resolved references compare by target, unresolved ones by their stored
/// triple. A resolved and an unresolved reference are never equal.
impl PartialEq for Reference {
    fn eq(&self, other: &Self) -> bool {
        match (&self.state, &other.state) {
            (RefState::Resolved { .. }, RefState::Resolved { .. }) => {
                self.target() == other.target()
            }
            (RefState::Unresolved(a), RefState::Unresolved(b)) => a == b,
            _ => false,
        }
    }
}
