//! Entities: the nodes of the object graph.
//!
//! An [`Entity`] owns its fields, its reference slots and its reference
//! lists, and keeps the set of references elsewhere in the graph that
//! currently point at it. Entities live in a [`Graph`](crate::Graph) and are
//! addressed by [`EntityHandle`].

mod builder;
mod errors;

pub use builder::EntityBuilder;
pub use errors::EntityError;

use std::collections::BTreeMap;
use std::fmt;

use crate::{
    ObjectId, TypeId,
    field::{Field, FieldValue, TypedField},
    intern::FieldName,
    reference::{RefKey, RefSlot, Reference, ReferenceList},
};

/// Generational index of an entity inside a [`Graph`](crate::Graph).
///
/// A handle whose entity was destroyed never matches a live entity again,
/// even when its slot is reused.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct EntityHandle {
    index: u32,
    generation: u32,
}

impl EntityHandle {
    pub(crate) fn new(index: u32, generation: u32) -> Self {
        Self { index, generation }
    }

    pub fn index(&self) -> u32 {
        self.index
    }

    pub fn generation(&self) -> u32 {
        self.generation
    }
}

impl fmt::Debug for EntityHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "EntityHandle({}v{})", self.index, self.generation)
    }
}

impl fmt::Display for EntityHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}v{}", self.index, self.generation)
    }
}

/// A node of the object graph.
///
/// Identity is the type id, the object id and the assembly path. Fields are
/// keyed by interned name; references and lists are positional, in the order
/// they were declared.
#[derive(Debug)]
pub struct Entity {
    type_id: TypeId,
    id: ObjectId,
    assembly: Vec<i32>,
    fields: BTreeMap<FieldName, Box<dyn Field>>,
    references: Vec<Reference>,
    lists: Vec<ReferenceList>,
    referred_by: Vec<RefKey>,
}

impl Entity {
    /// Start building an entity of `type_id` with object id `id`.
    pub fn builder(type_id: TypeId, id: ObjectId) -> EntityBuilder {
        EntityBuilder::new(type_id, id)
    }

    pub(crate) fn new(type_id: TypeId, id: ObjectId, assembly: Vec<i32>) -> Self {
        Self {
            type_id,
            id,
            assembly,
            fields: BTreeMap::new(),
            references: Vec::new(),
            lists: Vec::new(),
            referred_by: Vec::new(),
        }
    }

    pub fn type_id(&self) -> TypeId {
        self.type_id
    }

    pub fn id(&self) -> ObjectId {
        self.id
    }

    pub fn assembly(&self) -> &[i32] {
        &self.assembly
    }

    pub(crate) fn set_identity(&mut self, id: ObjectId, assembly: Vec<i32>) {
        self.id = id;
        self.assembly = assembly;
    }

    // Fields

    /// Register a field, returning the one it replaced.
    pub fn add_field(&mut self, name: FieldName, field: Box<dyn Field>) -> Option<Box<dyn Field>> {
        self.fields.insert(name, field)
    }

    pub fn remove_field(&mut self, name: FieldName) -> Option<Box<dyn Field>> {
        self.fields.remove(&name)
    }

    pub fn field(&self, name: FieldName) -> Option<&dyn Field> {
        self.fields.get(&name).map(|f| f.as_ref())
    }

    pub fn field_mut(&mut self, name: FieldName) -> Option<&mut (dyn Field + 'static)> {
        self.fields.get_mut(&name).map(|field| field.as_mut())
    }

    /// Typed access to a field. `None` if absent or of another value type.
    pub fn typed_field<T: FieldValue>(&self, name: FieldName) -> Option<&TypedField<T>> {
        self.fields.get(&name)?.as_any().downcast_ref()
    }

    pub fn typed_field_mut<T: FieldValue>(&mut self, name: FieldName) -> Option<&mut TypedField<T>> {
        self.fields.get_mut(&name)?.as_any_mut().downcast_mut()
    }

    /// Fields in name-id order.
    pub fn fields(&self) -> impl Iterator<Item = (FieldName, &dyn Field)> {
        self.fields.iter().map(|(name, field)| (*name, field.as_ref()))
    }

    pub fn field_count(&self) -> usize {
        self.fields.len()
    }

    // Reference slots

    /// Declare a reference slot and return its index.
    pub fn add_reference(&mut self, reference: Reference) -> u32 {
        self.references.push(reference);
        (self.references.len() - 1) as u32
    }

    /// Declare a reference list and return its index.
    pub fn add_reference_list(&mut self, list: ReferenceList) -> u32 {
        self.lists.push(list);
        (self.lists.len() - 1) as u32
    }

    pub fn references(&self) -> &[Reference] {
        &self.references
    }

    pub fn reference(&self, index: u32) -> Option<&Reference> {
        self.references.get(index as usize)
    }

    pub(crate) fn reference_mut(&mut self, index: u32) -> Option<&mut Reference> {
        self.references.get_mut(index as usize)
    }

    pub fn reference_lists(&self) -> &[ReferenceList] {
        &self.lists
    }

    pub fn reference_list(&self, index: u32) -> Option<&ReferenceList> {
        self.lists.get(index as usize)
    }

    pub(crate) fn reference_list_mut(&mut self, index: u32) -> Option<&mut ReferenceList> {
        self.lists.get_mut(index as usize)
    }

    /// The reference stored in `slot`, wherever it lives.
    pub fn slot(&self, slot: RefSlot) -> Option<&Reference> {
        match slot {
            RefSlot::Single(index) => self.reference(index),
            RefSlot::Listed { list, item } => self.reference_list(list)?.item(item),
        }
    }

    pub(crate) fn slot_mut(&mut self, slot: RefSlot) -> Option<&mut Reference> {
        match slot {
            RefSlot::Single(index) => self.reference_mut(index),
            RefSlot::Listed { list, item } => self.reference_list_mut(list)?.item_mut(item),
        }
    }

    /// Every slot of this entity, singles first, then lists in order.
    pub fn slots(&self) -> Vec<RefSlot> {
        let singles = (0..self.references.len() as u32).map(RefSlot::Single);
        let listed = self.lists.iter().enumerate().flat_map(|(list, refs)| {
            refs.item_ids().into_iter().map(move |item| RefSlot::Listed {
                list: list as u32,
                item,
            })
        });
        singles.chain(listed).collect()
    }

    /// Forward edges that are currently bound, with their slots.
    pub fn bound_targets(&self) -> Vec<(RefSlot, EntityHandle)> {
        let singles = self
            .references
            .iter()
            .enumerate()
            .filter_map(|(i, r)| r.target().map(|t| (RefSlot::Single(i as u32), t)));
        let listed = self.lists.iter().enumerate().flat_map(|(list, refs)| {
            refs.bound_items().into_iter().map(move |(item, target)| {
                (
                    RefSlot::Listed {
                        list: list as u32,
                        item,
                    },
                    target,
                )
            })
        });
        singles.chain(listed).collect()
    }

    /// Null every owned reference without touching the targets.
    pub(crate) fn zero_out_all(&mut self) {
        for reference in &mut self.references {
            reference.zero_out();
        }
        for list in &mut self.lists {
            list.zero_out_all();
        }
    }

    // Back-edge set

    /// References anywhere in the graph currently bound to this entity.
    pub fn referred_by(&self) -> &[RefKey] {
        &self.referred_by
    }

    pub(crate) fn take_referred_by(&mut self) -> Vec<RefKey> {
        std::mem::take(&mut self.referred_by)
    }

    pub fn is_referred_by(&self, key: &RefKey) -> bool {
        self.referred_by.contains(key)
    }

    /// Add `key` to the back-edge set. A reference already present is a
    /// binding error and is logged and returned, never duplicated.
    pub fn insert_in_ref_by(&mut self, key: RefKey) -> Result<(), EntityError> {
        if self.referred_by.contains(&key) {
            tracing::error!(
                %key,
                type_id = self.type_id,
                object_id = self.id,
                "Reference inserted twice into back-edge set"
            );
            return Err(EntityError::AlreadyReferenced { key });
        }
        self.referred_by.push(key);
        Ok(())
    }

    /// Remove `key` from the back-edge set. A reference not present is a
    /// binding error and is logged and returned.
    pub fn delete_from_ref_by(&mut self, key: RefKey) -> Result<(), EntityError> {
        match self.referred_by.iter().position(|k| *k == key) {
            Some(index) => {
                self.referred_by.swap_remove(index);
                Ok(())
            }
            None => {
                tracing::error!(
                    %key,
                    type_id = self.type_id,
                    object_id = self.id,
                    "Reference missing from back-edge set"
                );
                Err(EntityError::NotReferenced { key })
            }
        }
    }
}
