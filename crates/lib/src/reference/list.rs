//! Ordered collections of references sharing one context and one policy.

use std::fmt;

use super::{RefState, Reference};
use crate::{TypeId, entity::EntityHandle};

/// Graph-wide address of a reference list.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ListKey {
    pub owner: EntityHandle,
    pub list: u32,
}

impl fmt::Display for ListKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.list[{}]", self.owner, self.list)
    }
}

#[derive(Debug)]
pub(crate) struct ListItem {
    pub(crate) item: u32,
    pub(crate) reference: Reference,
}

/// An owned, ordered list of references.
///
/// With auto-sizing on (the default) a reference whose target disappears,
/// or that fails to resolve, is removed from the list. With it off the slot
/// stays behind as a null placeholder.
///
/// Each item carries a stable id used in [`RefKey`](super::RefKey)s, so
/// back-edges survive reordering and removal of other items.
#[derive(Debug)]
pub struct ReferenceList {
    context: String,
    expected_type: TypeId,
    auto_sizing: bool,
    items: Vec<ListItem>,
    next_item: u32,
}

impl ReferenceList {
    pub fn new(context: impl Into<String>, expected_type: TypeId) -> Self {
        Self {
            context: context.into(),
            expected_type,
            auto_sizing: true,
            items: Vec::new(),
            next_item: 0,
        }
    }

    /// Builder-style auto-sizing switch.
    pub fn with_auto_sizing(mut self, auto_sizing: bool) -> Self {
        self.auto_sizing = auto_sizing;
        self
    }

    pub fn set_auto_sizing(&mut self, auto_sizing: bool) {
        self.auto_sizing = auto_sizing;
    }

    pub fn is_auto_sizing(&self) -> bool {
        self.auto_sizing
    }

    pub fn context_name(&self) -> &str {
        &self.context
    }

    pub fn expected_type(&self) -> TypeId {
        self.expected_type
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&Reference> {
        self.items.get(index).map(|entry| &entry.reference)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Reference> {
        self.items.iter().map(|entry| &entry.reference)
    }

    /// Live targets in list order, null slots skipped.
    pub fn targets(&self) -> Vec<EntityHandle> {
        self.iter().filter_map(Reference::target).collect()
    }

    /// Index of the first slot pointing at `target`.
    pub fn position_of(&self, target: EntityHandle) -> Option<usize> {
        self.iter().position(|r| r.target() == Some(target))
    }

    /// A fresh element carrying this list's context and type.
    pub(crate) fn new_element(&self) -> Reference {
        Reference::new(self.context.clone(), self.expected_type)
    }

    /// Append an element and return its item id.
    pub(crate) fn push(&mut self, reference: Reference) -> u32 {
        let item = self.next_item;
        self.next_item = self.next_item.wrapping_add(1);
        self.items.push(ListItem { item, reference });
        item
    }

    pub(crate) fn item_id(&self, index: usize) -> Option<u32> {
        self.items.get(index).map(|entry| entry.item)
    }

    pub(crate) fn item_ids(&self) -> Vec<u32> {
        self.items.iter().map(|entry| entry.item).collect()
    }

    pub(crate) fn position_of_item(&self, item: u32) -> Option<usize> {
        self.items.iter().position(|entry| entry.item == item)
    }

    pub(crate) fn item(&self, item: u32) -> Option<&Reference> {
        self.items
            .iter()
            .find(|entry| entry.item == item)
            .map(|entry| &entry.reference)
    }

    pub(crate) fn item_mut(&mut self, item: u32) -> Option<&mut Reference> {
        self.items
            .iter_mut()
            .find(|entry| entry.item == item)
            .map(|entry| &mut entry.reference)
    }

    /// Remove an element. The caller is responsible for unbinding it first.
    pub(crate) fn remove_item(&mut self, item: u32) -> Option<Reference> {
        let index = self.position_of_item(item)?;
        Some(self.items.remove(index).reference)
    }

    /// Rotate so that `first` becomes the first element.
    pub(crate) fn rotate_to(&mut self, first: usize) {
        if first < self.items.len() {
            self.items.rotate_left(first);
        }
    }

    pub(crate) fn bound_items(&self) -> Vec<(u32, EntityHandle)> {
        self.items
            .iter()
            .filter_map(|entry| entry.reference.target().map(|t| (entry.item, t)))
            .collect()
    }

    /// Drop every element. Bound elements must have been unbound already.
    pub(crate) fn clear_items(&mut self) {
        self.items.clear();
    }

    /// Null every element in place, keeping the slots.
    pub(crate) fn zero_out_all(&mut self) {
        for entry in &mut self.items {
            entry.reference.set_state(RefState::default());
        }
    }
}
