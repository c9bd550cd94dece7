//! Builder for declaring an entity before it is placed in a graph.

use super::Entity;
use crate::{
    ObjectId, TypeId,
    field::Field,
    intern::FieldNames,
    reference::{Reference, ReferenceList},
};

/// Declares the fields, reference slots and reference lists of an entity.
///
/// Field names are plain strings here; they are interned into the graph's
/// name table when the entity is inserted.
///
/// Like other builders in the crate it supports both ownership chaining and
/// `_mut` methods:
///
/// ```
/// use fieldgraph::{Entity, Reference, ReferenceList, field::TypedField};
///
/// let builder = Entity::builder(1, 10)
///     .field("length", TypedField::new(2.0))
///     .reference(Reference::new("parent", 1))
///     .reference_list(ReferenceList::new("children", 1));
///
/// let mut builder = builder;
/// builder.field_mut("name", TypedField::new(String::from("beam")));
/// assert_eq!(builder.field_names().count(), 2);
/// ```
#[derive(Debug)]
pub struct EntityBuilder {
    type_id: TypeId,
    id: ObjectId,
    assembly: Vec<i32>,
    fields: Vec<(String, Box<dyn Field>)>,
    references: Vec<Reference>,
    lists: Vec<ReferenceList>,
}

impl EntityBuilder {
    /// Prefer [`Entity::builder`].
    pub fn new(type_id: TypeId, id: ObjectId) -> Self {
        Self {
            type_id,
            id,
            assembly: Vec::new(),
            fields: Vec::new(),
            references: Vec::new(),
            lists: Vec::new(),
        }
    }

    pub fn type_id(&self) -> TypeId {
        self.type_id
    }

    pub fn id(&self) -> ObjectId {
        self.id
    }

    pub fn set_id(mut self, id: ObjectId) -> Self {
        self.id = id;
        self
    }

    pub fn set_id_mut(&mut self, id: ObjectId) -> &mut Self {
        self.id = id;
        self
    }

    /// Place the entity inside a (nested) sub-assembly.
    pub fn assembly(mut self, assembly: Vec<i32>) -> Self {
        self.assembly = assembly;
        self
    }

    pub fn assembly_mut(&mut self, assembly: Vec<i32>) -> &mut Self {
        self.assembly = assembly;
        self
    }

    /// Add a field. A later field with the same name replaces an earlier one.
    pub fn field(mut self, name: impl Into<String>, field: impl Field + 'static) -> Self {
        self.field_mut(name, field);
        self
    }

    pub fn field_mut(&mut self, name: impl Into<String>, field: impl Field + 'static) -> &mut Self {
        let name = name.into();
        self.fields.retain(|(existing, _)| *existing != name);
        self.fields.push((name, Box::new(field)));
        self
    }

    pub fn field_names(&self) -> impl Iterator<Item = &str> {
        self.fields.iter().map(|(name, _)| name.as_str())
    }

    /// Declare the next reference slot.
    pub fn reference(mut self, reference: Reference) -> Self {
        self.references.push(reference);
        self
    }

    pub fn reference_mut(&mut self, reference: Reference) -> &mut Self {
        self.references.push(reference);
        self
    }

    /// Declare the next reference list.
    pub fn reference_list(mut self, list: ReferenceList) -> Self {
        self.lists.push(list);
        self
    }

    pub fn reference_list_mut(&mut self, list: ReferenceList) -> &mut Self {
        self.lists.push(list);
        self
    }

    pub(crate) fn build(self, names: &mut FieldNames) -> Entity {
        let mut entity = Entity::new(self.type_id, self.id, self.assembly);
        for (name, field) in self.fields {
            entity.add_field(names.intern(&name), field);
        }
        for reference in self.references {
            entity.add_reference(reference);
        }
        for list in self.lists {
            entity.add_reference_list(list);
        }
        entity
    }
}
