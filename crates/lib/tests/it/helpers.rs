use std::sync::Arc;

use fieldgraph::{
    Entity, EntityBuilder, EntityHandle, Graph, ListKey, ObjectId, RefKey, Reference,
    ReferenceList, TypeId, TypeTable, field::TypedField,
};

/// Type ids of the test model.
///
/// `BEAM` derives from `PART`; `NODE` is unrelated to both.
#[derive(Debug, Clone, Copy)]
pub struct Types {
    pub part: TypeId,
    pub beam: TypeId,
    pub node: TypeId,
}

pub fn type_table() -> (TypeTable, Types) {
    let mut table = TypeTable::new();
    let part = table.register("PART", None).expect("Failed to register PART");
    let beam = table
        .register("BEAM", Some(part))
        .expect("Failed to register BEAM");
    let node = table.register("NODE", None).expect("Failed to register NODE");
    (table, Types { part, beam, node })
}

pub fn setup_graph() -> (Graph, Types) {
    let (table, types) = type_table();
    (Graph::new(Arc::new(table)), types)
}

/// Declaration of a PART: a `length` and a `name` field, a `parent`
/// reference and a `members` list.
pub fn part_builder(types: &Types, id: ObjectId) -> EntityBuilder {
    declare(Entity::builder(types.part, id), types)
}

fn declare(builder: EntityBuilder, types: &Types) -> EntityBuilder {
    builder
        .field("length", TypedField::new(1.0))
        .field("name", TypedField::new(String::new()))
        .reference(Reference::new("parent", types.part))
        .reference_list(ReferenceList::new("members", types.part))
}

pub fn add_part(graph: &mut Graph, types: &Types, id: ObjectId) -> EntityHandle {
    graph.insert(part_builder(types, id))
}

/// A PART whose `members` list keeps empty placeholders.
pub fn add_fixed_part(graph: &mut Graph, types: &Types, id: ObjectId) -> EntityHandle {
    graph.insert(
        Entity::builder(types.part, id)
            .reference(Reference::new("parent", types.part))
            .reference_list(ReferenceList::new("members", types.part).with_auto_sizing(false)),
    )
}

pub fn parent(owner: EntityHandle) -> RefKey {
    RefKey::single(owner, 0)
}

pub fn members(owner: EntityHandle) -> ListKey {
    ListKey { owner, list: 0 }
}

/// Entity factory for the test model. PART and BEAM records share a layout;
/// NODE records are refused.
pub fn factory(types: Types) -> impl Fn(TypeId, &str) -> Option<EntityBuilder> {
    move |type_id: TypeId, _name: &str| {
        (type_id == types.part || type_id == types.beam)
            .then(|| declare(Entity::builder(type_id, 0), &types))
    }
}

/// Check that every bound reference appears exactly once in its target's
/// back-edge set and that every back-edge names a bound reference to it.
pub fn assert_back_edges_consistent(graph: &Graph) {
    for (handle, entity) in graph.iter() {
        for key in entity.referred_by() {
            let reference = graph
                .reference(*key)
                .expect("Back-edge names a missing reference");
            assert_eq!(reference.target(), Some(handle), "back-edge {key} is stale");
        }
        for (other, other_entity) in graph.iter() {
            for (slot, target) in other_entity.bound_targets() {
                if target != handle {
                    continue;
                }
                let key = RefKey { owner: other, slot };
                let count = entity.referred_by().iter().filter(|k| **k == key).count();
                assert_eq!(count, 1, "{key} recorded {count} times");
            }
        }
    }
}
