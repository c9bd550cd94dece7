use fieldgraph::{
    Entity, EntityHandle, Reference,
    field::{TextCursor, TypedField},
};

use crate::helpers::*;

#[test]
fn test_field_access_by_name() {
    let (mut graph, types) = setup_graph();
    let a = add_part(&mut graph, &types, 10);

    assert!(graph.set_field_value(a, "length", 3.5).unwrap());
    assert!(!graph.set_field_value(a, "length", 3.5).unwrap());
    assert_eq!(*graph.field::<f64>(a, "length").unwrap().value(), 3.5);

    let err = graph.set_field_value(a, "length", 3).unwrap_err();
    assert!(err.is_type_error());
    assert!(graph.field::<f64>(a, "height").unwrap_err().is_not_found());
}

#[test]
fn test_read_field_skips_internal_fields() {
    let (mut graph, types) = setup_graph();
    let a = graph.insert(
        Entity::builder(types.part, 10)
            .field("length", TypedField::new(1.0))
            .field("cache", TypedField::no_print(0)),
    );

    assert!(graph.read_field(a, "length", &mut TextCursor::new("4.25"), true).unwrap());
    assert!(!graph.read_field(a, "cache", &mut TextCursor::new("9"), true).unwrap());
    assert!(!graph.read_field(a, "missing", &mut TextCursor::new("9"), true).unwrap());
    assert_eq!(*graph.field::<f64>(a, "length").unwrap().value(), 4.25);

    let err = graph
        .read_field(a, "length", &mut TextCursor::new("long"), true)
        .unwrap_err();
    assert!(err.is_malformed());
}

#[test]
fn test_add_field_after_insert() {
    let (mut graph, types) = setup_graph();
    let a = add_part(&mut graph, &types, 10);

    let replaced = graph
        .add_field(a, "label", TypedField::new(String::from("x")))
        .unwrap();
    assert!(replaced.is_none());
    assert_eq!(graph.field::<String>(a, "label").unwrap().value(), "x");

    assert!(graph.remove_field(a, "label").unwrap().is_some());
    assert!(graph.field::<String>(a, "label").is_err());
}

#[test]
fn test_field_texts_are_sorted_and_printable() {
    let (mut graph, types) = setup_graph();
    let a = add_part(&mut graph, &types, 10);
    graph
        .set_field_value(a, "name", String::from("main"))
        .unwrap();

    let texts = graph.field_texts(a, true).unwrap();
    let names: Vec<_> = texts.iter().map(|(name, _)| name.as_str()).collect();
    assert_eq!(names, vec!["length", "name"]);
    assert_eq!(texts[1].1, "\"main\"");
}

#[test]
fn test_checksum_ignores_identity() {
    let (mut graph, types) = setup_graph();
    let a = add_part(&mut graph, &types, 10);
    let b = add_part(&mut graph, &types, 11);
    graph.set_target(parent(a), Some(b)).unwrap();

    let checksum = graph.checksum(a).unwrap();
    assert_eq!(checksum.len(), 64);
    assert_eq!(checksum, graph.checksum(b).unwrap());
}

#[test]
fn test_copy_fields_only_leaves_references() {
    let (mut graph, types) = setup_graph();
    let a = add_part(&mut graph, &types, 10);
    let b = add_part(&mut graph, &types, 11);
    let target = add_part(&mut graph, &types, 20);
    graph.set_field_value(a, "length", 9.0).unwrap();
    graph.set_target(parent(a), Some(target)).unwrap();

    assert!(graph.copy_entity(b, a, true, false).unwrap());
    assert_eq!(*graph.field::<f64>(b, "length").unwrap().value(), 9.0);
    assert!(graph.reference(parent(b)).unwrap().is_null());
}

#[test]
fn test_copy_with_forced_unresolve() {
    let (mut graph, types) = setup_graph();
    let a = add_part(&mut graph, &types, 10);
    let b = add_part(&mut graph, &types, 11);
    let target = add_part(&mut graph, &types, 20);
    graph.set_target(parent(a), Some(target)).unwrap();
    graph.insert_last_target(members(a), target).unwrap();

    assert!(graph.copy_entity(b, a, false, true).unwrap());

    assert_eq!(graph.entity(target).unwrap().referred_by().len(), 2);
    assert_eq!(graph.reference_text(parent(b)).unwrap(), "20");
    assert!(!graph.reference(parent(b)).unwrap().is_resolved());
    assert_eq!(graph.list_text(members(b)).unwrap(), "20");
}

#[test]
fn test_copy_between_mismatched_layouts() {
    let (mut graph, types) = setup_graph();
    let a = add_part(&mut graph, &types, 10);
    let small = graph.insert(
        Entity::builder(types.part, 11)
            .field("length", TypedField::new(0.0))
            .reference(Reference::new("parent", types.part)),
    );
    let target = add_part(&mut graph, &types, 20);
    graph.set_target(parent(a), Some(target)).unwrap();

    assert!(!graph.copy_entity(small, a, false, false).unwrap());
    assert_eq!(graph.target(parent(small)).unwrap(), Some(target));
    assert!(graph.copy_entity(a, a, false, false).unwrap());
}

#[test]
fn test_reset_fields() {
    let (mut graph, types) = setup_graph();
    let a = add_part(&mut graph, &types, 10);
    let template = graph.insert(Entity::builder(types.part, 0).field("length", TypedField::new(0.0)));
    graph.set_field_value(a, "length", 5.0).unwrap();
    graph.set_field_value(a, "name", String::from("kept")).unwrap();

    assert!(graph.reset_fields(a, template).unwrap());
    assert_eq!(*graph.field::<f64>(a, "length").unwrap().value(), 1.0);
    assert_eq!(graph.field::<String>(a, "name").unwrap().value(), "kept");
    assert!(!graph.reset_fields(template, a).unwrap());
}

#[test]
fn test_release_references_with_replacement() {
    let (mut graph, types) = setup_graph();
    let old = add_part(&mut graph, &types, 1);
    let new = add_part(&mut graph, &types, 2);
    let owners: Vec<EntityHandle> = (10..13).map(|id| add_part(&mut graph, &types, id)).collect();
    for owner in &owners {
        graph.set_target(parent(*owner), Some(old)).unwrap();
        graph.insert_last_target(members(*owner), old).unwrap();
    }

    let released = graph.release_references_to_me(old, "", Some(new)).unwrap();
    assert_eq!(released, 6);
    assert!(graph.entity(old).unwrap().referred_by().is_empty());
    assert_eq!(graph.entity(new).unwrap().referred_by().len(), 6);
    for owner in &owners {
        assert_eq!(graph.target(parent(*owner)).unwrap(), Some(new));
    }
    assert_back_edges_consistent(&graph);
}

#[test]
fn test_release_refuses_incompatible_replacement() {
    let (mut graph, types) = setup_graph();
    let a = add_part(&mut graph, &types, 10);
    let old = add_part(&mut graph, &types, 1);
    let fixed = add_fixed_part(&mut graph, &types, 11);
    let node = graph.insert(Entity::builder(types.node, 2));
    graph.set_target(parent(a), Some(old)).unwrap();
    graph.insert_last_target(members(a), old).unwrap();
    graph.insert_last_target(members(fixed), old).unwrap();

    assert_eq!(graph.release_references_to_me(old, "", Some(node)).unwrap(), 3);
    assert!(graph.reference(parent(a)).unwrap().is_null());
    assert!(graph.entity(node).unwrap().referred_by().is_empty());

    // Emptied list slots follow the list policy.
    assert_eq!(graph.list(members(a)).unwrap().len(), 0);
    assert_eq!(graph.list(members(fixed)).unwrap().len(), 1);
    assert_eq!(graph.list_get(members(fixed), 0).unwrap(), None);
    assert_back_edges_consistent(&graph);
}

#[test]
fn test_referring_with_context() {
    let (mut graph, types) = setup_graph();
    let target = add_part(&mut graph, &types, 1);
    let a = add_part(&mut graph, &types, 10);
    graph.insert_last_target(members(a), target).unwrap();
    graph.set_target(parent(a), Some(target)).unwrap();

    let pairs = graph.referring_with_context(target).unwrap();
    assert_eq!(
        pairs,
        vec![("members".to_string(), a), ("parent".to_string(), a)]
    );
}

#[test]
fn test_back_edge_discipline_is_reported() {
    let (mut graph, types) = setup_graph();
    let a = add_part(&mut graph, &types, 10);
    let b = add_part(&mut graph, &types, 11);
    graph.set_target(parent(a), Some(b)).unwrap();

    let err = graph.insert_in_ref_by(b, parent(a)).unwrap_err();
    assert!(err.is_binding_violation());
    let err = graph.delete_from_ref_by(a, parent(a)).unwrap_err();
    assert!(err.is_binding_violation());
    assert_eq!(graph.entity(b).unwrap().referred_by().len(), 1);
}

#[test]
fn test_describe() {
    let (mut graph, types) = setup_graph();
    let a = graph.insert(Entity::builder(types.beam, 7).assembly(vec![2]));
    assert_eq!(graph.describe(a), "BEAM [7] in [2]");
    graph.destroy(a).unwrap();
    assert!(graph.describe(a).starts_with("(destroyed"));
}
