use fieldgraph::{Entity, GraphConfig, GraphLookup, Reference, UnresolvedRef, resolver};

use crate::helpers::*;

#[test]
fn test_new_reference_is_null_and_resolved() {
    let reference = Reference::new("parent", 1);
    assert!(reference.is_null());
    assert!(reference.is_resolved());
    assert_eq!(reference.context_name(), "parent");
    assert_eq!(reference.expected_type(), 1);
}

#[test]
fn test_empty_reference_writes_zero() {
    let (mut graph, types) = setup_graph();
    let a = add_part(&mut graph, &types, 10);
    assert_eq!(graph.reference_text(parent(a)).unwrap(), "0");
}

#[test]
fn test_write_assembly_and_type_name() {
    let (mut graph, types) = setup_graph();
    let a = add_part(&mut graph, &types, 10);
    let beam = graph.insert(Entity::builder(types.beam, 20).assembly(vec![1, 4]));
    let part = graph.insert(Entity::builder(types.part, 21).assembly(vec![1]));

    graph.set_target(parent(a), Some(beam)).unwrap();
    assert_eq!(
        graph.reference_text(parent(a)).unwrap(),
        "aID: 1 4 uID: 20 BEAM"
    );

    graph.set_target(parent(a), Some(part)).unwrap();
    assert_eq!(graph.reference_text(parent(a)).unwrap(), "aID: 1 uID: 21");
}

#[test]
fn test_read_unresolved_forms() {
    let (mut graph, types) = setup_graph();
    let a = add_part(&mut graph, &types, 10);

    graph.read_reference_str(parent(a), "aID: 1 4 uID: 20 BEAM").unwrap();
    let reference = graph.reference(parent(a)).unwrap();
    assert_eq!(
        reference.unresolved_ref(),
        Some(&UnresolvedRef::new(types.beam, 20, vec![1, 4]))
    );
    assert_eq!(reference.stored_id(), 20);
    // Unresolved references write back what they read.
    assert_eq!(
        graph.reference_text(parent(a)).unwrap(),
        "aID: 1 4 uID: 20 BEAM"
    );

    graph.read_reference_str(parent(a), "20 NOSUCHTYPE").unwrap();
    let stored = graph.reference(parent(a)).unwrap().unresolved_ref().cloned();
    assert_eq!(stored.map(|u| u.type_id), Some(fieldgraph::constants::NO_TYPE));
    let err = graph.resolve_reference(parent(a), &GraphLookup).unwrap_err();
    assert_eq!(err.module(), "reference");
    assert!(graph.reference(parent(a)).unwrap().is_null());
}

#[test]
fn test_unknown_type_name_survives_write_and_read() {
    let (mut graph, types) = setup_graph();
    let a = add_part(&mut graph, &types, 10);
    let b = add_part(&mut graph, &types, 20);

    graph.read_reference_str(parent(a), "20 NOSUCHTYPE").unwrap();
    let written = graph.reference_text(parent(a)).unwrap();
    assert_eq!(written, "20 NOSUCHTYPE");

    graph.read_reference_str(parent(a), &written).unwrap();
    let stored = graph.reference(parent(a)).unwrap().unresolved_ref().cloned().unwrap();
    assert_eq!(stored.type_id, fieldgraph::constants::NO_TYPE);
    assert_eq!(stored.type_name.as_deref(), Some("NOSUCHTYPE"));

    let err = graph.resolve_reference(parent(a), &GraphLookup).unwrap_err();
    assert_eq!(err.module(), "reference");
    assert!(graph.reference(parent(a)).unwrap().is_null());
    assert!(graph.entity(b).unwrap().referred_by().is_empty());

    graph.read_list_str(members(a), "aID: 2 uID: 7 NOSUCHTYPE 20").unwrap();
    assert_eq!(
        graph.list_text(members(a)).unwrap(),
        "aID: 2 uID: 7 NOSUCHTYPE 20"
    );
}

#[test]
fn test_resolve_passes_assembly_to_resolver() {
    let (mut graph, types) = setup_graph();
    let a = add_part(&mut graph, &types, 10);
    let nested = graph.insert(Entity::builder(types.part, 20).assembly(vec![3]));
    add_part(&mut graph, &types, 20);

    graph.read_reference_str(parent(a), "aID: 3 uID: 20").unwrap();
    graph.resolve_reference(parent(a), &GraphLookup).unwrap();
    assert_eq!(graph.target(parent(a)).unwrap(), Some(nested));
}

#[test]
fn test_resolve_refuses_incompatible_lookup_result() {
    let (mut graph, types) = setup_graph();
    let a = add_part(&mut graph, &types, 10);
    let node = graph.insert(Entity::builder(types.node, 20));

    // A resolver that ignores the requested type.
    let careless = resolver::from_fn(move |_, _, _, _| Some(node));
    graph.read_reference_str(parent(a), "20").unwrap();
    let err = graph.resolve_reference(parent(a), &careless).unwrap_err();

    assert!(err.is_type_error());
    assert!(graph.reference(parent(a)).unwrap().is_null());
    assert!(graph.entity(node).unwrap().referred_by().is_empty());
}

#[test]
fn test_resolve_is_a_no_op_when_resolved() {
    let (mut graph, types) = setup_graph();
    let a = add_part(&mut graph, &types, 10);
    let b = add_part(&mut graph, &types, 20);
    graph.set_target(parent(a), Some(b)).unwrap();

    let never = resolver::from_fn(|_, _, _, _| panic!("resolver must not be called"));
    graph.resolve_reference(parent(a), &never).unwrap();
    assert_eq!(graph.target(parent(a)).unwrap(), Some(b));
    assert_eq!(graph.entity(b).unwrap().referred_by().len(), 1);
}

#[test]
fn test_unresolve_of_empty_reference_is_a_no_op() {
    let (mut graph, types) = setup_graph();
    let a = add_part(&mut graph, &types, 10);
    graph.unresolve_reference(parent(a)).unwrap();
    assert!(graph.reference(parent(a)).unwrap().is_resolved());
}

#[test]
fn test_equality_follows_state() {
    let (mut graph, types) = setup_graph();
    let a = add_part(&mut graph, &types, 10);
    let b = add_part(&mut graph, &types, 11);
    let target = add_part(&mut graph, &types, 20);

    assert!(graph.references_equal(parent(a), parent(b)).unwrap());

    graph.set_target(parent(a), Some(target)).unwrap();
    graph.set_target(parent(b), Some(target)).unwrap();
    assert!(graph.references_equal(parent(a), parent(b)).unwrap());

    graph.read_reference_str(parent(a), "20").unwrap();
    assert!(!graph.references_equal(parent(a), parent(b)).unwrap());
    graph.read_reference_str(parent(b), "20").unwrap();
    assert!(graph.references_equal(parent(a), parent(b)).unwrap());
}

#[test]
fn test_copy_of_unresolved_source_stays_unresolved() {
    let (mut graph, types) = setup_graph();
    let a = add_part(&mut graph, &types, 10);
    let b = add_part(&mut graph, &types, 11);
    graph.read_reference_str(parent(a), "aID: 2 uID: 30").unwrap();

    graph.copy_reference(parent(b), parent(a), false).unwrap();
    assert_eq!(
        graph.reference(parent(b)).unwrap().unresolved_ref(),
        Some(&UnresolvedRef::new(0, 30, vec![2]))
    );
}

#[test]
fn test_config_round_trip() {
    let config = GraphConfig {
        lenient_list_reading: false,
        exempt_unnumbered_from_unresolve: true,
    };
    let json = config.to_json_string().unwrap();
    assert_eq!(GraphConfig::from_json_str(&json).unwrap(), config);
    assert_eq!(GraphConfig::from_json_str("{").unwrap_err().module(), "serialize");
}
