//! End-to-end lifecycle of references between two or more entities.

use fieldgraph::{GraphLookup, resolver};

use crate::helpers::*;

#[test]
fn test_bound_reference_is_recorded_and_written() {
    let (mut graph, types) = setup_graph();
    let a = add_part(&mut graph, &types, 10);
    let b = add_part(&mut graph, &types, 20);

    graph
        .set_target(parent(a), Some(b))
        .expect("Failed to set target");

    assert_eq!(graph.entity(b).unwrap().referred_by(), &[parent(a)]);
    assert_eq!(graph.reference_text(parent(a)).unwrap(), "20");
}

#[test]
fn test_persisted_reference_resolves_in_fresh_graph() {
    let text = {
        let (mut graph, types) = setup_graph();
        let a = add_part(&mut graph, &types, 10);
        let b = add_part(&mut graph, &types, 20);
        graph.set_target(parent(a), Some(b)).unwrap();
        graph.reference_text(parent(a)).unwrap()
    };
    assert_eq!(text, "20");

    let (mut graph, types) = setup_graph();
    let a = add_part(&mut graph, &types, 10);
    let b = add_part(&mut graph, &types, 20);
    graph
        .read_reference_str(parent(a), &text)
        .expect("Failed to read reference");
    assert!(!graph.reference(parent(a)).unwrap().is_resolved());

    let by_id = resolver::from_fn(|graph, type_id, id, assembly| graph.lookup(type_id, id, assembly));
    graph
        .resolve_reference(parent(a), &by_id)
        .expect("Failed to resolve reference");

    assert_eq!(graph.target(parent(a)).unwrap(), Some(b));
    assert_back_edges_consistent(&graph);
}

#[test]
fn test_destroying_target_nulls_reference() {
    let (mut graph, types) = setup_graph();
    let a = add_part(&mut graph, &types, 10);
    let b = add_part(&mut graph, &types, 20);
    graph.set_target(parent(a), Some(b)).unwrap();

    graph.destroy(b).expect("Failed to destroy entity");

    let reference = graph.reference(parent(a)).unwrap();
    assert!(reference.is_null());
    assert_eq!(reference.target(), None);
    assert_eq!(graph.target(parent(a)).unwrap(), None);
}

#[test]
fn test_destroy_shrinks_auto_sizing_list() {
    let (mut graph, types) = setup_graph();
    let a = add_part(&mut graph, &types, 10);
    let b1 = add_part(&mut graph, &types, 1);
    let b2 = add_part(&mut graph, &types, 2);
    let b3 = add_part(&mut graph, &types, 3);
    for target in [b1, b2, b3] {
        graph.insert_last_target(members(a), target).unwrap();
    }

    graph.destroy(b2).unwrap();

    assert_eq!(graph.list(members(a)).unwrap().len(), 2);
    assert_eq!(graph.list_targets(members(a)).unwrap(), vec![b1, b3]);
    assert_back_edges_consistent(&graph);
}

#[test]
fn test_destroy_keeps_placeholder_in_fixed_list() {
    let (mut graph, types) = setup_graph();
    let a = add_fixed_part(&mut graph, &types, 10);
    let b1 = add_part(&mut graph, &types, 1);
    let b2 = add_part(&mut graph, &types, 2);
    let b3 = add_part(&mut graph, &types, 3);
    for target in [b1, b2, b3] {
        graph.insert_last_target(members(a), target).unwrap();
    }

    graph.destroy(b2).unwrap();

    let list = graph.list(members(a)).unwrap();
    assert_eq!(list.len(), 3);
    assert_eq!(list.get(0).unwrap().target(), Some(b1));
    assert!(list.get(1).unwrap().is_null());
    assert_eq!(list.get(2).unwrap().target(), Some(b3));
    assert_eq!(graph.list_text(members(a)).unwrap(), "1 0 3");
}

#[test]
fn test_malformed_reference_text_is_survivable() {
    let (mut graph, types) = setup_graph();
    let a = add_part(&mut graph, &types, 10);

    let err = graph
        .read_reference_str(parent(a), "aID: 5 uID:")
        .expect_err("Malformed text should be rejected");
    assert!(err.is_malformed());
    assert_eq!(err.module(), "reference");
    assert!(graph.reference(parent(a)).unwrap().is_null());

    // The graph stays usable.
    let report = graph.resolve_all(&GraphLookup);
    assert!(report.is_clean());
    assert_eq!(graph.reference_text(parent(a)).unwrap(), "0");
}
