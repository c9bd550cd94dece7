use fieldgraph::{Entity, GraphConfig, GraphLookup, Reference, ReferenceList};

use crate::helpers::*;

#[test]
fn test_lists_default_to_auto_sizing() {
    let list = ReferenceList::new("members", 1);
    assert!(list.is_auto_sizing());
    assert!(list.is_empty());
    assert!(!list.with_auto_sizing(false).is_auto_sizing());
}

#[test]
fn test_insert_last_binds_each_element() {
    let (mut graph, types) = setup_graph();
    let a = add_part(&mut graph, &types, 10);
    let b = add_part(&mut graph, &types, 1);

    graph.insert_last_target(members(a), b).unwrap();
    graph.insert_last_target(members(a), b).unwrap();

    assert_eq!(graph.list_targets(members(a)).unwrap(), vec![b, b]);
    assert_eq!(graph.entity(b).unwrap().referred_by().len(), 2);
    assert_eq!(graph.referring_objects(b, "members", false).unwrap(), vec![a, a]);
    assert_back_edges_consistent(&graph);
}

#[test]
fn test_insert_last_with_prebuilt_reference() {
    let (mut graph, types) = setup_graph();
    let a = add_part(&mut graph, &types, 10);

    let key = graph
        .insert_last(members(a), Reference::new("members", types.part))
        .unwrap();
    graph.read_reference_str(key, "7").unwrap();
    assert_eq!(graph.list_text(members(a)).unwrap(), "7");
}

#[test]
fn test_item_keys_survive_reordering() {
    let (mut graph, types) = setup_graph();
    let a = add_part(&mut graph, &types, 10);
    let b1 = add_part(&mut graph, &types, 1);
    let b2 = add_part(&mut graph, &types, 2);
    let b3 = add_part(&mut graph, &types, 3);
    graph.insert_last_target(members(a), b1).unwrap();
    let middle = graph.insert_last_target(members(a), b2).unwrap();
    graph.insert_last_target(members(a), b3).unwrap();

    graph.shuffle(members(a), 1).unwrap();
    assert_eq!(graph.list_targets(members(a)).unwrap(), vec![b2, b3, b1]);
    assert_eq!(graph.target(middle).unwrap(), Some(b2));

    graph.erase(members(a), 2).unwrap();
    assert_eq!(graph.target(middle).unwrap(), Some(b2));
    assert_eq!(graph.list_item_key(members(a), 0).unwrap(), Some(middle));
    assert_back_edges_consistent(&graph);
}

#[test]
fn test_read_list_replaces_content() {
    let (mut graph, types) = setup_graph();
    let a = add_part(&mut graph, &types, 10);
    let b = add_part(&mut graph, &types, 1);
    graph.insert_last_target(members(a), b).unwrap();

    graph
        .read_list_str(members(a), "2 aID: 1 uID: 3 BEAM 4")
        .unwrap();

    assert!(graph.entity(b).unwrap().referred_by().is_empty());
    let list = graph.list(members(a)).unwrap();
    assert_eq!(list.len(), 3);
    assert_eq!(list.get(1).unwrap().unresolved_ref().unwrap().assembly, vec![1]);
    assert_eq!(list.get(1).unwrap().unresolved_ref().unwrap().type_id, types.beam);
    assert_eq!(
        graph.list_text(members(a)).unwrap(),
        "2 aID: 1 uID: 3 BEAM 4"
    );
}

#[test]
fn test_read_list_stops_at_non_reference_token() {
    let (mut graph, types) = setup_graph();
    let a = add_part(&mut graph, &types, 10);
    let mut cursor = fieldgraph::field::TextCursor::new("5 6; length = 2;");

    graph.read_list(members(a), &mut cursor).unwrap();
    assert_eq!(graph.list(members(a)).unwrap().len(), 2);
    assert_eq!(cursor.peek_char(), Some(';'));
}

#[test]
fn test_read_list_keeps_elements_before_malformed_one() {
    let (mut graph, types) = setup_graph();
    let auto = add_part(&mut graph, &types, 10);
    let fixed = add_fixed_part(&mut graph, &types, 11);

    let err = graph.read_list_str(members(auto), "5 aID: 2 6").unwrap_err();
    assert!(err.is_malformed());
    assert_eq!(graph.list_text(members(auto)).unwrap(), "5");

    graph.read_list_str(members(fixed), "5 aID: 2 6").unwrap_err();
    assert_eq!(graph.list_text(members(fixed)).unwrap(), "5 0");
}

#[test]
fn test_strict_reading_needs_terminator() {
    let (table, types) = type_table();
    let config = GraphConfig {
        lenient_list_reading: false,
        ..GraphConfig::default()
    };
    let mut graph = fieldgraph::Graph::with_config(std::sync::Arc::new(table), config);
    let a = add_part(&mut graph, &types, 10);

    graph.read_list_str(members(a), "5 6").unwrap();
    graph.read_list_str(members(a), "5 6;").unwrap();
    assert!(graph.read_list_str(members(a), "5 six;").unwrap_err().is_malformed());
}

#[test]
fn test_resolve_list_against_graph() {
    let (mut graph, types) = setup_graph();
    let a = add_part(&mut graph, &types, 10);
    let b1 = add_part(&mut graph, &types, 1);
    let beam = graph.insert(Entity::builder(types.beam, 2).assembly(vec![7]));

    graph
        .read_list_str(members(a), "1 aID: 7 uID: 2 BEAM 0 99")
        .unwrap();
    let report = graph.resolve_list(members(a), &GraphLookup).unwrap();

    assert_eq!(report.resolved, 2);
    assert_eq!(report.removed, 1);
    assert!(report.failures[0].is_resolution_failure());
    assert_eq!(graph.list_targets(members(a)).unwrap(), vec![b1, beam]);
    assert_back_edges_consistent(&graph);
}

#[test]
fn test_copy_list() {
    let (mut graph, types) = setup_graph();
    let a = add_part(&mut graph, &types, 10);
    let b = add_part(&mut graph, &types, 11);
    let t1 = add_part(&mut graph, &types, 1);
    let t2 = add_part(&mut graph, &types, 2);
    graph.insert_last_target(members(a), t1).unwrap();
    graph.insert_last_target(members(a), t2).unwrap();
    graph.insert_last_target(members(b), t2).unwrap();

    graph.copy_list(members(b), members(a), false).unwrap();
    assert_eq!(graph.list_targets(members(b)).unwrap(), vec![t1, t2]);
    assert_eq!(graph.entity(t2).unwrap().referred_by().len(), 2);

    graph.copy_list(members(b), members(a), true).unwrap();
    assert!(graph.list_targets(members(b)).unwrap().is_empty());
    assert_eq!(graph.list_text(members(b)).unwrap(), "1 2");
    assert_back_edges_consistent(&graph);
}

#[test]
fn test_clear_list_unbinds() {
    let (mut graph, types) = setup_graph();
    let a = add_part(&mut graph, &types, 10);
    let b = add_part(&mut graph, &types, 1);
    graph.insert_last_target(members(a), b).unwrap();

    graph.clear_list(members(a)).unwrap();
    assert!(graph.list(members(a)).unwrap().is_empty());
    assert!(graph.entity(b).unwrap().referred_by().is_empty());
}
