//! Integration tests for graph validation rules (G004, G007–G015, G017).

#[allow(dead_code)]
mod helpers;

use compute_graph::ir::*;
use compute_graph::validate::{ValidationOptions, validate_graph_with};
use compute_graph::{GraphError, ValidationReport, validate_graph};
use helpers::*;

// =============================================================================
// Helper: assert a specific error code is present
// =============================================================================

fn assert_has_error(report: &ValidationReport, code: &str) {
    assert!(report.has(code), "Expected error {}, got: {:?}", code, report);
}

fn assert_no_error(report: &ValidationReport, code: &str) {
    assert!(!report.has(code), "Did not expect error {}, but got: {:?}", code, report);
}

#[test]
fn well_formed_graph_passes() {
    let report = validate_graph(&member_features());
    assert!(report.is_ok(), "Expected no errors, got: {}", report);
}

// =============================================================================
// G008: cycles
// =============================================================================

#[test]
fn g008_two_node_cycle_reports_full_cycle() {
    let graph = graph_of(vec![transform(1, "a", &[2]), transform(2, "b", &[1])]);
    let report = validate_graph(&graph);
    let cycles: Vec<&Vec<NodeId>> = report
        .iter()
        .filter_map(|e| match e {
            GraphError::CycleDetected(ids) => Some(ids),
            _ => None,
        })
        .collect();
    assert_eq!(cycles.len(), 1);
    let cycle = cycles[0];
    assert!(
        *cycle == vec![NodeId(1), NodeId(2)] || *cycle == vec![NodeId(2), NodeId(1)],
        "unexpected cycle {:?}",
        cycle
    );
}

#[test]
fn g008_lookup_indirection_is_not_a_cycle() {
    let lookup = Lookup::new(2, "f_seq", vec![KeyReference::new(0).into()], 1, "UNION");
    let graph = graph_of(vec![context(1, "memberId"), lookup.into()]);
    let report = validate_graph(&graph);
    assert!(report.is_ok(), "Expected no errors, got: {}", report);
}

#[test]
fn g008_lookup_node_depending_on_lookup_is_a_cycle() {
    let lookup = Lookup::new(2, "f_seq", vec![KeyReference::new(0).into()], 3, "UNION");
    let graph = graph_of(vec![lookup.into(), transform(3, "f_expansion", &[2])]);
    assert_has_error(&validate_graph(&graph), "G008");
}

#[test]
fn g008_longer_cycle_keeps_traversal_order() {
    let graph = graph_of(vec![
        context(1, "memberId"),
        transform(2, "a", &[1, 4]),
        transform(3, "b", &[2]),
        transform(4, "c", &[3]),
    ]);
    let report = validate_graph(&graph);
    assert!(
        report
            .iter()
            .any(|e| *e == GraphError::CycleDetected(vec![NodeId(2), NodeId(4), NodeId(3)])),
        "got: {:?}",
        report
    );
}

// =============================================================================
// G007: key reference bounds
// =============================================================================

#[test]
fn g007_position_past_single_slot_key() {
    let node = AnyNode::from(Transformation::new(
        3,
        "f_x",
        vec![NodeReference::new(2, [1])],
        TransformationFunction::new("mvel"),
    ))
    .with_concrete_key(ConcreteKey::new([1]));
    let graph = graph_of(vec![
        context(1, "memberId"),
        keyed_source(2, "/data/profile", &[1]),
        node,
    ]);

    let report = validate_graph(&graph);
    assert_eq!(
        report.errors(),
        &[GraphError::KeyReferenceOutOfBounds {
            node: NodeId(3),
            field: "inputs",
            position: 1,
            arity: Some(1),
        }]
    );
}

#[test]
fn g007_two_slot_key_accepts_swapped_positions() {
    let node = AnyNode::from(Transformation::new(
        4,
        "f_pair",
        vec![NodeReference::new(3, [1, 0])],
        TransformationFunction::new("mvel"),
    ))
    .with_concrete_key(ConcreteKey::new([2, 1]));
    let graph = graph_of(vec![
        context(1, "viewerId"),
        context(2, "vieweeId"),
        keyed_source(3, "/data/affinity", &[1, 2]),
        node,
    ]);
    let report = validate_graph(&graph);
    assert!(report.is_ok(), "Expected no errors, got: {}", report);
}

#[test]
fn g007_inherited_arity_is_checked() {
    // No concrete key on the transformation: it inherits node 3's single slot.
    let graph = graph_of(vec![
        context(1, "memberId"),
        keyed_source(2, "/data/profile", &[1]),
        sum_over(3, "f_sum", 2, &[1]),
        Transformation::new(
            4,
            "f_x",
            vec![NodeReference::new(3, [0]), NodeReference::new(3, [2])],
            TransformationFunction::new("mvel"),
        )
        .into(),
    ]);
    let report = validate_graph(&graph);
    assert_eq!(report.len(), 1, "got: {}", report);
    assert_has_error(&report, "G007");
}

#[test]
fn g007_inherited_arity_does_not_depend_on_input_order() {
    let graph_with = |inputs: Vec<NodeReference>| {
        graph_of(vec![
            context(1, "viewerId"),
            context(2, "vieweeId"),
            keyed_source(3, "/data/profile", &[1]),
            keyed_source(5, "/data/affinity", &[1, 2]),
            Transformation::new(4, "f_mix", inputs, TransformationFunction::new("mvel")).into(),
        ])
    };

    let narrow_first = graph_with(vec![NodeReference::new(3, [1]), NodeReference::new(5, [0, 1])]);
    let wide_first = graph_with(vec![NodeReference::new(5, [0, 1]), NodeReference::new(3, [1])]);

    let first = validate_graph(&narrow_first);
    let second = validate_graph(&wide_first);
    assert!(first.is_ok(), "Expected no errors, got: {}", first);
    assert_eq!(first, second);
}

// =============================================================================
// G017: reference width against the referenced key
// =============================================================================

#[test]
fn g017_reference_wider_than_target_key() {
    let node = AnyNode::from(Transformation::new(
        4,
        "f_pair",
        vec![NodeReference::new(3, [0, 1])],
        TransformationFunction::new("mvel"),
    ))
    .with_concrete_key(ConcreteKey::new([1, 2]));
    let graph = graph_of(vec![
        context(1, "viewerId"),
        context(2, "vieweeId"),
        keyed_source(3, "/data/profile", &[1]),
        node,
    ]);

    let report = validate_graph(&graph);
    assert_eq!(
        report.errors(),
        &[GraphError::KeyArityMismatch {
            node: NodeId(4),
            field: "inputs",
            target: NodeId(3),
            expected: 1,
            found: 2,
        }]
    );
}

#[test]
fn g017_unknown_target_arity_is_not_checked() {
    let graph = graph_of(vec![
        context(1, "memberId"),
        Transformation::new(
            2,
            "f_x",
            vec![NodeReference::new(1, [0, 0, 0])],
            TransformationFunction::new("mvel"),
        )
        .into(),
    ]);
    assert_no_error(&validate_graph(&graph), "G017");
}

// =============================================================================
// G004 / G012: references and placeholders
// =============================================================================

#[test]
fn g004_every_dangling_id_is_reported() {
    let graph = graph_of(vec![
        context(1, "memberId"),
        keyed_transform(2, "f_a", &[10, 11], &[12]),
    ]);
    let report = validate_graph(&graph);
    let targets: Vec<NodeId> = report
        .iter()
        .filter_map(|e| match e {
            GraphError::DanglingReference { target, .. } => Some(*target),
            _ => None,
        })
        .collect();
    assert_eq!(targets, vec![NodeId(10), NodeId(11), NodeId(12)]);
}

#[test]
fn g012_unresolved_placeholder_is_reported() {
    let graph = graph_of(vec![
        context(1, "memberId"),
        external(2, "f_later"),
        keyed_transform(3, "f_a", &[2], &[1]),
    ]);
    let report = validate_graph(&graph);
    assert_has_error(&report, "G012");
    assert_no_error(&report, "G004");
}

#[test]
fn ids_present_and_acyclic_means_no_reference_errors() {
    let graphs = [
        member_features(),
        graph_of(vec![context(1, "x"), transform(2, "a", &[1]), transform(3, "b", &[1, 2])]),
        graph_of(vec![transform(1, "a", &[2]), transform(2, "b", &[3])]),
        graph_of(vec![transform(1, "a", &[1])]),
        graph_of(vec![context(1, "x"), keyed_transform(2, "a", &[1], &[7])]),
        graph_of(vec![Lookup::new(2, "f_seq", vec![KeyReference::new(0).into()], 9, "UNION").into()]),
    ];
    for graph in graphs {
        let report = validate_graph(&graph);
        let ids_present = graph
            .nodes()
            .flat_map(|n| {
                let mut ids = n.dependencies();
                ids.extend(n.concrete_key().into_iter().flat_map(|k| k.key.iter().copied()));
                ids
            })
            .all(|id| graph.contains(id));
        let acyclic = compute_graph::parse::DependencyGraph::build(&graph)
            .evaluation_order()
            .is_ok();
        let reference_errors = report.has("G004") || report.has("G008");
        assert_eq!(ids_present && acyclic, !reference_errors, "report: {:?}", report);
    }
}

// =============================================================================
// G009 / G010 / G011: feature index
// =============================================================================

#[test]
fn g009_data_source_cannot_be_a_feature() {
    let mut graph = member_features();
    graph.index_feature("f_raw_clicks", NodeId(2)).unwrap();
    let report = validate_graph(&graph);
    assert_eq!(
        report.errors(),
        &[GraphError::InvalidVariantForFeatureName {
            name: "f_raw_clicks".into(),
            node: NodeId(2),
            kind: NodeKind::DataSource,
        }]
    );
}

#[test]
fn g010_index_name_must_match_declared_name() {
    let mut graph = member_features();
    graph.index_feature("f_alias", NodeId(3)).unwrap();
    assert_has_error(&validate_graph(&graph), "G010");
}

#[test]
fn g011_index_to_missing_node() {
    let mut graph = member_features();
    graph.index_feature("f_gone", NodeId(99)).unwrap();
    assert_has_error(&validate_graph(&graph), "G011");
}

// =============================================================================
// G013 / G014 / G015: data source conventions and their switches
// =============================================================================

#[test]
fn g013_aggregation_must_read_a_data_source() {
    let graph = graph_of(vec![
        context(1, "memberId"),
        keyed_transform(2, "f_t", &[1], &[1]),
        sum_over(3, "f_sum", 2, &[1]),
    ]);
    assert_has_error(&validate_graph(&graph), "G013");

    let options = ValidationOptions {
        check_aggregation_inputs: false,
        ..Default::default()
    };
    assert!(validate_graph_with(&graph, &options).is_ok());
}

#[test]
fn g014_event_source_without_timestamp() {
    let mut source = DataSource::event(
        2,
        "abfss://data/clicks",
        "memberId",
        TimestampCol {
            expression: "timestamp".into(),
            format: "epoch".into(),
        },
    );
    source.timestamp_column_info = None;
    let graph = graph_of(vec![context(1, "memberId"), source.into()]);
    assert_has_error(&validate_graph(&graph), "G014");
}

#[test]
fn g015_concrete_key_on_unrelated_source() {
    let graph = graph_of(vec![
        context(1, "memberId"),
        keyed_source(2, "/data/profile", &[1]),
        keyed_transform(3, "f_t", &[1], &[2]),
    ]);
    let report = validate_graph(&graph);
    assert_has_error(&report, "G015");

    let options = ValidationOptions {
        check_concrete_keys: false,
        ..Default::default()
    };
    assert!(validate_graph_with(&graph, &options).is_ok());
}

// =============================================================================
// Reporting
// =============================================================================

#[test]
fn every_violation_is_collected() {
    let mut graph = graph_of(vec![
        context(1, "memberId"),
        external(2, "f_later"),
        transform(3, "a", &[4]),
        transform(4, "b", &[3]),
        keyed_transform(5, "c", &[99], &[1]),
    ]);
    graph.index_feature("f_raw", NodeId(1)).unwrap();

    let report = validate_graph(&graph);
    for code in ["G012", "G004", "G008", "G009"] {
        assert_has_error(&report, code);
    }
    assert_eq!(report.clone().into_result().unwrap_err().len(), report.len());
}
