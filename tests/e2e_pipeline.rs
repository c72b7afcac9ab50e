//! End-to-end pipeline tests: Parse → Resolve → Validate → evaluation order.

use std::collections::BTreeMap;

use compute_graph::ir::*;
use compute_graph::parse::DependencyGraph;
use compute_graph::validate::ValidationOptions;
use compute_graph::{GraphError, NoBindings, pipeline};

#[test]
fn end_to_end_sequential_join() {
    let json = include_str!("fixtures/sequential_join.json");
    let prepared = pipeline::prepare_json(json, &NoBindings).unwrap();

    assert_eq!(
        prepared.resolution.substitutions,
        BTreeMap::from([(NodeId(6), NodeId(5)), (NodeId(7), NodeId(3))])
    );
    assert_eq!(prepared.resolution.rewritten, 2);
    assert!(prepared.resolution.unreferenced.is_empty());

    let graph = &prepared.graph;
    assert_eq!(graph.len(), 6);
    assert!(graph.nodes().all(|n| n.kind() != NodeKind::External));

    let order = DependencyGraph::build(graph).evaluation_order().unwrap();
    assert_eq!(order.len(), 6);
    let position = |id: i32| order.iter().position(|n| *n == NodeId(id)).unwrap();
    assert!(position(3) < position(8));
    assert!(position(5) < position(8));
    assert!(position(4) < position(5));
}

#[test]
fn prepared_graph_survives_a_second_pass() {
    let json = include_str!("fixtures/sequential_join.json");
    let prepared = pipeline::prepare_json(json, &NoBindings).unwrap();
    let again = pipeline::prepare(prepared.graph.clone(), &NoBindings).unwrap();
    assert!(again.resolution.is_noop());
    assert_eq!(again.graph, prepared.graph);
}

#[test]
fn cycle_stops_the_pipeline() {
    let errors = pipeline::prepare_json(include_str!("fixtures/cycle.json"), &NoBindings).unwrap_err();
    assert_eq!(errors.len(), 1);
    assert_eq!(errors[0].code(), "G008");
}

#[test]
fn load_failure_is_a_single_error() {
    let errors = pipeline::prepare_json(include_str!("fixtures/no_nodes.json"), &NoBindings).unwrap_err();
    assert_eq!(errors.len(), 1);
    assert_eq!(errors[0].code(), "G006");
}

#[test]
fn resolution_failure_skips_validation() {
    let json = r#"{
        "nodes": [
            {"External": {"id": 1, "name": "f_elsewhere"}},
            {"Transformation": {"id": 2, "inputs": [{"id": 1, "keyReference": [{"position": 3}]}],
                                "function": {"operator": "feathr_mvel"}, "featureName": "f_local"}}
        ],
        "featureNames": {"f_local": 2}
    }"#;
    let errors = pipeline::prepare_json(json, &NoBindings).unwrap_err();
    assert_eq!(
        errors,
        vec![GraphError::UnresolvedReference {
            name: "f_elsewhere".into(),
            node: NodeId(1),
        }]
    );
}

#[test]
fn disabled_rules_let_the_graph_through() {
    let json = r#"{
        "nodes": [
            {"DataSource": {"id": 1, "sourceType": "EVENT", "externalSourceRef": "/data/clicks",
                            "keyExpression": "memberId", "keyExpressionType": "SQL"}},
            {"Aggregation": {"id": 2, "input": {"id": 1, "keyReference": [{"position": 0}]},
                             "function": {"operator": "COUNT"}, "featureName": "f_clicks"}}
        ],
        "featureNames": {"f_clicks": 2}
    }"#;
    let graph = compute_graph::parse::parse(json).unwrap();

    let errors = pipeline::prepare(graph.clone(), &NoBindings).unwrap_err();
    assert_eq!(errors[0].code(), "G014");

    let options = ValidationOptions {
        check_event_timestamps: false,
        ..Default::default()
    };
    assert!(pipeline::prepare_with(graph, &NoBindings, &options).is_ok());
}
