//! Local and reachability rules over a resolved graph.
//!
//! An id that no node in the graph carries is reported as
//! `DanglingReference`: the validation-time form of a failed `lookup`
//! (`NotFound`), with the referring node and field attached. Dangling
//! references and `CycleDetected` are the reference errors. A graph free
//! of placeholders produces neither exactly when every `NodeReference`,
//! `ConcreteKey` and `lookupNode` id is present and the reference graph
//! is acyclic.

use crate::error::GraphError;
use crate::ir::{AnyNode, ComputeGraph, DataSourceType};
use crate::parse::graph::DependencyGraph;

// ---------------------------------------------------------------------------
// Invariant: no placeholder survives resolution
// ---------------------------------------------------------------------------

pub fn validate_no_placeholders(graph: &ComputeGraph, errors: &mut Vec<GraphError>) {
    for node in graph.nodes() {
        if let AnyNode::External(e) = node {
            errors.push(GraphError::ExternalNodeRemaining {
                node: e.id,
                name: e.name.clone(),
            });
        }
    }
}

// ---------------------------------------------------------------------------
// Invariant: every referenced id exists
// ---------------------------------------------------------------------------

pub fn validate_references_exist(graph: &ComputeGraph, errors: &mut Vec<GraphError>) {
    for node in graph.nodes() {
        let mut targets: Vec<(&'static str, _)> = node
            .node_references()
            .into_iter()
            .map(|(field, r)| (field, r.id))
            .collect();
        if let AnyNode::Lookup(lookup) = node {
            targets.push(("lookupNode", lookup.lookup_node));
        }
        if let Some(key) = node.concrete_key() {
            targets.extend(key.key.iter().map(|&id| ("concreteKey", id)));
        }

        for (field, target) in targets {
            if !graph.contains(target) {
                errors.push(GraphError::DanglingReference {
                    node: node.id(),
                    field,
                    target,
                });
            }
        }
    }
}

// ---------------------------------------------------------------------------
// Invariant: the feature index points at matching feature nodes
// ---------------------------------------------------------------------------

pub fn validate_feature_index(graph: &ComputeGraph, errors: &mut Vec<GraphError>) {
    for (name, &id) in graph.feature_names() {
        let Some(node) = graph.get(id) else {
            errors.push(GraphError::UnknownFeatureNode {
                name: name.clone(),
                node: id,
            });
            continue;
        };

        if !node.is_feature() {
            errors.push(GraphError::InvalidVariantForFeatureName {
                name: name.clone(),
                node: id,
                kind: node.kind(),
            });
            continue;
        }

        if let Some(declared) = node.feature_name() {
            if declared != name {
                errors.push(GraphError::FeatureNameMismatch {
                    name: name.clone(),
                    node: id,
                    declared: declared.to_string(),
                });
            }
        }
    }
}

// ---------------------------------------------------------------------------
// Invariant: aggregations read from a data source
// ---------------------------------------------------------------------------

pub fn validate_aggregation_inputs(graph: &ComputeGraph, errors: &mut Vec<GraphError>) {
    for node in graph.nodes() {
        let AnyNode::Aggregation(agg) = node else {
            continue;
        };
        // Missing inputs are reported as dangling references.
        let Some(input) = graph.get(agg.input.id) else {
            continue;
        };
        if !matches!(input, AnyNode::DataSource(_)) {
            errors.push(GraphError::InvalidAggregationInput {
                node: agg.id,
                input: agg.input.id,
                kind: input.kind(),
            });
        }
    }
}

// ---------------------------------------------------------------------------
// Invariant: event sources declare their timestamp column
// ---------------------------------------------------------------------------

pub fn validate_event_timestamps(graph: &ComputeGraph, errors: &mut Vec<GraphError>) {
    for node in graph.nodes() {
        if let AnyNode::DataSource(source) = node {
            if source.source_type == DataSourceType::Event && source.timestamp_column_info.is_none()
            {
                errors.push(GraphError::MissingTimestampColumn(source.id));
            }
        }
    }
}

// ---------------------------------------------------------------------------
// Invariant: concrete key entries are context sources or inputs of the node
// ---------------------------------------------------------------------------

pub fn validate_concrete_keys(
    graph: &ComputeGraph,
    deps: &DependencyGraph,
    errors: &mut Vec<GraphError>,
) {
    for node in graph.nodes() {
        let Some(key) = node.concrete_key() else {
            continue;
        };
        for &key_id in &key.key {
            // Missing entries are reported as dangling references.
            let Some(key_node) = graph.get(key_id) else {
                continue;
            };
            let is_context = matches!(
                key_node,
                AnyNode::DataSource(s) if s.source_type == DataSourceType::Context
            );
            if !is_context && !deps.reaches(node.id(), key_id) {
                errors.push(GraphError::UnreachableConcreteKey {
                    node: node.id(),
                    key: key_id,
                });
            }
        }
    }
}
