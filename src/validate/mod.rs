//! Validation phase: checks a resolved graph before it is handed to the
//! execution engine.
//!
//! Every rule runs; nothing stops at the first violation. The result is a
//! [`ValidationReport`] listing each violation with the node, field and
//! referenced id it concerns. Validation never mutates the graph.
//!
//! Placeholders are reported as `ExternalNodeRemaining`; resolution
//! failures (`UnresolvedReference`) belong to the resolver, so a report
//! speaks about a graph's references through `DanglingReference` and
//! `CycleDetected` only.

pub mod cycle;
pub mod keys;
pub mod structural;

use serde::{Deserialize, Serialize};

use crate::error::GraphError;
use crate::ir::ComputeGraph;
use crate::parse::graph::DependencyGraph;

const TRACING_TARGET: &str = "compute_graph::validate";

/// Switches for the rule families that depend on data-source conventions.
/// The core invariants (no placeholders, no dangling ids, key bounds, no
/// cycles, a consistent feature index) are always checked.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ValidationOptions {
    /// Concrete key entries must be context sources or inputs of the node.
    pub check_concrete_keys: bool,
    /// EVENT sources must declare a timestamp column.
    pub check_event_timestamps: bool,
    /// Aggregations must read directly from a data source.
    pub check_aggregation_inputs: bool,
}

impl Default for ValidationOptions {
    fn default() -> Self {
        ValidationOptions {
            check_concrete_keys: true,
            check_event_timestamps: true,
            check_aggregation_inputs: true,
        }
    }
}

/// All violations found in one validation pass.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ValidationReport {
    errors: Vec<GraphError>,
}

impl ValidationReport {
    pub fn is_ok(&self) -> bool {
        self.errors.is_empty()
    }

    pub fn errors(&self) -> &[GraphError] {
        &self.errors
    }

    pub fn len(&self) -> usize {
        self.errors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.errors.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, GraphError> {
        self.errors.iter()
    }

    /// Whether any violation carries the given diagnostic code.
    pub fn has(&self, code: &str) -> bool {
        self.errors.iter().any(|e| e.code() == code)
    }

    pub fn into_result(self) -> Result<(), Vec<GraphError>> {
        if self.errors.is_empty() {
            Ok(())
        } else {
            Err(self.errors)
        }
    }
}

impl IntoIterator for ValidationReport {
    type Item = GraphError;
    type IntoIter = std::vec::IntoIter<GraphError>;

    fn into_iter(self) -> Self::IntoIter {
        self.errors.into_iter()
    }
}

impl std::fmt::Display for ValidationReport {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if self.errors.is_empty() {
            return write!(f, "graph is valid");
        }
        for (i, e) in self.errors.iter().enumerate() {
            if i > 0 {
                writeln!(f)?;
            }
            write!(f, "[{}] {}", e.code(), e)?;
        }
        Ok(())
    }
}

/// Validate a graph with every rule enabled.
pub fn validate_graph(graph: &ComputeGraph) -> ValidationReport {
    validate_graph_with(graph, &ValidationOptions::default())
}

/// Validate a graph with the given rule switches.
pub fn validate_graph_with(graph: &ComputeGraph, options: &ValidationOptions) -> ValidationReport {
    let deps = DependencyGraph::build(graph);
    let mut errors = Vec::new();

    structural::validate_no_placeholders(graph, &mut errors);
    structural::validate_references_exist(graph, &mut errors);
    keys::validate_key_references(graph, &mut errors);
    cycle::validate_acyclic(&deps, &mut errors);
    structural::validate_feature_index(graph, &mut errors);

    if options.check_aggregation_inputs {
        structural::validate_aggregation_inputs(graph, &mut errors);
    }
    if options.check_event_timestamps {
        structural::validate_event_timestamps(graph, &mut errors);
    }
    if options.check_concrete_keys {
        structural::validate_concrete_keys(graph, &deps, &mut errors);
    }

    tracing::debug!(
        target: TRACING_TARGET,
        nodes = graph.len(),
        features = graph.feature_names().len(),
        violations = errors.len(),
        "Validated compute graph"
    );

    ValidationReport { errors }
}
