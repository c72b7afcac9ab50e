//! Full preparation pipeline: load → resolve → validate.
//!
//! The output is what the execution engine consumes: a graph with no
//! placeholders that passed every enabled rule.

use crate::error::GraphError;
use crate::ir::ComputeGraph;
use crate::resolve::{self, NameBindings, Resolution};
use crate::validate::{self, ValidationOptions};

/// A resolved, validated graph plus what resolution did to it.
#[derive(Debug, Clone, PartialEq)]
pub struct Prepared {
    pub graph: ComputeGraph,
    pub resolution: Resolution,
}

/// Resolve then validate with every rule enabled.
pub fn prepare<B>(graph: ComputeGraph, bindings: &B) -> Result<Prepared, Vec<GraphError>>
where
    B: NameBindings + ?Sized,
{
    prepare_with(graph, bindings, &ValidationOptions::default())
}

pub fn prepare_with<B>(
    mut graph: ComputeGraph,
    bindings: &B,
    options: &ValidationOptions,
) -> Result<Prepared, Vec<GraphError>>
where
    B: NameBindings + ?Sized,
{
    let resolution = resolve::resolve(&mut graph, bindings)?;
    validate::validate_graph_with(&graph, options).into_result()?;
    Ok(Prepared { graph, resolution })
}

/// Parse a JSON document, then [`prepare`] it.
pub fn prepare_json<B>(json: &str, bindings: &B) -> Result<Prepared, Vec<GraphError>>
where
    B: NameBindings + ?Sized,
{
    let graph = crate::parse::parse(json).map_err(|e| vec![e])?;
    prepare(graph, bindings)
}
