//! Resolution phase: replaces `External` placeholders with links to the
//! nodes that compute the named features.
//!
//! Resolution is all-or-nothing. Every placeholder is bound before any
//! node is touched; if one name has no binding the graph is returned
//! exactly as it came in, together with every unresolved name.

mod rewrite;

use std::collections::{BTreeMap, BTreeSet, HashMap};
use std::hash::BuildHasher;

use crate::error::GraphError;
use crate::ir::{AnyNode, ComputeGraph, NodeId};

pub(crate) const TRACING_TARGET: &str = "compute_graph::resolve";

/// Read-only source of name → node id bindings for names the graph's own
/// feature index does not cover, such as features shared across graphs.
pub trait NameBindings {
    fn resolve(&self, name: &str) -> Option<NodeId>;
}

/// Binds nothing; only the graph's own feature index is consulted.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoBindings;

impl NameBindings for NoBindings {
    fn resolve(&self, _name: &str) -> Option<NodeId> {
        None
    }
}

impl<S: BuildHasher> NameBindings for HashMap<String, NodeId, S> {
    fn resolve(&self, name: &str) -> Option<NodeId> {
        self.get(name).copied()
    }
}

impl NameBindings for BTreeMap<String, NodeId> {
    fn resolve(&self, name: &str) -> Option<NodeId> {
        self.get(name).copied()
    }
}

impl<B: NameBindings + ?Sized> NameBindings for &B {
    fn resolve(&self, name: &str) -> Option<NodeId> {
        (**self).resolve(name)
    }
}

/// What a successful resolution pass did.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Resolution {
    /// Placeholder id → resolved node id.
    pub substitutions: BTreeMap<NodeId, NodeId>,
    /// Reference slots (node references, lookup nodes, concrete key
    /// entries, feature index values) that were rewritten.
    pub rewritten: usize,
    /// Placeholders nothing referred to.
    pub unreferenced: Vec<NodeId>,
}

impl Resolution {
    /// True when the graph had no placeholders.
    pub fn is_noop(&self) -> bool {
        self.substitutions.is_empty()
    }
}

/// Resolve every `External` node in `graph`.
///
/// Names are looked up in the graph's feature index first, then in
/// `bindings`. A name that leads to another placeholder is followed to
/// that placeholder's name; a chain that comes back on itself counts as
/// unresolved. Placeholders nothing refers to are dropped whether or not
/// their name binds.
pub fn resolve<B>(graph: &mut ComputeGraph, bindings: &B) -> Result<Resolution, Vec<GraphError>>
where
    B: NameBindings + ?Sized,
{
    let placeholders: BTreeMap<NodeId, String> = graph
        .nodes()
        .filter_map(|node| match node {
            AnyNode::External(e) => Some((e.id, e.name.clone())),
            _ => None,
        })
        .collect();

    if placeholders.is_empty() {
        tracing::debug!(target: TRACING_TARGET, nodes = graph.len(), "No placeholders to resolve");
        return Ok(Resolution::default());
    }

    // Placeholders something points at: a node slot or the feature index
    let referenced: BTreeSet<NodeId> = graph
        .nodes()
        .filter(|node| !matches!(node, AnyNode::External(_)))
        .flat_map(|node| {
            node.dependencies()
                .into_iter()
                .chain(node.concrete_key().into_iter().flat_map(|k| k.key.iter().copied()))
        })
        .chain(graph.feature_names().values().copied())
        .filter(|id| placeholders.contains_key(id))
        .collect();

    // 1. Bind every placeholder without touching the graph
    let mut substitutions = BTreeMap::new();
    let mut errors = Vec::new();
    for (&id, name) in &placeholders {
        match bind(name, graph, bindings, &placeholders) {
            Some(target) => {
                substitutions.insert(id, target);
            }
            None if referenced.contains(&id) => errors.push(GraphError::UnresolvedReference {
                name: name.clone(),
                node: id,
            }),
            None => {}
        }
    }

    if !errors.is_empty() {
        tracing::debug!(
            target: TRACING_TARGET,
            placeholders = placeholders.len(),
            unresolved = errors.len(),
            "Resolution failed, graph left unchanged"
        );
        return Err(errors);
    }

    // 2. Rewrite references graph-wide
    let mut rewritten = 0;
    for node in graph.nodes_mut() {
        rewritten += rewrite::rewrite_node(node, &substitutions);
    }
    for id in graph.feature_names_mut().values_mut() {
        if let Some(&target) = substitutions.get(&*id) {
            *id = target;
            rewritten += 1;
        }
    }

    // 3. Drop the placeholders
    let mut unreferenced = Vec::new();
    for &id in placeholders.keys() {
        graph.remove(id);
        if !referenced.contains(&id) {
            tracing::debug!(
                target: TRACING_TARGET,
                node = %id,
                name = %placeholders[&id],
                "Removed unreferenced placeholder"
            );
            unreferenced.push(id);
        }
    }

    tracing::debug!(
        target: TRACING_TARGET,
        placeholders = placeholders.len(),
        rewritten,
        "Resolved placeholders"
    );

    Ok(Resolution {
        substitutions,
        rewritten,
        unreferenced,
    })
}

/// Consuming variant of [`resolve`]. On failure the untouched graph is
/// handed back with the errors.
pub fn resolved<B>(
    mut graph: ComputeGraph,
    bindings: &B,
) -> Result<ComputeGraph, (ComputeGraph, Vec<GraphError>)>
where
    B: NameBindings + ?Sized,
{
    match resolve(&mut graph, bindings) {
        Ok(_) => Ok(graph),
        Err(errors) => Err((graph, errors)),
    }
}

/// Find the concrete node a placeholder name stands for.
fn bind<B>(
    name: &str,
    graph: &ComputeGraph,
    bindings: &B,
    placeholders: &BTreeMap<NodeId, String>,
) -> Option<NodeId>
where
    B: NameBindings + ?Sized,
{
    let mut seen = BTreeSet::new();
    let mut current = name.to_string();

    loop {
        if !seen.insert(current.clone()) {
            return None;
        }

        let candidates = [
            graph.feature_names().get(&current).copied(),
            bindings.resolve(&current),
        ];

        let mut next = None;
        for id in candidates.into_iter().flatten() {
            match placeholders.get(&id) {
                None => return Some(id),
                Some(other) if *other != current && next.is_none() => {
                    next = Some(other.clone());
                }
                Some(_) => {}
            }
        }

        current = next?;
    }
}
