//! Addressing between nodes.
//!
//! A [`NodeReference`] names the node whose output is consumed and, for
//! every key slot of that node, which slot of the *referring* node's key
//! array supplies it. With a referring node keyed `[vieweeId, viewerId]`
//! and a referent keyed `[viewerId, vieweeId]`, the reference carries
//! `keyReference: [1, 0]`.

use serde::{Deserialize, Serialize};

use super::types::NodeId;

/// Position in a key array. Valid positions are `0..arity`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct KeyReference {
    pub position: i32,
}

impl KeyReference {
    pub fn new(position: i32) -> Self {
        KeyReference { position }
    }

    /// True when the position addresses a slot of a key array of `arity`.
    pub fn fits(&self, arity: usize) -> bool {
        usize::try_from(self.position).is_ok_and(|p| p < arity)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NodeReference {
    pub id: NodeId,
    pub key_reference: Vec<KeyReference>,
}

impl NodeReference {
    pub fn new(id: impl Into<NodeId>, positions: impl IntoIterator<Item = i32>) -> Self {
        NodeReference {
            id: id.into(),
            key_reference: positions.into_iter().map(KeyReference::new).collect(),
        }
    }

    /// Reference that passes the first `arity` key slots through in order.
    pub fn identity(id: impl Into<NodeId>, arity: usize) -> Self {
        NodeReference {
            id: id.into(),
            key_reference: (0..arity)
                .map(|p| KeyReference::new(p as i32))
                .collect(),
        }
    }
}

/// One element of a lookup key: either a computed node's value re-keyed
/// through a reference, or a bare slot of the lookup node's own key.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum LookupKeyPart {
    NodeReference(NodeReference),
    KeyReference(KeyReference),
}

impl LookupKeyPart {
    pub fn node_reference(&self) -> Option<&NodeReference> {
        match self {
            LookupKeyPart::NodeReference(r) => Some(r),
            LookupKeyPart::KeyReference(_) => None,
        }
    }
}

impl From<NodeReference> for LookupKeyPart {
    fn from(r: NodeReference) -> Self {
        LookupKeyPart::NodeReference(r)
    }
}

impl From<KeyReference> for LookupKeyPart {
    fn from(k: KeyReference) -> Self {
        LookupKeyPart::KeyReference(k)
    }
}

/// The nodes supplying each slot of a node's key, usually CONTEXT sources.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct ConcreteKey {
    pub key: Vec<NodeId>,
}

impl ConcreteKey {
    pub fn new(key: impl IntoIterator<Item = impl Into<NodeId>>) -> Self {
        ConcreteKey {
            key: key.into_iter().map(Into::into).collect(),
        }
    }

    pub fn arity(&self) -> usize {
        self.key.len()
    }
}
