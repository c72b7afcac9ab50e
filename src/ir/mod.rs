//! Compute graph intermediate representation.

pub mod graph;
pub mod node;
pub mod reference;
pub mod types;

pub use graph::ComputeGraph;
pub use node::*;
pub use reference::*;
pub use types::*;
