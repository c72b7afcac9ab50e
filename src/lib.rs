//! Feature compute graph IR: the node model, placeholder resolution and
//! well-formedness validation for graphs handed to an execution engine.

pub mod error;
pub mod ir;
pub mod parse;
pub mod pipeline;
pub mod resolve;
pub mod validate;
pub mod wasm;

pub use error::{GraphError, Phase};
pub use ir::ComputeGraph;
pub use pipeline::{Prepared, prepare};
pub use resolve::{NameBindings, NoBindings, Resolution, resolve};
pub use validate::{ValidationOptions, ValidationReport, validate_graph};
