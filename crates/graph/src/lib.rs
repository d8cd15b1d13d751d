//! axon-graph: the Axon node-graph model and its file codec.
//!
//! Provides typed structs for graphs (nodes, typed ports, data edges,
//! execution edges, comments, imports), JSON and commented-YAML load/save,
//! and plain-text node descriptions. The transpiler in `axon-core` consumes
//! [`Graph`] values read-only and never touches files itself.

pub mod codec;
pub mod describe;
pub mod types;

pub use codec::{load_graph, save_graph, GraphError, GraphFormat, GRAPH_EXTENSIONS};
pub use describe::{describe_graph, describe_node};
pub use types::*;
