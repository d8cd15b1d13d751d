use axon_graph::{Node, NodeType};
use serde::Serialize;
use std::fmt;

/// A node named in a diagnostic, printed as `'label' (id)`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NodeRef {
    pub id: String,
    pub label: String,
}

impl NodeRef {
    pub fn of(node: &Node) -> Self {
        NodeRef {
            id: node.id.clone(),
            label: node.label.clone(),
        }
    }
}

impl fmt::Display for NodeRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "'{}' ({})", self.label, self.id)
    }
}

/// Which edge list an error refers to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum EdgeKind {
    Data,
    Exec,
}

impl fmt::Display for EdgeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EdgeKind::Data => f.write_str("data"),
            EdgeKind::Exec => f.write_str("execution"),
        }
    }
}

/// Port direction, for port lookup errors.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum PortDirection {
    Input,
    Output,
}

impl fmt::Display for PortDirection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PortDirection::Input => f.write_str("input"),
            PortDirection::Output => f.write_str("output"),
        }
    }
}

/// Coarse error taxonomy surfaced to front ends.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum ErrorKind {
    GraphStructure,
    PortBinding,
    NodeConfig,
    DependencyResolution,
}

impl ErrorKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorKind::GraphStructure => "GraphStructure",
            ErrorKind::PortBinding => "PortBinding",
            ErrorKind::NodeConfig => "NodeConfig",
            ErrorKind::DependencyResolution => "DependencyResolution",
        }
    }
}

/// A transpilation error. Every error aborts the whole call; no partial
/// output is ever returned alongside one.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum TranspileError {
    // ── Graph structure ──────────────────────────────────────────────
    #[error("duplicate node id '{id}'")]
    DuplicateNode { id: String },

    #[error("{edge} edge references unknown node '{id}'")]
    UnknownNode { edge: EdgeKind, id: String },

    #[error("flow starting at {entry} has a dangling path at node {node}: it must end with a {terminator} node")]
    DanglingPath {
        entry: NodeRef,
        node: NodeRef,
        terminator: NodeType,
    },

    #[error("flow starting at {entry} has a cycle or does not have a valid {terminator} terminator node")]
    MissingTerminator { entry: NodeRef, terminator: NodeType },

    #[error("{terminator} node {node} in flow starting at {entry} must not have outgoing execution edges")]
    TerminatorHasSuccessor {
        entry: NodeRef,
        node: NodeRef,
        terminator: NodeType,
    },

    #[error("execution cycle detected in flow starting at {entry} involving nodes [{}]", .nodes.join(", "))]
    Cycle { entry: NodeRef, nodes: Vec<String> },

    #[error("node {node} is reachable from both the flow starting at {first} and the flow starting at {second}")]
    SharedNode {
        node: NodeRef,
        first: NodeRef,
        second: NodeRef,
    },

    #[error("{kind} node {node} cannot be part of the flow starting at {entry}")]
    DefinitionInFlow {
        entry: NodeRef,
        node: NodeRef,
        kind: NodeType,
    },

    #[error("unreachable node {node} is not a valid global type: {kind} must be CONSTANT, STRUCT_DEF or IGNORE")]
    InvalidGlobal { node: NodeRef, kind: NodeType },

    #[error("graph declares {} START nodes [{}]; exactly one main flow is supported", .nodes.len(), .nodes.join(", "))]
    MultipleEntryPoints { nodes: Vec<String> },

    #[error("RETURN node {node} disagrees with the return types of function {function}")]
    ReturnMismatch { function: NodeRef, node: NodeRef },

    // ── Port binding ─────────────────────────────────────────────────
    #[error("{direction} port '{port}' does not exist on node {node}")]
    UnknownPort {
        node: NodeRef,
        port: String,
        direction: PortDirection,
    },

    #[error("input '{port}' of node {node} has {count} incoming data edges; at most one is allowed")]
    FanIn {
        node: NodeRef,
        port: String,
        count: usize,
    },

    #[error("no source variable found for {}.{port}", .node.label)]
    MissingInput { node: NodeRef, port: String },

    #[error("output '{port}' of node {node} is not used or explicitly ignored")]
    UnusedOutput { node: NodeRef, port: String },

    #[error("{kind} node {node} does not read its inputs; a data edge into '{port}' would discard the value")]
    InputNotRead {
        node: NodeRef,
        port: String,
        kind: NodeType,
    },

    #[error("name '{name}' of node {node} is already declared by node {other}")]
    NameCollision {
        name: String,
        node: NodeRef,
        other: NodeRef,
    },

    #[error("input '{port}' of node {node} reads from {source_node}, which belongs to a different flow")]
    CrossFlowEdge {
        node: NodeRef,
        port: String,
        source_node: NodeRef,
    },

    #[error("data edges in flow starting at {entry} contradict execution order for nodes [{}]", .nodes.join(", "))]
    DataOrderConflict { entry: NodeRef, nodes: Vec<String> },

    #[error("internal error: {0}")]
    Internal(String),

    // ── Node configuration ───────────────────────────────────────────
    #[error("{kind} node {node} has no '{key}' in config")]
    MissingConfig {
        node: NodeRef,
        kind: NodeType,
        key: String,
    },

    #[error("function call node {node} is missing 'impl_reference'")]
    MissingReference { node: NodeRef },

    #[error("{kind} node {node} has no output port")]
    MissingOutputPort { node: NodeRef, kind: NodeType },

    // ── Dependency resolution ────────────────────────────────────────
    #[error("cannot determine package of '{reference}' used by node {node}: {reason}")]
    Dependency {
        node: NodeRef,
        reference: String,
        reason: String,
    },
}

impl TranspileError {
    pub fn kind(&self) -> ErrorKind {
        use TranspileError::*;
        match self {
            DuplicateNode { .. }
            | UnknownNode { .. }
            | DanglingPath { .. }
            | MissingTerminator { .. }
            | TerminatorHasSuccessor { .. }
            | Cycle { .. }
            | SharedNode { .. }
            | DefinitionInFlow { .. }
            | InvalidGlobal { .. }
            | MultipleEntryPoints { .. }
            | ReturnMismatch { .. } => ErrorKind::GraphStructure,
            UnknownPort { .. }
            | FanIn { .. }
            | MissingInput { .. }
            | UnusedOutput { .. }
            | InputNotRead { .. }
            | NameCollision { .. }
            | CrossFlowEdge { .. }
            | DataOrderConflict { .. }
            | Internal(_) => ErrorKind::PortBinding,
            MissingConfig { .. } | MissingReference { .. } | MissingOutputPort { .. } => {
                ErrorKind::NodeConfig
            }
            Dependency { .. } => ErrorKind::DependencyResolution,
        }
    }

    /// The id of the node most directly at fault, when there is one.
    pub fn node_id(&self) -> Option<&str> {
        use TranspileError::*;
        match self {
            DuplicateNode { id } | UnknownNode { id, .. } => Some(id.as_str()),
            DanglingPath { node, .. }
            | TerminatorHasSuccessor { node, .. }
            | SharedNode { node, .. }
            | DefinitionInFlow { node, .. }
            | InvalidGlobal { node, .. }
            | ReturnMismatch { node, .. }
            | UnknownPort { node, .. }
            | FanIn { node, .. }
            | MissingInput { node, .. }
            | UnusedOutput { node, .. }
            | InputNotRead { node, .. }
            | NameCollision { node, .. }
            | CrossFlowEdge { node, .. }
            | MissingConfig { node, .. }
            | MissingReference { node }
            | MissingOutputPort { node, .. }
            | Dependency { node, .. } => Some(node.id.as_str()),
            MissingTerminator { entry, .. } => Some(entry.id.as_str()),
            Cycle { nodes, .. } | DataOrderConflict { nodes, .. } | MultipleEntryPoints { nodes } => {
                nodes.first().map(String::as_str)
            }
            Internal(_) => None,
        }
    }

    /// Serialize to the JSON shape reported by `axon --output json`.
    pub fn to_json_value(&self) -> serde_json::Value {
        serde_json::json!({
            "kind":    self.kind(),
            "node_id": self.node_id(),
            "message": self.to_string(),
        })
    }
}
