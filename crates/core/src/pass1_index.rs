//! Pass 1: Graph indexing -- build id lookups and edge adjacency, and
//! reject graphs whose edges do not refer to real nodes and ports.

use crate::error::{EdgeKind, NodeRef, PortDirection, TranspileError};
use axon_graph::{Comment, DataEdge, Graph, Node, NodeType};
use std::collections::HashMap;

/// Read-only lookup tables over one graph, built once per transpile call.
pub struct GraphIndex<'g> {
    pub graph: &'g Graph,
    nodes: HashMap<&'g str, &'g Node>,
    /// Declaration position of every node; drives stable ordering.
    positions: HashMap<&'g str, usize>,
    comments: HashMap<&'g str, &'g Comment>,
    exec_out: HashMap<&'g str, Vec<&'g str>>,
    /// to_node -> to_port -> the single incoming edge
    data_in: HashMap<&'g str, HashMap<&'g str, &'g DataEdge>>,
    /// from_node -> from_port -> every outgoing edge
    data_out: HashMap<&'g str, HashMap<&'g str, Vec<&'g DataEdge>>>,
}

impl<'g> GraphIndex<'g> {
    pub fn node(&self, id: &str) -> Option<&'g Node> {
        self.nodes.get(id).copied()
    }

    /// Nodes in declaration order.
    pub fn nodes(&self) -> impl Iterator<Item = &'g Node> {
        self.graph.nodes.iter()
    }

    pub fn position(&self, id: &str) -> usize {
        self.positions.get(id).copied().unwrap_or(usize::MAX)
    }

    pub fn comment(&self, id: &str) -> Option<&'g Comment> {
        self.comments.get(id).copied()
    }

    /// Execution successors of a node, in edge declaration order.
    pub fn successors(&self, id: &str) -> &[&'g str] {
        self.exec_out.get(id).map(Vec::as_slice).unwrap_or(&[])
    }

    /// The data edge feeding `node.port`, if any.
    pub fn incoming(&self, node: &str, port: &str) -> Option<&'g DataEdge> {
        self.data_in.get(node).and_then(|ports| ports.get(port)).copied()
    }

    /// Every data edge leaving `node.port`.
    pub fn consumers(&self, node: &str, port: &str) -> &[&'g DataEdge] {
        self.data_out
            .get(node)
            .and_then(|ports| ports.get(port))
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }
}

/// A data edge may leave a declared output, or the `receiver` input of a
/// FUNC_DEF, which the function body reads like a parameter.
fn has_source_port(node: &Node, port: &str) -> bool {
    node.output(port).is_some()
        || (node.node_type == NodeType::FuncDef && port == "receiver" && node.input(port).is_some())
}

/// Node kinds whose generated code reads their inputs. STRUCT_DEF inputs
/// declare fields and the FUNC_DEF `receiver` declares a type, so an edge
/// ending there would count as a use while nothing reads the value.
fn reads_inputs(node_type: NodeType) -> bool {
    matches!(
        node_type,
        NodeType::Operator | NodeType::Function | NodeType::Return | NodeType::Ignore
    )
}

/// IGNORE nodes swallow whatever is wired to them, under any port name.
fn has_sink_port(node: &Node, port: &str) -> bool {
    node.node_type == NodeType::Ignore || node.input(port).is_some()
}

pub fn build_index(graph: &Graph) -> Result<GraphIndex<'_>, TranspileError> {
    let mut idx = GraphIndex {
        graph,
        nodes: HashMap::new(),
        positions: HashMap::new(),
        comments: HashMap::new(),
        exec_out: HashMap::new(),
        data_in: HashMap::new(),
        data_out: HashMap::new(),
    };

    for (position, node) in graph.nodes.iter().enumerate() {
        if idx.nodes.insert(node.id.as_str(), node).is_some() {
            return Err(TranspileError::DuplicateNode {
                id: node.id.clone(),
            });
        }
        idx.positions.insert(node.id.as_str(), position);
        idx.exec_out.insert(node.id.as_str(), Vec::new());
    }

    for comment in &graph.comments {
        idx.comments.insert(comment.id.as_str(), comment);
    }

    for edge in &graph.exec_edges {
        for id in [&edge.from_node_id, &edge.to_node_id] {
            if !idx.nodes.contains_key(id.as_str()) {
                return Err(TranspileError::UnknownNode {
                    edge: EdgeKind::Exec,
                    id: id.clone(),
                });
            }
        }
        idx.exec_out
            .entry(edge.from_node_id.as_str())
            .or_default()
            .push(edge.to_node_id.as_str());
    }

    let mut fan_in: HashMap<(&str, &str), usize> = HashMap::new();
    for edge in &graph.data_edges {
        let from = idx.node(&edge.from_node_id).ok_or_else(|| TranspileError::UnknownNode {
            edge: EdgeKind::Data,
            id: edge.from_node_id.clone(),
        })?;
        let to = idx.node(&edge.to_node_id).ok_or_else(|| TranspileError::UnknownNode {
            edge: EdgeKind::Data,
            id: edge.to_node_id.clone(),
        })?;

        if !has_source_port(from, &edge.from_port) {
            return Err(TranspileError::UnknownPort {
                node: NodeRef::of(from),
                port: edge.from_port.clone(),
                direction: PortDirection::Output,
            });
        }
        if !reads_inputs(to.node_type) {
            return Err(TranspileError::InputNotRead {
                node: NodeRef::of(to),
                port: edge.to_port.clone(),
                kind: to.node_type,
            });
        }
        if !has_sink_port(to, &edge.to_port) {
            return Err(TranspileError::UnknownPort {
                node: NodeRef::of(to),
                port: edge.to_port.clone(),
                direction: PortDirection::Input,
            });
        }

        let count = fan_in
            .entry((edge.to_node_id.as_str(), edge.to_port.as_str()))
            .or_insert(0);
        *count += 1;
        if *count > 1 {
            let total = graph
                .data_edges
                .iter()
                .filter(|e| e.to_node_id == edge.to_node_id && e.to_port == edge.to_port)
                .count();
            return Err(TranspileError::FanIn {
                node: NodeRef::of(to),
                port: edge.to_port.clone(),
                count: total,
            });
        }

        idx.data_in
            .entry(edge.to_node_id.as_str())
            .or_default()
            .insert(edge.to_port.as_str(), edge);
        idx.data_out
            .entry(edge.from_node_id.as_str())
            .or_default()
            .entry(edge.from_port.as_str())
            .or_default()
            .push(edge);
    }

    Ok(idx)
}
